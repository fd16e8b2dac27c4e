// Copyright (c) 2025 The Lifeline Authors.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Networks shared by the unit tests.

use lifeline_model::{loading::NetworkLoader, network::Network};

/// The undirected 11-edge toy network with `length` edge weights.
pub fn toynet() -> Network {
    NetworkLoader::new()
        .from_strs(
            include_str!("../../../data/toynet-11edges/nodes.json"),
            include_str!("../../../data/toynet-11edges/edges.json"),
        )
        .expect("toy network fixture must load")
}

/// A small directed substation: one source, two input groups, one transmission group
/// and two output groups.
pub fn substation() -> Network {
    NetworkLoader::new()
        .from_strs(
            include_str!("../../../data/substation-mini/nodes.json"),
            include_str!("../../../data/substation-mini/edges.json"),
        )
        .expect("substation fixture must load")
}
