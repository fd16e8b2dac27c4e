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

#![allow(dead_code)]

use lifeline_model::loading::NetworkLoader;
use lifeline_model::network::Network;
use lifeline_model::state::{ComponentState, ComponentStates};
use rand::Rng;
use std::fs::File;
use std::path::{Path, PathBuf};

fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

pub fn load(dataset: &str) -> Network {
    let dir = data_dir().join(dataset);
    let open = |name: &str| {
        File::open(dir.join(name)).unwrap_or_else(|e| panic!("cannot open {dataset}/{name}: {e}"))
    };
    NetworkLoader::new()
        .from_readers(open("nodes.json"), open("edges.json"))
        .unwrap_or_else(|e| panic!("cannot load {dataset}: {e}"))
}

pub fn toynet() -> Network {
    load("toynet-11edges")
}

pub fn substation() -> Network {
    load("substation-mini")
}

/// Draws every component of `network` independently, surviving with probability `p`.
pub fn random_states<R: Rng>(network: &Network, rng: &mut R, p: f64) -> ComponentStates {
    network
        .component_ids()
        .map(|id| (id, ComponentState::from(rng.random_bool(p))))
        .collect()
}

/// Ids of the components that survive in `states`, in network order.
pub fn surviving<'a>(network: &'a Network, states: &ComponentStates) -> Vec<&'a str> {
    network
        .component_ids()
        .filter(|id| states.get(id) == Some(ComponentState::Surviving))
        .collect()
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
