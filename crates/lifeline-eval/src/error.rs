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

use lifeline_model::network::NetworkError;

/// The error type for evaluations.
///
/// Only structurally invalid input ends up here. Disconnected graphs, unreachable
/// destinations and lost capacity are regular outcomes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// The state vector names an id that is neither a node nor an edge of the network,
    /// and the filter was configured to reject such ids.
    #[error("state vector references unknown component '{0}'")]
    UnknownComponent(String),
    /// An evaluator parameter is out of range.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    /// An edge weight is negative or not finite.
    #[error("edge '{edge}' has invalid weight {value} in attribute '{attribute}'")]
    InvalidWeight {
        edge: String,
        attribute: String,
        value: f64,
    },
    /// The representative member of a group carries no capacity.
    #[error("group '{group}' has no capacity on its representative node '{node}'")]
    MissingCapacity { group: String, node: String },
    /// A group capacity is negative or not finite.
    #[error("group '{group}' has invalid capacity {value}")]
    InvalidCapacity { group: String, value: f64 },
    /// The network or the node groups are malformed.
    #[error(transparent)]
    Network(#[from] NetworkError),
}
