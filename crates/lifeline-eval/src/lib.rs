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

//! # Lifeline Eval
//!
//! Classifies a component-state vector of an infrastructure network as survived (`s`) or
//! failed (`f`) along three performance dimensions. Each evaluator is a pure function of
//! `(network, state vector, parameters)`; none keeps state between calls, so one
//! evaluator and one network can serve any number of concurrent evaluations.
//!
//! ## Modules
//!
//! - `filter`: Derives the subgraph of surviving components from a state vector. Nodes
//!   are always kept; an edge survives only if it is explicitly switched on and neither
//!   endpoint is switched off.
//! - `search`: Multi-source reachability and single-source shortest paths on filtered
//!   graphs.
//! - `connectivity`: Global vertex connectivity and the `ConnectivityEvaluator`.
//! - `travel`: Baseline versus filtered travel time to the nearest destination and the
//!   `TravelTimeEvaluator` with multi-threshold classification.
//! - `capacity`: Source / output reachability of node groups aggregated into a system
//!   capacity by the `CapacityEvaluator`.
//! - `evaluator`: The `PerformanceEvaluator` trait shared by all evaluators.
//! - `batch`: Parallel evaluation of many independent state vectors.
//! - `outcome`: The `Classification` symbol returned by every evaluation.
//! - `error`: The `EvalError` type for structurally invalid input.
//!
//! A missing path is never an error: it is an ordinary outcome reported through the
//! classification and the diagnostic detail of each evaluator.

pub mod batch;
pub mod capacity;
pub mod connectivity;
pub mod error;
pub mod evaluator;
pub mod filter;
pub mod outcome;
pub mod search;
pub mod travel;

#[cfg(test)]
pub(crate) mod fixtures;
