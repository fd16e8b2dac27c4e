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

//! # Lifeline Model
//!
//! **The domain model for infrastructure-network performance evaluation.**
//!
//! This crate describes a network whose nodes and edges ("components") can each
//! be failed or surviving, together with the auxiliary data that the evaluators
//! in `lifeline_eval` consume. It is the interchange layer between datasets
//! produced by outer tooling and the evaluation engine.
//!
//! ## Architecture
//!
//! * **`index`**: Strongly-typed `NodeIndex` / `EdgeIndex` wrappers so node and edge
//!   positions cannot be mixed up.
//! * **`network`**: The immutable `Network` and its `NetworkBuilder`. The builder is the
//!   only way to create a network and validates every insertion eagerly.
//! * **`loading`**: Builds a `Network` from node / edge maps in JSON form, accepting the
//!   dictionary and list layouts used by existing datasets.
//! * **`state`**: `ComponentStates`, the per-evaluation mapping of component id to
//!   `0` (failed) or `1` (surviving).
//! * **`groups`**: `NodeGroups`, the partition of nodes into sources, inputs, outputs and
//!   transmission groups used by the capacity evaluator.
//!
//! ## Design Philosophy
//!
//! 1.  **Immutability**: A built `Network` never changes. Evaluations derive fresh
//!     subgraphs from it, so one network can be shared across threads without locking.
//! 2.  **Fail-Fast**: Structurally invalid input (duplicate ids, dangling edge endpoints,
//!     missing group attributes) is rejected at construction time.
//! 3.  **Lenient States**: State vectors are plain id maps; ids the network does not know
//!     are carried along and left to the evaluator's policy.

pub mod groups;
pub mod index;
pub mod loading;
pub mod network;
pub mod state;
