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

use crate::{error::EvalError, outcome::Classification};
use lifeline_model::{network::Network, state::ComponentStates};

/// An outcome that can be reduced to a survive / fail verdict.
pub trait Evaluation {
    fn classification(&self) -> Classification;
}

/// A performance dimension of a network under a component-state vector.
///
/// `PerformanceEvaluator` decouples outer drivers (Monte-Carlo samplers, reliability
/// analyses) from a particular performance measure. Implementations must be pure:
/// evaluating the same `(network, states)` twice yields identical outcomes, and no
/// implementation mutates the network. Each call derives its own filtered subgraph, so
/// evaluations over one shared network can run in parallel.
pub trait PerformanceEvaluator {
    /// The metric, classification and diagnostic detail of one evaluation.
    type Outcome: Evaluation;

    /// Returns the name of the evaluator.
    fn name(&self) -> &str;

    /// Evaluates `network` under `states`.
    ///
    /// Returns an error only for structurally invalid input or parameters; a network
    /// that no longer performs is reported through the outcome.
    fn evaluate(
        &self,
        network: &Network,
        states: &ComponentStates,
    ) -> Result<Self::Outcome, EvalError>;

    /// Evaluates and keeps only the verdict.
    fn classify(
        &self,
        network: &Network,
        states: &ComponentStates,
    ) -> Result<Classification, EvalError> {
        Ok(self.evaluate(network, states)?.classification())
    }
}
