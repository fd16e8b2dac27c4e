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

//! Parallel evaluation of independent state vectors.
//!
//! Evaluations never share mutable state: the network and the evaluator are read-only
//! and every call builds its own filtered graph. A batch is therefore split across the
//! rayon thread pool one state vector at a time.

use crate::{error::EvalError, evaluator::PerformanceEvaluator};
use lifeline_model::{network::Network, state::ComponentStates};
use rayon::prelude::*;

/// Evaluates every state vector of `samples` against `network`.
///
/// The results are in the order of `samples`. A failing evaluation does not stop the
/// others; its error takes its place in the result.
pub fn evaluate_batch<E>(
    evaluator: &E,
    network: &Network,
    samples: &[ComponentStates],
) -> Vec<Result<E::Outcome, EvalError>>
where
    E: PerformanceEvaluator + Sync,
    E::Outcome: Send,
{
    log::debug!(
        "{}: evaluating {} samples on {} threads",
        evaluator.name(),
        samples.len(),
        rayon::current_num_threads()
    );
    samples
        .par_iter()
        .map(|states| evaluator.evaluate(network, states))
        .collect()
}

/// Evaluates every state vector of `samples` and collects the outcomes, stopping at the
/// first error.
pub fn try_evaluate_batch<E>(
    evaluator: &E,
    network: &Network,
    samples: &[ComponentStates],
) -> Result<Vec<E::Outcome>, EvalError>
where
    E: PerformanceEvaluator + Sync,
    E::Outcome: Send,
{
    samples
        .par_iter()
        .map(|states| evaluator.evaluate(network, states))
        .collect()
}
