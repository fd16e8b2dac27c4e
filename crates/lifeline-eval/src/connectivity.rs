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

//! Global vertex connectivity.
//!
//! The vertex connectivity `k` of a graph is the minimum number of nodes whose removal
//! disconnects it:
//!
//! - `0` for graphs with at most one node and for disconnected graphs (weakly
//!   disconnected for undirected networks, not strongly connected for directed ones);
//! - `n - 1` for complete graphs;
//! - otherwise `min κ(u, v)` over non-adjacent ordered pairs, where the local
//!   connectivity `κ(u, v)` is the maximum number of internally node-disjoint `u → v`
//!   paths (Menger).
//!
//! `κ(u, v)` is a unit-capacity max-flow on the node-split graph: every node `w` becomes
//! `w_in → w_out` with capacity one and every arc `a → b` becomes `a_out → b_in`.
//! Following Even, only the first `k + 1` nodes need to serve as the first endpoint of a
//! pair, since at least one of them lies outside any minimum separator. Each flow also
//! stops as soon as it reaches the best bound found so far.

use crate::{
    error::EvalError,
    evaluator::{Evaluation, PerformanceEvaluator},
    filter::{FilteredGraph, StateFilter, UnknownComponentPolicy},
    outcome::Classification,
    search::reachable,
};
use lifeline_model::{index::NodeIndex, network::Network, state::ComponentStates};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A residual network for unit-capacity max-flow on the node-split graph.
struct SplitFlowNetwork {
    /// `heads[v]` lists the arc ids leaving flow node `v`.
    heads: Vec<Vec<usize>>,
    /// Arc `a` and its reverse `a ^ 1` are stored next to each other.
    targets: Vec<usize>,
    capacity: Vec<u32>,
    initial: Vec<u32>,
    parent_arc: Vec<usize>,
}

impl SplitFlowNetwork {
    #[inline(always)]
    fn node_in(v: usize) -> usize {
        2 * v
    }

    #[inline(always)]
    fn node_out(v: usize) -> usize {
        2 * v + 1
    }

    fn new(adjacency: &[Vec<usize>]) -> Self {
        let n = adjacency.len();
        let arcs = 2 * (n + adjacency.iter().map(Vec::len).sum::<usize>());
        let mut flow = Self {
            heads: vec![Vec::new(); 2 * n],
            targets: Vec::with_capacity(arcs),
            capacity: Vec::with_capacity(arcs),
            initial: Vec::new(),
            parent_arc: vec![usize::MAX; 2 * n],
        };

        for v in 0..n {
            flow.add_arc(Self::node_in(v), Self::node_out(v));
        }
        for (u, targets) in adjacency.iter().enumerate() {
            for &w in targets {
                flow.add_arc(Self::node_out(u), Self::node_in(w));
            }
        }
        flow.initial = flow.capacity.clone();
        flow
    }

    fn add_arc(&mut self, from: usize, to: usize) {
        let id = self.targets.len();
        self.heads[from].push(id);
        self.targets.push(to);
        self.capacity.push(1);
        self.heads[to].push(id + 1);
        self.targets.push(from);
        self.capacity.push(0);
    }

    /// Maximum number of internally node-disjoint paths from `s` to `t`, capped at
    /// `limit`. `s` and `t` must be distinct and non-adjacent.
    fn local_connectivity(&mut self, s: usize, t: usize, limit: usize) -> usize {
        self.capacity.copy_from_slice(&self.initial);
        let source = Self::node_out(s);
        let sink = Self::node_in(t);

        let mut flow = 0;
        let mut queue = VecDeque::new();
        while flow < limit {
            self.parent_arc.fill(usize::MAX);
            queue.clear();
            queue.push_back(source);

            let mut found = false;
            'bfs: while let Some(v) = queue.pop_front() {
                for &arc in &self.heads[v] {
                    let w = self.targets[arc];
                    if self.capacity[arc] == 0 || w == source || self.parent_arc[w] != usize::MAX
                    {
                        continue;
                    }
                    self.parent_arc[w] = arc;
                    if w == sink {
                        found = true;
                        break 'bfs;
                    }
                    queue.push_back(w);
                }
            }

            if !found {
                break;
            }

            let mut v = sink;
            while v != source {
                let arc = self.parent_arc[v];
                self.capacity[arc] -= 1;
                self.capacity[arc ^ 1] += 1;
                v = self.targets[arc ^ 1];
            }
            flow += 1;
        }

        flow
    }
}

/// Sorted, deduplicated out-neighbour lists without self-loops.
fn simple_adjacency(graph: &FilteredGraph) -> Vec<Vec<usize>> {
    (0..graph.num_nodes())
        .map(|v| {
            let mut targets: Vec<usize> = graph
                .neighbors(NodeIndex::new(v), Direction::Outgoing)
                .map(|w| w.get())
                .filter(|&w| w != v)
                .collect();
            targets.sort_unstable();
            targets.dedup();
            targets
        })
        .collect()
}

fn is_connected(graph: &FilteredGraph) -> bool {
    let n = graph.num_nodes();
    let root = [NodeIndex::new(0)];
    if reachable(graph, &root, Direction::Outgoing).count_ones(..) != n {
        return false;
    }
    // Undirected graphs store both arcs, so the forward search already decides.
    !graph.is_directed() || reachable(graph, &root, Direction::Incoming).count_ones(..) == n
}

/// Computes the global vertex connectivity of `graph`.
pub fn vertex_connectivity(graph: &FilteredGraph) -> usize {
    let n = graph.num_nodes();
    if n <= 1 || !is_connected(graph) {
        return 0;
    }

    let adjacency = simple_adjacency(graph);
    let adjacent = |u: usize, v: usize| adjacency[u].binary_search(&v).is_ok();

    let mut best = n - 1;
    if adjacency.iter().all(|targets| targets.len() == n - 1) {
        return best;
    }

    let directed = graph.is_directed();
    let mut flow = SplitFlowNetwork::new(&adjacency);
    let mut i = 0;
    while i <= best && i < n {
        for j in (i + 1)..n {
            if !adjacent(i, j) {
                best = best.min(flow.local_connectivity(i, j, best));
            }
            if directed && !adjacent(j, i) {
                best = best.min(flow.local_connectivity(j, i, best));
            }
            if best == 0 {
                return 0;
            }
        }
        i += 1;
    }

    best
}

/// The result of a connectivity evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityOutcome {
    /// Global vertex connectivity of the filtered subgraph.
    pub k: usize,
    /// `Survived` iff `k >= target_k`.
    pub status: Classification,
}

impl Evaluation for ConnectivityOutcome {
    #[inline]
    fn classification(&self) -> Classification {
        self.status
    }
}

impl std::fmt::Display for ConnectivityOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Connectivity(k={}, status={})", self.k, self.status)
    }
}

/// Classifies a state vector by the vertex connectivity of the surviving subgraph.
///
/// # Examples
///
/// ```rust
/// # use lifeline_eval::connectivity::ConnectivityEvaluator;
/// # use lifeline_eval::evaluator::PerformanceEvaluator;
/// # use lifeline_model::network::{Attributes, NetworkBuilder};
/// # use lifeline_model::state::ComponentStates;
///
/// let mut builder = NetworkBuilder::undirected();
/// for id in ["a", "b", "c"] {
///     builder.add_node(id, Attributes::new()).unwrap();
/// }
/// builder.add_edge("ab", "a", "b", Attributes::new()).unwrap();
/// builder.add_edge("bc", "b", "c", Attributes::new()).unwrap();
/// builder.add_edge("ca", "c", "a", Attributes::new()).unwrap();
/// let network = builder.build();
///
/// let outcome = ConnectivityEvaluator::new(2)
///     .evaluate(&network, &ComponentStates::all_surviving(&network))
///     .unwrap();
/// assert_eq!(outcome.k, 2);
/// assert!(outcome.status.is_survived());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityEvaluator {
    target_k: usize,
    #[serde(default)]
    filter: StateFilter,
}

impl ConnectivityEvaluator {
    #[inline]
    pub fn new(target_k: usize) -> Self {
        Self {
            target_k,
            filter: StateFilter::new(),
        }
    }

    #[inline]
    pub fn unknown_components(mut self, policy: UnknownComponentPolicy) -> Self {
        self.filter = self.filter.unknown_components(policy);
        self
    }

    #[inline]
    pub fn target_k(&self) -> usize {
        self.target_k
    }
}

impl PerformanceEvaluator for ConnectivityEvaluator {
    type Outcome = ConnectivityOutcome;

    fn name(&self) -> &str {
        "ConnectivityEvaluator"
    }

    fn evaluate(
        &self,
        network: &Network,
        states: &ComponentStates,
    ) -> Result<ConnectivityOutcome, EvalError> {
        let filtered = self.filter.apply(network, states)?;
        let k = vertex_connectivity(&filtered);
        let status = Classification::from_condition(k >= self.target_k);
        log::debug!(
            "connectivity: k={k} over {} surviving edges (target {}) -> {status}",
            filtered.num_edges(),
            self.target_k
        );
        Ok(ConnectivityOutcome { k, status })
    }
}
