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

//! Traversals over a `FilteredGraph`.
//!
//! - `reachable`: multi-source depth-first search, forwards or backwards. A seed
//!   always reaches itself, so "is there a path from any source to `v`" becomes a single
//!   bit lookup after one search.
//! - `shortest_paths`: single-source Dijkstra over non-negative `f64` weights that
//!   records predecessor arcs for path reconstruction.

use crate::filter::FilteredGraph;
use fixedbitset::FixedBitSet;
use lifeline_model::index::{EdgeIndex, NodeIndex};
use petgraph::{
    Direction,
    graph::NodeIndex as GraphIndex,
    visit::{DfsEvent, Reversed, depth_first_search},
};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Returns the set of nodes reachable from any of `seeds`.
///
/// With `Direction::Outgoing` the search follows arcs forwards; with
/// `Direction::Incoming` it follows them backwards, yielding every node that can reach
/// one of the seeds.
pub fn reachable(graph: &FilteredGraph, seeds: &[NodeIndex], direction: Direction) -> FixedBitSet {
    let mut visited = FixedBitSet::with_capacity(graph.num_nodes());
    let starts = seeds.iter().map(|seed| GraphIndex::new(seed.get()));
    let mut discover = |event: DfsEvent<GraphIndex>| {
        if let DfsEvent::Discover(node, _) = event {
            visited.insert(node.index());
        }
    };

    match direction {
        Direction::Outgoing => depth_first_search(graph.graph(), starts, &mut discover),
        Direction::Incoming => depth_first_search(Reversed(graph.graph()), starts, &mut discover),
    }

    visited
}

#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    node: NodeIndex,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; ties settle the lower node index first.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A node sequence together with the edges joining consecutive nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub nodes: Vec<NodeIndex>,
    pub edges: Vec<EdgeIndex>,
}

/// The shortest-path tree rooted at one origin.
#[derive(Debug, Clone)]
pub struct ShortestPaths {
    origin: NodeIndex,
    distances: Vec<f64>,
    predecessors: Vec<Option<(NodeIndex, EdgeIndex)>>,
}

impl ShortestPaths {
    #[inline]
    pub fn origin(&self) -> NodeIndex {
        self.origin
    }

    /// Returns the distance to `node`, or `None` if it is unreachable.
    #[inline]
    pub fn distance(&self, node: NodeIndex) -> Option<f64> {
        let d = self.distances[node.get()];
        d.is_finite().then_some(d)
    }

    #[inline]
    pub fn is_reachable(&self, node: NodeIndex) -> bool {
        self.distances[node.get()].is_finite()
    }

    /// Reconstructs the path from the origin to `target`.
    pub fn path(&self, target: NodeIndex) -> Option<Path> {
        if !self.is_reachable(target) {
            return None;
        }

        let mut nodes = vec![target];
        let mut edges = Vec::new();
        let mut current = target;
        while let Some((previous, edge)) = self.predecessors[current.get()] {
            nodes.push(previous);
            edges.push(edge);
            current = previous;
        }
        debug_assert_eq!(current, self.origin);

        nodes.reverse();
        edges.reverse();
        Some(Path { nodes, edges })
    }
}

/// Runs Dijkstra's algorithm from `origin`.
///
/// `weight` must return a finite, non-negative length for every arc of `graph`. An arc
/// only replaces a predecessor when it is strictly shorter, so among equally short
/// paths the first one found is kept.
pub fn shortest_paths<W>(graph: &FilteredGraph, origin: NodeIndex, weight: W) -> ShortestPaths
where
    W: Fn(EdgeIndex) -> f64,
{
    let n = graph.num_nodes();
    let mut distances = vec![f64::INFINITY; n];
    let mut predecessors = vec![None; n];
    let mut settled = FixedBitSet::with_capacity(n);
    let mut heap = BinaryHeap::new();

    distances[origin.get()] = 0.0;
    heap.push(State {
        cost: 0.0,
        node: origin,
    });

    while let Some(State { cost, node }) = heap.pop() {
        if settled.put(node.get()) {
            continue;
        }

        for (next, edge) in graph.arcs(node) {
            let next_cost = cost + weight(edge);
            if next_cost < distances[next.get()] {
                distances[next.get()] = next_cost;
                predecessors[next.get()] = Some((node, edge));
                heap.push(State {
                    cost: next_cost,
                    node: next,
                });
            }
        }
    }

    ShortestPaths {
        origin,
        distances,
        predecessors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::filter;
    use crate::fixtures;
    use lifeline_model::state::ComponentStates;

    #[test]
    fn test_reachable_forward_and_backward_on_digraph() {
        let network = fixtures::substation();
        let graph = filter(&network, &ComponentStates::all_surviving(&network));
        let s1 = network.node_index("s1").unwrap();
        let o3 = network.node_index("o3").unwrap();

        let forward = reachable(&graph, &[s1], Direction::Outgoing);
        assert_eq!(forward.count_ones(..), network.num_nodes());

        let backward = reachable(&graph, &[o3], Direction::Incoming);
        assert!(backward.contains(s1.get()));
        assert!(backward.contains(o3.get()));
        assert!(!backward.contains(network.node_index("o1").unwrap().get()));
    }

    #[test]
    fn test_seed_reaches_itself() {
        let network = fixtures::toynet();
        let graph = filter(&network, &ComponentStates::new());
        let n1 = network.node_index("n1").unwrap();
        let seen = reachable(&graph, &[n1, n1], Direction::Outgoing);
        assert_eq!(seen.count_ones(..), 1);
    }

    #[test]
    fn test_seeds_in_separate_components() {
        let network = fixtures::toynet();
        let mut states = ComponentStates::all_surviving(&network);
        states.fail_all(["e01", "e02", "e03"]);
        let graph = filter(&network, &states);
        let n1 = network.node_index("n1").unwrap();
        let n7 = network.node_index("n7").unwrap();

        let alone = reachable(&graph, &[n1], Direction::Outgoing);
        assert_eq!(alone.count_ones(..), 1);

        let both = reachable(&graph, &[n1, n7], Direction::Outgoing);
        assert_eq!(both.count_ones(..), network.num_nodes());
        assert_eq!(both, reachable(&graph, &[n7, n1], Direction::Incoming));
    }

    #[test]
    fn test_shortest_paths_on_toynet() {
        let network = fixtures::toynet();
        let graph = filter(&network, &ComponentStates::all_surviving(&network));
        let n1 = network.node_index("n1").unwrap();
        let n5 = network.node_index("n5").unwrap();
        let tree = shortest_paths(&graph, n1, |e| {
            network.edge(e).weight("length").unwrap_or(f64::INFINITY)
        });

        let d = tree.distance(n5).unwrap();
        assert!((d - (2f64.sqrt() + 1.0)).abs() < 1e-9);

        let path = tree.path(n5).unwrap();
        let ids: Vec<&str> = path.nodes.iter().map(|&n| network.node(n).id()).collect();
        assert_eq!(ids, vec!["n1", "n2", "n5"]);
        assert_eq!(path.edges.len(), 2);
        assert_eq!(tree.origin(), n1);
    }

    #[test]
    fn test_unreachable_target_has_no_path() {
        let network = fixtures::toynet();
        let graph = filter(&network, &ComponentStates::new());
        let n1 = network.node_index("n1").unwrap();
        let n7 = network.node_index("n7").unwrap();
        let tree = shortest_paths(&graph, n1, |_| 1.0);

        assert_eq!(tree.distance(n1), Some(0.0));
        assert_eq!(tree.distance(n7), None);
        assert!(tree.path(n7).is_none());
        assert_eq!(tree.path(n1).unwrap().nodes, vec![n1]);
    }
}
