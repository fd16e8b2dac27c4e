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

//! State-conditioned subgraph construction.
//!
//! Given a base `Network` and a `ComponentStates` vector, the filter derives a fresh
//! `FilteredGraph` holding **every** base node but only the surviving edges:
//!
//! - a node is *off* if the state vector marks its id with `0`;
//! - an edge is kept iff neither endpoint is off **and** its id is marked with `1`.
//!
//! An edge whose id is absent from the state vector (or that has no id at all) is
//! treated as failed. Callers sampling only a subset of the components must therefore
//! mark the remaining edges as surviving explicitly.
//!
//! Ids in the state vector that name no component of the network are governed by an
//! `UnknownComponentPolicy`. The default ignores them, matching the lenient behaviour
//! that outer samplers rely on; `Warn` and `Reject` turn the looseness into a
//! validation boundary.
//!
//! Undirected edges are stored as two opposite arcs in the underlying `petgraph`
//! digraph, so traversals are written once for both orientations. Filtering is
//! `O(V + E + |states|)` and never touches the base network.

use crate::error::EvalError;
use fixedbitset::FixedBitSet;
use lifeline_model::{
    index::{EdgeIndex, NodeIndex},
    network::{Network, Orientation},
    state::{ComponentState, ComponentStates},
};
use petgraph::{Direction, graph::DiGraph};
use serde::{Deserialize, Serialize};

/// What to do with state-vector ids that are not part of the network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownComponentPolicy {
    /// Silently skip them (a count is logged at `debug` level).
    #[default]
    Ignore,
    /// Skip them and log every id at `warn` level.
    Warn,
    /// Fail the evaluation with `EvalError::UnknownComponent`.
    Reject,
}

#[inline(always)]
fn graph_node(index: NodeIndex) -> petgraph::graph::NodeIndex {
    petgraph::graph::NodeIndex::new(index.get())
}

/// The subgraph of a `Network` induced by the surviving components.
///
/// The node set always equals the base node set; only edges are removed.
#[derive(Debug, Clone)]
pub struct FilteredGraph {
    graph: DiGraph<NodeIndex, EdgeIndex>,
    orientation: Orientation,
    off_nodes: FixedBitSet,
    kept_edges: FixedBitSet,
}

impl FilteredGraph {
    /// Builds the subgraph of surviving components, additionally restricted to the
    /// edges accepted by `keep`.
    pub fn from_states<P>(network: &Network, states: &ComponentStates, keep: P) -> Self
    where
        P: Fn(EdgeIndex) -> bool,
    {
        let mut off_nodes = FixedBitSet::with_capacity(network.num_nodes());
        for (id, state) in states.iter() {
            if state.is_failed() {
                if let Some(node) = network.node_index(id) {
                    off_nodes.insert(node.get());
                }
            }
        }

        let is_on = |eid: Option<&str>| {
            eid.and_then(|eid| states.get(eid)) == Some(ComponentState::Surviving)
        };

        Self::assemble(network, off_nodes, |index| {
            is_on(network.edge(index).eid()) && keep(index)
        })
    }

    /// Builds the failure-free graph: every edge accepted by `keep`, regardless of any
    /// component state.
    pub fn baseline<P>(network: &Network, keep: P) -> Self
    where
        P: Fn(EdgeIndex) -> bool,
    {
        let off_nodes = FixedBitSet::with_capacity(network.num_nodes());
        Self::assemble(network, off_nodes, keep)
    }

    fn assemble<P>(network: &Network, off_nodes: FixedBitSet, include: P) -> Self
    where
        P: Fn(EdgeIndex) -> bool,
    {
        let directed = network.is_directed();
        let mut graph = DiGraph::with_capacity(
            network.num_nodes(),
            if directed {
                network.num_edges()
            } else {
                network.num_edges() * 2
            },
        );
        for i in 0..network.num_nodes() {
            graph.add_node(NodeIndex::new(i));
        }

        let mut kept_edges = FixedBitSet::with_capacity(network.num_edges());
        for (i, edge) in network.edges().iter().enumerate() {
            let index = EdgeIndex::new(i);
            let (u, v) = edge.endpoints();
            if off_nodes.contains(u.get()) || off_nodes.contains(v.get()) || !include(index) {
                continue;
            }

            kept_edges.insert(i);
            graph.add_edge(graph_node(u), graph_node(v), index);
            if !directed && u != v {
                graph.add_edge(graph_node(v), graph_node(u), index);
            }
        }

        Self {
            graph,
            orientation: network.orientation(),
            off_nodes,
            kept_edges,
        }
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[inline]
    pub fn is_directed(&self) -> bool {
        self.orientation == Orientation::Directed
    }

    /// Number of nodes, always equal to the base network's.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of base edges that survived the filter.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.kept_edges.count_ones(..)
    }

    #[inline]
    pub fn is_node_off(&self, node: NodeIndex) -> bool {
        self.off_nodes.contains(node.get())
    }

    #[inline]
    pub fn contains_edge(&self, edge: EdgeIndex) -> bool {
        self.kept_edges.contains(edge.get())
    }

    /// Returns `true` if any surviving edge touches `node`.
    pub fn has_incident_edges(&self, node: NodeIndex) -> bool {
        let n = graph_node(node);
        self.graph
            .neighbors_directed(n, Direction::Outgoing)
            .next()
            .is_some()
            || self
                .graph
                .neighbors_directed(n, Direction::Incoming)
                .next()
                .is_some()
    }

    /// Iterates over the neighbours of `node` in `direction`. For undirected networks
    /// both directions yield the same set.
    pub fn neighbors(
        &self,
        node: NodeIndex,
        direction: Direction,
    ) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .neighbors_directed(graph_node(node), direction)
            .map(|n| NodeIndex::new(n.index()))
    }

    /// Iterates over the outgoing arcs of `node` as `(target, edge)` pairs.
    pub fn arcs(&self, node: NodeIndex) -> impl Iterator<Item = (NodeIndex, EdgeIndex)> + '_ {
        use petgraph::visit::EdgeRef;

        self.graph
            .edges_directed(graph_node(node), Direction::Outgoing)
            .map(|e| (NodeIndex::new(e.target().index()), *e.weight()))
    }

    /// The underlying `petgraph` digraph. Undirected edges appear as two arcs.
    #[inline]
    pub fn graph(&self) -> &DiGraph<NodeIndex, EdgeIndex> {
        &self.graph
    }
}

/// Builds filtered graphs with a configurable unknown-id policy.
///
/// # Examples
///
/// ```rust
/// # use lifeline_eval::filter::{StateFilter, UnknownComponentPolicy};
/// # use lifeline_model::network::{Attributes, NetworkBuilder};
/// # use lifeline_model::state::{ComponentState, ComponentStates};
///
/// let mut builder = NetworkBuilder::undirected();
/// builder.add_node("a", Attributes::new()).unwrap();
/// builder.add_node("b", Attributes::new()).unwrap();
/// builder.add_edge("e1", "a", "b", Attributes::new()).unwrap();
/// let network = builder.build();
///
/// let states = ComponentStates::new().with("e1", ComponentState::Surviving);
/// let filtered = StateFilter::new().apply(&network, &states).unwrap();
/// assert_eq!(filtered.num_edges(), 1);
///
/// let typo = states.with("e9", ComponentState::Failed);
/// let strict = StateFilter::new().unknown_components(UnknownComponentPolicy::Reject);
/// assert!(strict.apply(&network, &typo).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFilter {
    #[serde(default)]
    unknown_components: UnknownComponentPolicy,
}

impl StateFilter {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the policy for state-vector ids that are not part of the network.
    #[inline]
    pub fn unknown_components(mut self, policy: UnknownComponentPolicy) -> Self {
        self.unknown_components = policy;
        self
    }

    #[inline]
    pub fn policy(&self) -> UnknownComponentPolicy {
        self.unknown_components
    }

    /// Derives the subgraph of surviving components.
    #[inline]
    pub fn apply(
        &self,
        network: &Network,
        states: &ComponentStates,
    ) -> Result<FilteredGraph, EvalError> {
        self.apply_where(network, states, |_| true)
    }

    /// Derives the subgraph of surviving components restricted to the edges accepted by
    /// `keep`.
    pub fn apply_where<P>(
        &self,
        network: &Network,
        states: &ComponentStates,
        keep: P,
    ) -> Result<FilteredGraph, EvalError>
    where
        P: Fn(EdgeIndex) -> bool,
    {
        self.screen(network, states)?;
        let filtered = FilteredGraph::from_states(network, states, keep);
        log::trace!(
            "state filter kept {} of {} edges",
            filtered.num_edges(),
            network.num_edges()
        );
        Ok(filtered)
    }

    /// Applies the unknown-id policy to `states`.
    fn screen(&self, network: &Network, states: &ComponentStates) -> Result<(), EvalError> {
        match self.unknown_components {
            UnknownComponentPolicy::Ignore => {
                if log::log_enabled!(log::Level::Debug) {
                    let unknown = unknown_ids(network, states).len();
                    if unknown > 0 {
                        log::debug!("ignoring {unknown} unknown component id(s) in state vector");
                    }
                }
                Ok(())
            }
            UnknownComponentPolicy::Warn => {
                for id in unknown_ids(network, states) {
                    log::warn!("state vector references unknown component '{id}'");
                }
                Ok(())
            }
            UnknownComponentPolicy::Reject => match unknown_ids(network, states).first() {
                Some(id) => Err(EvalError::UnknownComponent((*id).to_owned())),
                None => Ok(()),
            },
        }
    }
}

/// Unknown ids of `states`, sorted so that reports do not depend on hash order.
fn unknown_ids<'a>(network: &Network, states: &'a ComponentStates) -> Vec<&'a str> {
    let mut ids: Vec<&str> = states
        .iter()
        .map(|(id, _)| id)
        .filter(|id| !network.contains_component(id))
        .collect();
    ids.sort_unstable();
    ids
}

/// Derives the subgraph of surviving components with the default filter, which ignores
/// unknown ids.
#[inline]
pub fn filter(network: &Network, states: &ComponentStates) -> FilteredGraph {
    FilteredGraph::from_states(network, states, |_| true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use lifeline_model::network::{Attributes, NetworkBuilder};

    fn path_network() -> Network {
        let mut b = NetworkBuilder::undirected();
        for id in ["a", "b", "c"] {
            b.add_node(id, Attributes::new()).unwrap();
        }
        b.add_edge("ab", "a", "b", Attributes::new()).unwrap();
        b.add_edge("bc", "b", "c", Attributes::new()).unwrap();
        b.add_anonymous_edge("a", "c", Attributes::new()).unwrap();
        b.build()
    }

    #[test]
    fn test_all_nodes_are_kept() {
        let network = path_network();
        let filtered = filter(&network, &ComponentStates::new());
        assert_eq!(filtered.num_nodes(), 3);
        assert_eq!(filtered.num_edges(), 0);
    }

    #[test]
    fn test_only_explicitly_surviving_edges_are_kept() {
        let network = path_network();
        let states = ComponentStates::new().with("ab", ComponentState::Surviving);
        let filtered = filter(&network, &states);

        assert!(filtered.contains_edge(EdgeIndex::new(0)));
        assert!(!filtered.contains_edge(EdgeIndex::new(1)));
        // Edges without an id can never be switched on.
        assert!(!filtered.contains_edge(EdgeIndex::new(2)));
    }

    #[test]
    fn test_off_node_removes_incident_edges() {
        let network = path_network();
        let states = ComponentStates::all_surviving(&network).with("b", ComponentState::Failed);
        let filtered = filter(&network, &states);

        assert!(filtered.is_node_off(NodeIndex::new(1)));
        assert_eq!(filtered.num_edges(), 0);
        assert_eq!(filtered.num_nodes(), 3);
        assert!(!filtered.has_incident_edges(NodeIndex::new(0)));
    }

    #[test]
    fn test_undirected_edges_are_traversable_both_ways() {
        let network = path_network();
        let filtered = filter(&network, &ComponentStates::all_surviving(&network));
        let from_b: Vec<NodeIndex> = filtered
            .neighbors(NodeIndex::new(1), Direction::Outgoing)
            .collect();
        assert_eq!(from_b.len(), 2);
        assert_eq!(filtered.graph().edge_count(), 4);
    }

    #[test]
    fn test_predicate_restricts_edges() {
        let network = path_network();
        let states = ComponentStates::all_surviving(&network);
        let filtered = StateFilter::new()
            .apply_where(&network, &states, |e| e.get() != 0)
            .unwrap();
        assert_eq!(filtered.num_edges(), 1);
        assert!(filtered.contains_edge(EdgeIndex::new(1)));
    }

    #[test]
    fn test_baseline_ignores_states() {
        let network = path_network();
        let baseline = FilteredGraph::baseline(&network, |_| true);
        assert_eq!(baseline.num_edges(), 3);
        assert!(!baseline.is_node_off(NodeIndex::new(1)));
    }

    #[test]
    fn test_unknown_policy() {
        let network = path_network();
        let states = ComponentStates::all_surviving(&network)
            .with("zz", ComponentState::Failed)
            .with("yy", ComponentState::Surviving);

        assert!(StateFilter::new().apply(&network, &states).is_ok());
        assert!(
            StateFilter::new()
                .unknown_components(UnknownComponentPolicy::Warn)
                .apply(&network, &states)
                .is_ok()
        );
        assert_eq!(
            StateFilter::new()
                .unknown_components(UnknownComponentPolicy::Reject)
                .apply(&network, &states)
                .unwrap_err(),
            EvalError::UnknownComponent("yy".into())
        );
    }

    #[test]
    fn test_directed_edges_keep_their_direction() {
        let network = fixtures::substation();
        let filtered = filter(&network, &ComponentStates::all_surviving(&network));
        let s1 = network.node_index("s1").unwrap();
        assert_eq!(filtered.neighbors(s1, Direction::Incoming).count(), 0);
        assert_eq!(filtered.neighbors(s1, Direction::Outgoing).count(), 3);
    }

    #[test]
    fn test_toynet_edge_inclusion_invariant() {
        let network = fixtures::toynet();
        let states = ComponentStates::all_surviving(&network)
            .with("n4", ComponentState::Failed)
            .with("e01", ComponentState::Failed);
        let filtered = filter(&network, &states);

        for (i, edge) in network.edges().iter().enumerate() {
            let (u, v) = edge.endpoints();
            let expected = !filtered.is_node_off(u)
                && !filtered.is_node_off(v)
                && states.get(edge.eid().unwrap()) == Some(ComponentState::Surviving);
            assert_eq!(filtered.contains_edge(EdgeIndex::new(i)), expected);
        }
    }
}
