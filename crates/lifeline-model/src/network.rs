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

use crate::index::{EdgeIndex, NodeIndex};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form attributes attached to nodes and edges, keyed by attribute name.
pub type Attributes = serde_json::Map<String, Value>;

/// Attribute holding the node role (`source`, `input`, `output`, `transmission`).
pub const KIND_ATTR: &str = "type";
/// Attribute holding the group a typed node belongs to.
pub const GROUP_ATTR: &str = "group_name";
/// Attribute holding the nominal capacity of a node.
pub const CAPACITY_ATTR: &str = "capacity";

/// The error type for network construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// A node with the same id was already added.
    #[error("duplicate node id '{0}'")]
    DuplicateNode(String),
    /// An edge with the same id was already added.
    #[error("duplicate edge id '{0}'")]
    DuplicateEdge(String),
    /// An edge references a node that is not part of the network.
    #[error("edge '{edge}' references unknown node '{node}'")]
    UnknownEndpoint { edge: String, node: String },
    /// A node id is not part of the network.
    #[error("unknown node '{0}'")]
    UnknownNode(String),
    /// A node lacks an attribute that is required for the requested operation.
    #[error("node '{node}' is missing required attribute '{attribute}'")]
    MissingAttribute {
        node: String,
        attribute: &'static str,
    },
    /// A node group has no members.
    #[error("node group '{0}' has no members")]
    EmptyGroup(String),
}

/// Whether edges can be traversed in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Undirected,
    Directed,
}

/// The role a node plays in capacity evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Source,
    Input,
    Output,
    Transmission,
    /// Any other tag (junctions, buses, ...). Ignored by group derivation.
    Other,
}

impl NodeKind {
    fn parse(tag: &str) -> Self {
        match tag {
            "source" => NodeKind::Source,
            "input" => NodeKind::Input,
            "output" => NodeKind::Output,
            "transmission" => NodeKind::Transmission,
            _ => NodeKind::Other,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NodeKind::Source => "source",
            NodeKind::Input => "input",
            NodeKind::Output => "output",
            NodeKind::Transmission => "transmission",
            NodeKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// A network node. Nodes are also components: a state vector may switch them off.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: String,
    attributes: Attributes,
}

impl Node {
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    #[inline]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Returns the node role, or `None` if the node carries no `type` attribute.
    pub fn kind(&self) -> Option<NodeKind> {
        self.attributes
            .get(KIND_ATTR)
            .and_then(Value::as_str)
            .map(NodeKind::parse)
    }

    pub fn group_name(&self) -> Option<&str> {
        self.attributes.get(GROUP_ATTR).and_then(Value::as_str)
    }

    /// Returns the numeric `capacity` attribute.
    pub fn capacity(&self) -> Option<f64> {
        self.attributes.get(CAPACITY_ATTR).and_then(Value::as_f64)
    }

    /// Returns the 2D position stored as `x`/`y`, falling back to `pos_x`/`pos_y`.
    pub fn position(&self) -> Option<(f64, f64)> {
        coordinate_pair(&self.attributes, "x", "y")
            .or_else(|| coordinate_pair(&self.attributes, "pos_x", "pos_y"))
    }
}

fn coordinate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coordinate_pair(attributes: &Attributes, x: &str, y: &str) -> Option<(f64, f64)> {
    let x = attributes.get(x).and_then(coordinate)?;
    let y = attributes.get(y).and_then(coordinate)?;
    Some((x, y))
}

/// A network edge. Edges with an id are components addressable by a state vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    eid: Option<String>,
    from: NodeIndex,
    to: NodeIndex,
    attributes: Attributes,
}

impl Edge {
    #[inline]
    pub fn eid(&self) -> Option<&str> {
        self.eid.as_deref()
    }

    #[inline]
    pub fn from(&self) -> NodeIndex {
        self.from
    }

    #[inline]
    pub fn to(&self) -> NodeIndex {
        self.to
    }

    #[inline]
    pub fn endpoints(&self) -> (NodeIndex, NodeIndex) {
        (self.from, self.to)
    }

    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    #[inline]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Returns the attribute `name` as a weight if it is numeric.
    ///
    /// `null`, strings and other non-numeric values yield `None`, which marks the
    /// edge as unusable for weighted searches.
    #[inline]
    pub fn weight(&self, name: &str) -> Option<f64> {
        self.attributes.get(name).and_then(Value::as_f64)
    }
}

/// The immutable base graph of an evaluation session.
///
/// Nodes and edges are stored in insertion order and addressed through
/// `NodeIndex` / `EdgeIndex`. String ids are resolved through hash lookups.
///
/// Construction:
/// - Use `NetworkBuilder` (or `loading::NetworkLoader`) to obtain a validated `Network`.
#[derive(Debug, Clone)]
pub struct Network {
    orientation: Orientation,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_lookup: FxHashMap<String, NodeIndex>,
    edge_lookup: FxHashMap<String, EdgeIndex>,
}

impl Network {
    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[inline]
    pub fn is_directed(&self) -> bool {
        self.orientation == Orientation::Directed
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns the node at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not in `0..num_nodes()`.
    #[inline]
    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index.get()]
    }

    /// Returns the edge at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not in `0..num_edges()`.
    #[inline]
    pub fn edge(&self, index: EdgeIndex) -> &Edge {
        &self.edges[index.get()]
    }

    #[inline]
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_lookup.get(id).copied()
    }

    #[inline]
    pub fn edge_index(&self, eid: &str) -> Option<EdgeIndex> {
        self.edge_lookup.get(eid).copied()
    }

    #[inline]
    pub fn contains_node(&self, id: &str) -> bool {
        self.node_lookup.contains_key(id)
    }

    #[inline]
    pub fn contains_edge(&self, eid: &str) -> bool {
        self.edge_lookup.contains_key(eid)
    }

    /// Returns `true` if `id` names a node or an edge of this network.
    #[inline]
    pub fn contains_component(&self, id: &str) -> bool {
        self.contains_node(id) || self.contains_edge(id)
    }

    /// Returns the edge id, or a `"u->v"` token built from the endpoint ids when the
    /// edge has none.
    pub fn edge_label(&self, index: EdgeIndex) -> String {
        let edge = self.edge(index);
        match edge.eid() {
            Some(eid) => eid.to_owned(),
            None => format!(
                "{}->{}",
                self.node(edge.from).id(),
                self.node(edge.to).id()
            ),
        }
    }

    /// Iterates over node ids followed by edge ids.
    pub fn component_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .iter()
            .map(Node::id)
            .chain(self.edges.iter().filter_map(Edge::eid))
    }
}

/// A builder for `Network`.
///
/// Every insertion is validated immediately: node ids and edge ids must be unique and
/// edge endpoints must already exist. Nodes therefore have to be added before the
/// edges that reference them.
///
/// # Examples
///
/// ```rust
/// # use lifeline_model::network::{Attributes, NetworkBuilder};
///
/// let mut builder = NetworkBuilder::undirected();
/// builder.add_node("a", Attributes::new()).unwrap();
/// builder.add_node("b", Attributes::new()).unwrap();
/// builder.add_edge("e1", "a", "b", Attributes::new()).unwrap();
/// let network = builder.build();
/// assert_eq!(network.num_nodes(), 2);
/// assert_eq!(network.num_edges(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct NetworkBuilder {
    orientation: Orientation,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_lookup: FxHashMap<String, NodeIndex>,
    edge_lookup: FxHashMap<String, EdgeIndex>,
}

impl NetworkBuilder {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            ..Self::default()
        }
    }

    #[inline]
    pub fn undirected() -> Self {
        Self::new(Orientation::Undirected)
    }

    #[inline]
    pub fn directed() -> Self {
        Self::new(Orientation::Directed)
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Adds a node.
    ///
    /// Returns `NetworkError::DuplicateNode` if the id is already taken.
    pub fn add_node(
        &mut self,
        id: impl Into<String>,
        attributes: Attributes,
    ) -> Result<NodeIndex, NetworkError> {
        let id = id.into();
        if self.node_lookup.contains_key(&id) {
            return Err(NetworkError::DuplicateNode(id));
        }

        let index = NodeIndex::new(self.nodes.len());
        self.node_lookup.insert(id.clone(), index);
        self.nodes.push(Node { id, attributes });
        Ok(index)
    }

    /// Adds an edge identified by `eid` between two existing nodes.
    pub fn add_edge(
        &mut self,
        eid: impl Into<String>,
        from: &str,
        to: &str,
        attributes: Attributes,
    ) -> Result<EdgeIndex, NetworkError> {
        let eid = eid.into();
        if self.edge_lookup.contains_key(&eid) {
            return Err(NetworkError::DuplicateEdge(eid));
        }

        let (from, to) = self.resolve_endpoints(&eid, from, to)?;
        let index = EdgeIndex::new(self.edges.len());
        self.edge_lookup.insert(eid.clone(), index);
        self.edges.push(Edge {
            eid: Some(eid),
            from,
            to,
            attributes,
        });
        Ok(index)
    }

    /// Adds an edge without an id.
    ///
    /// Such an edge cannot be switched on by a state vector and is therefore never part
    /// of a state-filtered subgraph. It still counts for failure-free baselines.
    pub fn add_anonymous_edge(
        &mut self,
        from: &str,
        to: &str,
        attributes: Attributes,
    ) -> Result<EdgeIndex, NetworkError> {
        let label = format!("{from}->{to}");
        let (from, to) = self.resolve_endpoints(&label, from, to)?;
        let index = EdgeIndex::new(self.edges.len());
        self.edges.push(Edge {
            eid: None,
            from,
            to,
            attributes,
        });
        Ok(index)
    }

    fn resolve_endpoints(
        &self,
        edge: &str,
        from: &str,
        to: &str,
    ) -> Result<(NodeIndex, NodeIndex), NetworkError> {
        let lookup = |node: &str| {
            self.node_lookup
                .get(node)
                .copied()
                .ok_or_else(|| NetworkError::UnknownEndpoint {
                    edge: edge.to_owned(),
                    node: node.to_owned(),
                })
        };
        Ok((lookup(from)?, lookup(to)?))
    }

    /// Finalizes the builder into an immutable `Network`.
    pub fn build(self) -> Network {
        Network {
            orientation: self.orientation,
            nodes: self.nodes,
            edges: self.edges,
            node_lookup: self.node_lookup,
            edge_lookup: self.edge_lookup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        value.as_object().cloned().unwrap_or_default()
    }

    fn small() -> Network {
        let mut b = NetworkBuilder::undirected();
        b.add_node("a", attrs(json!({"x": 0.0, "y": 1.0, "type": "source"})))
            .unwrap();
        b.add_node(
            "b",
            attrs(json!({"pos_x": "2.5", "pos_y": 3, "type": "junction"})),
        )
        .unwrap();
        b.add_node("c", Attributes::new()).unwrap();
        b.add_edge("e1", "a", "b", attrs(json!({"length": 2.0})))
            .unwrap();
        b.add_anonymous_edge("b", "c", attrs(json!({"length": null})))
            .unwrap();
        b.build()
    }

    #[test]
    fn test_lookup_and_counts() {
        let n = small();
        assert_eq!(n.num_nodes(), 3);
        assert_eq!(n.num_edges(), 2);
        assert_eq!(n.node_index("b"), Some(NodeIndex::new(1)));
        assert_eq!(n.edge_index("e1"), Some(EdgeIndex::new(0)));
        assert!(n.contains_component("e1"));
        assert!(n.contains_component("c"));
        assert!(!n.contains_component("zz"));
        assert!(!n.is_directed());
    }

    #[test]
    fn test_attribute_accessors() {
        let n = small();
        let a = n.node(NodeIndex::new(0));
        assert_eq!(a.kind(), Some(NodeKind::Source));
        assert_eq!(a.position(), Some((0.0, 1.0)));

        let b = n.node(NodeIndex::new(1));
        assert_eq!(b.kind(), Some(NodeKind::Other));
        assert_eq!(b.position(), Some((2.5, 3.0)));

        let c = n.node(NodeIndex::new(2));
        assert_eq!(c.kind(), None);
        assert_eq!(c.capacity(), None);
    }

    #[test]
    fn test_edge_weights_and_labels() {
        let n = small();
        assert_eq!(n.edge(EdgeIndex::new(0)).weight("length"), Some(2.0));
        assert_eq!(n.edge(EdgeIndex::new(1)).weight("length"), None);
        assert_eq!(n.edge_label(EdgeIndex::new(0)), "e1");
        assert_eq!(n.edge_label(EdgeIndex::new(1)), "b->c");
        let ids: Vec<&str> = n.component_ids().collect();
        assert_eq!(ids, vec!["a", "b", "c", "e1"]);
    }

    #[test]
    fn test_duplicates_are_rejected() {
        let mut b = NetworkBuilder::directed();
        b.add_node("a", Attributes::new()).unwrap();
        b.add_node("b", Attributes::new()).unwrap();
        assert_eq!(
            b.add_node("a", Attributes::new()),
            Err(NetworkError::DuplicateNode("a".into()))
        );
        b.add_edge("e", "a", "b", Attributes::new()).unwrap();
        assert_eq!(
            b.add_edge("e", "b", "a", Attributes::new()),
            Err(NetworkError::DuplicateEdge("e".into()))
        );
    }

    #[test]
    fn test_unknown_endpoint_fails_fast() {
        let mut b = NetworkBuilder::undirected();
        b.add_node("a", Attributes::new()).unwrap();
        let err = b.add_edge("e", "a", "ghost", Attributes::new()).unwrap_err();
        assert_eq!(
            err,
            NetworkError::UnknownEndpoint {
                edge: "e".into(),
                node: "ghost".into()
            }
        );
        assert_eq!(b.num_edges(), 0);
    }
}
