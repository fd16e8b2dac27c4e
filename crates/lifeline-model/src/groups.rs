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

//! Node-group partition for capacity evaluation.
//!
//! Nodes are split into sources, named input groups, named output groups (plus a flat
//! list of every output node) and named transmission groups. The partition is derived
//! once per network and then shared by every capacity evaluation on it.

use crate::{
    index::NodeIndex,
    network::{GROUP_ATTR, KIND_ATTR, Network, NetworkError, NodeKind},
};
use serde::{Deserialize, Serialize};

/// A named set of nodes sharing one nominal capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeGroup {
    name: String,
    members: Vec<NodeIndex>,
}

impl NodeGroup {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn members(&self) -> &[NodeIndex] {
        &self.members
    }

    /// The member whose attributes stand for the whole group.
    #[inline]
    pub fn representative(&self) -> Option<NodeIndex> {
        self.members.first().copied()
    }
}

/// Appends `node` to the group called `name`, creating the group on first sight.
fn push_member(groups: &mut Vec<NodeGroup>, name: &str, node: NodeIndex) {
    match groups.iter_mut().find(|g| g.name == name) {
        Some(group) => group.members.push(node),
        None => groups.push(NodeGroup {
            name: name.to_owned(),
            members: vec![node],
        }),
    }
}

/// The id-based external form of a node-group partition.
///
/// ```json
/// {
///   "source": ["s1"],
///   "input": {"I1": ["i1", "i2"]},
///   "output": {"O1": ["o1"]},
///   "output_list": ["o1"],
///   "transmission": {"T1": ["t1"]}
/// }
/// ```
///
/// Group order is the document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeGroupsDocument {
    #[serde(default)]
    pub source: Vec<String>,
    #[serde(default)]
    pub input: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub output: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub output_list: Vec<String>,
    #[serde(default)]
    pub transmission: serde_json::Map<String, serde_json::Value>,
}

/// The resolved node-group partition of a `Network`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeGroups {
    sources: Vec<NodeIndex>,
    inputs: Vec<NodeGroup>,
    outputs: Vec<NodeGroup>,
    output_list: Vec<NodeIndex>,
    transmissions: Vec<NodeGroup>,
}

impl NodeGroups {
    /// Derives the partition from the `type` and `group_name` node attributes.
    ///
    /// Nodes are visited in network order; groups appear in the order their first
    /// member is met. Nodes tagged with any other type are left out.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::MissingAttribute` if a node has no `type`, or if an input,
    /// output or transmission node has no `group_name`.
    pub fn from_network(network: &Network) -> Result<Self, NetworkError> {
        let mut groups = NodeGroups::default();

        for (i, node) in network.nodes().iter().enumerate() {
            let index = NodeIndex::new(i);
            let kind = node.kind().ok_or_else(|| NetworkError::MissingAttribute {
                node: node.id().to_owned(),
                attribute: KIND_ATTR,
            })?;

            let target = match kind {
                NodeKind::Source => {
                    groups.sources.push(index);
                    continue;
                }
                NodeKind::Other => continue,
                NodeKind::Input => &mut groups.inputs,
                NodeKind::Output => {
                    groups.output_list.push(index);
                    &mut groups.outputs
                }
                NodeKind::Transmission => &mut groups.transmissions,
            };

            let group = node
                .group_name()
                .ok_or_else(|| NetworkError::MissingAttribute {
                    node: node.id().to_owned(),
                    attribute: GROUP_ATTR,
                })?;
            push_member(target, group, index);
        }

        Ok(groups)
    }

    /// Resolves an id-based partition against `network`.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError::UnknownNode` for ids the network does not contain and
    /// `NetworkError::EmptyGroup` for groups without members. A group value that is not
    /// a list of strings is reported as an empty group of that name.
    pub fn from_document(
        network: &Network,
        document: &NodeGroupsDocument,
    ) -> Result<Self, NetworkError> {
        let resolve = |id: &str| {
            network
                .node_index(id)
                .ok_or_else(|| NetworkError::UnknownNode(id.to_owned()))
        };
        let resolve_all = |ids: &[String]| -> Result<Vec<NodeIndex>, NetworkError> {
            ids.iter().map(|id| resolve(id.as_str())).collect()
        };
        let resolve_groups = |map: &serde_json::Map<String, serde_json::Value>| {
            map.iter()
                .map(|(name, value)| -> Result<NodeGroup, NetworkError> {
                    let ids: Vec<String> = serde_json::from_value(value.clone())
                        .map_err(|_| NetworkError::EmptyGroup(name.clone()))?;
                    if ids.is_empty() {
                        return Err(NetworkError::EmptyGroup(name.clone()));
                    }
                    Ok(NodeGroup {
                        name: name.clone(),
                        members: resolve_all(&ids)?,
                    })
                })
                .collect::<Result<Vec<_>, NetworkError>>()
        };

        Ok(NodeGroups {
            sources: resolve_all(&document.source)?,
            inputs: resolve_groups(&document.input)?,
            outputs: resolve_groups(&document.output)?,
            output_list: resolve_all(&document.output_list)?,
            transmissions: resolve_groups(&document.transmission)?,
        })
    }

    #[inline]
    pub fn sources(&self) -> &[NodeIndex] {
        &self.sources
    }

    #[inline]
    pub fn inputs(&self) -> &[NodeGroup] {
        &self.inputs
    }

    #[inline]
    pub fn outputs(&self) -> &[NodeGroup] {
        &self.outputs
    }

    /// Every output node, across all output groups.
    #[inline]
    pub fn output_list(&self) -> &[NodeIndex] {
        &self.output_list
    }

    #[inline]
    pub fn transmissions(&self) -> &[NodeGroup] {
        &self.transmissions
    }

    /// Converts the partition back into its id-based form.
    pub fn to_document(&self, network: &Network) -> NodeGroupsDocument {
        let ids = |nodes: &[NodeIndex]| -> Vec<String> {
            nodes
                .iter()
                .map(|&n| network.node(n).id().to_owned())
                .collect()
        };
        let groups = |groups: &[NodeGroup]| -> serde_json::Map<String, serde_json::Value> {
            groups
                .iter()
                .map(|g| (g.name.clone(), serde_json::Value::from(ids(&g.members))))
                .collect()
        };

        NodeGroupsDocument {
            source: ids(&self.sources),
            input: groups(&self.inputs),
            output: groups(&self.outputs),
            output_list: ids(&self.output_list),
            transmission: groups(&self.transmissions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Attributes, NetworkBuilder};
    use serde_json::json;

    fn node(b: &mut NetworkBuilder, id: &str, value: serde_json::Value) {
        b.add_node(id, value.as_object().cloned().unwrap_or_default())
            .unwrap();
    }

    fn substation() -> Network {
        let mut b = NetworkBuilder::directed();
        node(&mut b, "s1", json!({"type": "source"}));
        node(&mut b, "i1", json!({"type": "input", "group_name": "I", "capacity": 10}));
        node(&mut b, "t1", json!({"type": "transmission", "group_name": "T", "capacity": 8}));
        node(&mut b, "i2", json!({"type": "input", "group_name": "I", "capacity": 10}));
        node(&mut b, "o1", json!({"type": "output", "group_name": "O2", "capacity": 4}));
        node(&mut b, "o2", json!({"type": "output", "group_name": "O1", "capacity": 4}));
        node(&mut b, "bus", json!({"type": "bus"}));
        b.build()
    }

    #[test]
    fn test_from_network_preserves_first_appearance_order() {
        let network = substation();
        let groups = NodeGroups::from_network(&network).unwrap();

        assert_eq!(groups.sources(), &[NodeIndex::new(0)]);
        assert_eq!(groups.inputs().len(), 1);
        assert_eq!(groups.inputs()[0].name(), "I");
        assert_eq!(
            groups.inputs()[0].members(),
            &[NodeIndex::new(1), NodeIndex::new(3)]
        );
        let names: Vec<&str> = groups.outputs().iter().map(NodeGroup::name).collect();
        assert_eq!(names, vec!["O2", "O1"]);
        assert_eq!(groups.output_list(), &[NodeIndex::new(4), NodeIndex::new(5)]);
        assert_eq!(groups.transmissions()[0].representative(), Some(NodeIndex::new(2)));
    }

    #[test]
    fn test_missing_type_is_an_error() {
        let mut b = NetworkBuilder::undirected();
        b.add_node("x", Attributes::new()).unwrap();
        let err = NodeGroups::from_network(&b.build()).unwrap_err();
        assert_eq!(
            err,
            NetworkError::MissingAttribute {
                node: "x".into(),
                attribute: KIND_ATTR
            }
        );
    }

    #[test]
    fn test_missing_group_name_is_an_error() {
        let mut b = NetworkBuilder::undirected();
        node(&mut b, "i", json!({"type": "input"}));
        let err = NodeGroups::from_network(&b.build()).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::MissingAttribute { attribute: GROUP_ATTR, .. }
        ));
    }

    #[test]
    fn test_document_roundtrip() {
        let network = substation();
        let groups = NodeGroups::from_network(&network).unwrap();
        let document = groups.to_document(&network);
        assert_eq!(document.output_list, vec!["o1".to_string(), "o2".to_string()]);

        let text = serde_json::to_string(&document).unwrap();
        let parsed: NodeGroupsDocument = serde_json::from_str(&text).unwrap();
        let resolved = NodeGroups::from_document(&network, &parsed).unwrap();
        assert_eq!(resolved, groups);
    }

    #[test]
    fn test_document_with_unknown_or_empty_group_fails() {
        let network = substation();
        let unknown: NodeGroupsDocument =
            serde_json::from_value(json!({"source": ["nope"]})).unwrap();
        assert_eq!(
            NodeGroups::from_document(&network, &unknown),
            Err(NetworkError::UnknownNode("nope".into()))
        );

        let empty: NodeGroupsDocument =
            serde_json::from_value(json!({"input": {"I": []}})).unwrap();
        assert_eq!(
            NodeGroups::from_document(&network, &empty),
            Err(NetworkError::EmptyGroup("I".into()))
        );
    }
}
