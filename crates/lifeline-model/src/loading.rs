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

//! Network loader for node / edge maps.
//!
//! Datasets describe a network with two JSON documents: a node map and an edge map.
//! Both come in two layouts that this module accepts interchangeably:
//!
//! * a dictionary keyed by id: `{"n1": {...}}` and `{"e01": {"from": "n1", "to": "n2", ...}}`;
//! * a list of records: `[{"id": "n1", ...}]` and
//!   `[{"eid": "e01", "source": "n1", "target": "n2", ...}]`.
//!
//! `source` / `target` are normalised to `from` / `to` and are not kept as attributes.
//! Every other key becomes a node or edge attribute. Reading the documents from disk is
//! left to the caller; the loader works on strings, readers and parsed values.

use crate::network::{Attributes, Network, NetworkBuilder, NetworkError, Orientation};
use serde_json::Value;
use std::io::Read;

/// The error type for the network loading process.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The input is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// A section is neither a JSON object nor an array.
    #[error("'{section}' must be a JSON object or array")]
    InvalidShape { section: &'static str },
    /// A node or edge record is not a JSON object.
    #[error("'{section}' entry '{key}' is not a JSON object")]
    InvalidEntry { section: &'static str, key: String },
    /// A list-form record lacks its identifier.
    #[error("'{section}' entry at position {position} is missing '{field}'")]
    MissingId {
        section: &'static str,
        position: usize,
        field: &'static str,
    },
    /// An edge lacks one of its endpoints.
    #[error("edge '{edge}' is missing '{field}'")]
    MissingEndpoint { edge: String, field: &'static str },
    /// The records are well-formed but describe an invalid network.
    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// A normalised edge record.
struct EdgeRecord {
    eid: String,
    from: String,
    to: String,
    directed: Option<bool>,
    attributes: Attributes,
}

/// Turns an id value into a string; integer ids are accepted as well.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn object<'a>(
    section: &'static str,
    key: impl FnOnce() -> String,
    value: &'a Value,
) -> Result<&'a Attributes, LoadError> {
    value.as_object().ok_or_else(|| LoadError::InvalidEntry {
        section,
        key: key(),
    })
}

fn node_records(nodes: &Value) -> Result<Vec<(String, Attributes)>, LoadError> {
    match nodes {
        Value::Object(map) => map
            .iter()
            .map(|(id, attrs)| -> Result<(String, Attributes), LoadError> {
                Ok((id.clone(), object("nodes", || id.clone(), attrs)?.clone()))
            })
            .collect(),
        Value::Array(list) => list
            .iter()
            .enumerate()
            .map(|(position, entry)| -> Result<(String, Attributes), LoadError> {
                let mut attrs = object("nodes", || position.to_string(), entry)?.clone();
                let id = attrs
                    .remove("id")
                    .as_ref()
                    .and_then(id_string)
                    .ok_or(LoadError::MissingId {
                        section: "nodes",
                        position,
                        field: "id",
                    })?;
                Ok((id, attrs))
            })
            .collect(),
        _ => Err(LoadError::InvalidShape { section: "nodes" }),
    }
}

fn edge_record(eid: String, mut attrs: Attributes) -> Result<EdgeRecord, LoadError> {
    let mut endpoint = |primary: &'static str, alias: &'static str| {
        let value = match attrs.remove(primary) {
            Some(v) => Some(v),
            None => attrs.remove(alias),
        };
        value
            .as_ref()
            .and_then(id_string)
            .ok_or_else(|| LoadError::MissingEndpoint {
                edge: eid.clone(),
                field: primary,
            })
    };
    let from = endpoint("from", "source")?;
    let to = endpoint("to", "target")?;
    let directed = attrs.remove("directed").and_then(|v| v.as_bool());

    Ok(EdgeRecord {
        eid,
        from,
        to,
        directed,
        attributes: attrs,
    })
}

fn edge_records(edges: &Value) -> Result<Vec<EdgeRecord>, LoadError> {
    match edges {
        Value::Object(map) => map
            .iter()
            .map(|(eid, entry)| -> Result<EdgeRecord, LoadError> {
                let attrs = object("edges", || eid.clone(), entry)?.clone();
                edge_record(eid.clone(), attrs)
            })
            .collect(),
        Value::Array(list) => list
            .iter()
            .enumerate()
            .map(|(position, entry)| -> Result<EdgeRecord, LoadError> {
                let mut attrs = object("edges", || position.to_string(), entry)?.clone();
                let eid = attrs
                    .remove("eid")
                    .as_ref()
                    .and_then(id_string)
                    .ok_or(LoadError::MissingId {
                        section: "edges",
                        position,
                        field: "eid",
                    })?;
                edge_record(eid, attrs)
            })
            .collect(),
        _ => Err(LoadError::InvalidShape { section: "edges" }),
    }
}

/// A configurable loader that builds a `Network` from JSON node and edge maps.
///
/// # Configuration
/// * `orientation`: Forces the network orientation. When unset, the `directed` flag of
///   the first edge decides, and a network without that flag is undirected.
///
/// # Examples
///
/// ```rust
/// # use lifeline_model::loading::NetworkLoader;
///
/// let network = NetworkLoader::new()
///     .from_strs(
///         r#"{"n1": {"x": 0}, "n2": {"x": 1}}"#,
///         r#"{"e1": {"from": "n1", "to": "n2", "length": 1.0}}"#,
///     )
///     .unwrap();
/// assert_eq!(network.num_edges(), 1);
/// assert!(!network.is_directed());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkLoader {
    orientation: Option<Orientation>,
}

impl NetworkLoader {
    /// Creates a new `NetworkLoader` with default settings.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces the orientation of loaded networks.
    #[inline]
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    /// Loads a network from parsed node and edge documents.
    pub fn from_values(&self, nodes: &Value, edges: &Value) -> Result<Network, LoadError> {
        let nodes = node_records(nodes)?;
        let edges = edge_records(edges)?;

        let orientation = self.orientation.unwrap_or_else(|| {
            match edges.first().and_then(|e| e.directed) {
                Some(true) => Orientation::Directed,
                _ => Orientation::Undirected,
            }
        });

        let mut builder = NetworkBuilder::new(orientation);
        for (id, attrs) in nodes {
            builder.add_node(id, attrs)?;
        }
        for edge in edges {
            builder.add_edge(edge.eid, &edge.from, &edge.to, edge.attributes)?;
        }

        Ok(builder.build())
    }

    /// Loads a network from a single document of the form `{"nodes": ..., "edges": ...}`.
    pub fn from_document(&self, document: &Value) -> Result<Network, LoadError> {
        let nodes = document
            .get("nodes")
            .ok_or(LoadError::InvalidShape { section: "nodes" })?;
        let edges = document
            .get("edges")
            .ok_or(LoadError::InvalidShape { section: "edges" })?;
        self.from_values(nodes, edges)
    }

    /// Loads a network from node and edge JSON strings.
    #[inline]
    pub fn from_strs(&self, nodes: &str, edges: &str) -> Result<Network, LoadError> {
        let nodes: Value = serde_json::from_str(nodes)?;
        let edges: Value = serde_json::from_str(edges)?;
        self.from_values(&nodes, &edges)
    }

    /// Loads a network from node and edge JSON readers.
    #[inline]
    pub fn from_readers<N: Read, E: Read>(&self, nodes: N, edges: E) -> Result<Network, LoadError> {
        let nodes: Value = serde_json::from_reader(nodes)?;
        let edges: Value = serde_json::from_reader(edges)?;
        self.from_values(&nodes, &edges)
    }
}
