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

//! Component state vectors.
//!
//! A `ComponentStates` maps component ids (node ids and edge ids may be mixed) to a
//! binary `ComponentState`. It is produced by an outer sampler, one per evaluation, and
//! is read-only for the evaluators. Ids the network does not know are kept; whether they
//! are ignored, logged or rejected is decided by the state filter.

use crate::network::Network;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// The binary operating state of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ComponentState {
    /// State `0`.
    Failed,
    /// State `1`.
    Surviving,
}

impl ComponentState {
    #[inline]
    pub fn is_surviving(self) -> bool {
        self == ComponentState::Surviving
    }

    #[inline]
    pub fn is_failed(self) -> bool {
        self == ComponentState::Failed
    }
}

/// Error returned when a raw state is neither `0` nor `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("component state must be 0 or 1, got {0}")]
pub struct InvalidStateError(pub u8);

impl TryFrom<u8> for ComponentState {
    type Error = InvalidStateError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ComponentState::Failed),
            1 => Ok(ComponentState::Surviving),
            other => Err(InvalidStateError(other)),
        }
    }
}

impl From<ComponentState> for u8 {
    fn from(state: ComponentState) -> u8 {
        match state {
            ComponentState::Failed => 0,
            ComponentState::Surviving => 1,
        }
    }
}

impl From<bool> for ComponentState {
    fn from(surviving: bool) -> Self {
        if surviving {
            ComponentState::Surviving
        } else {
            ComponentState::Failed
        }
    }
}

impl std::fmt::Display for ComponentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// A mapping of component id to `ComponentState` for a single evaluation.
///
/// An id absent from the mapping has an unknown state.
///
/// # Examples
///
/// ```rust
/// # use lifeline_model::state::{ComponentState, ComponentStates};
///
/// let states: ComponentStates = serde_json::from_str(r#"{"e1": 1, "n3": 0}"#).unwrap();
/// assert_eq!(states.get("e1"), Some(ComponentState::Surviving));
/// assert_eq!(states.get("n3"), Some(ComponentState::Failed));
/// assert_eq!(states.get("e2"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentStates {
    states: FxHashMap<String, ComponentState>,
}

impl ComponentStates {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a vector in which every node and every identified edge of `network`
    /// survives.
    pub fn all_surviving(network: &Network) -> Self {
        network
            .component_ids()
            .map(|id| (id.to_owned(), ComponentState::Surviving))
            .collect()
    }

    /// Sets the state of `id`, replacing any previous value.
    #[inline]
    pub fn set(&mut self, id: impl Into<String>, state: ComponentState) -> &mut Self {
        self.states.insert(id.into(), state);
        self
    }

    /// By-value variant of `set` for chained construction.
    #[inline]
    pub fn with(mut self, id: impl Into<String>, state: ComponentState) -> Self {
        self.states.insert(id.into(), state);
        self
    }

    /// Marks every id in `ids` as failed.
    pub fn fail_all<I, S>(&mut self, ids: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for id in ids {
            self.states.insert(id.into(), ComponentState::Failed);
        }
        self
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<ComponentState> {
        self.states.get(id).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, ComponentState)> {
        self.states.iter().map(|(id, state)| (id.as_str(), *state))
    }
}

impl<S> FromIterator<(S, ComponentState)> for ComponentStates
where
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (S, ComponentState)>>(iter: I) -> Self {
        Self {
            states: iter.into_iter().map(|(id, st)| (id.into(), st)).collect(),
        }
    }
}

impl<S> Extend<(S, ComponentState)> for ComponentStates
where
    S: Into<String>,
{
    fn extend<I: IntoIterator<Item = (S, ComponentState)>>(&mut self, iter: I) {
        self.states
            .extend(iter.into_iter().map(|(id, st)| (id.into(), st)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Attributes, NetworkBuilder};

    #[test]
    fn test_state_conversions() {
        assert_eq!(ComponentState::try_from(0), Ok(ComponentState::Failed));
        assert_eq!(ComponentState::try_from(1), Ok(ComponentState::Surviving));
        assert_eq!(ComponentState::try_from(2), Err(InvalidStateError(2)));
        assert_eq!(u8::from(ComponentState::Surviving), 1);
        assert_eq!(ComponentState::from(false), ComponentState::Failed);
    }

    #[test]
    fn test_deserialize_rejects_non_binary_states() {
        let ok: ComponentStates = serde_json::from_str(r#"{"a": 0, "b": 1}"#).unwrap();
        assert_eq!(ok.len(), 2);
        assert!(serde_json::from_str::<ComponentStates>(r#"{"a": 3}"#).is_err());
    }

    #[test]
    fn test_all_surviving_covers_nodes_and_edges() {
        let mut b = NetworkBuilder::undirected();
        b.add_node("a", Attributes::new()).unwrap();
        b.add_node("b", Attributes::new()).unwrap();
        b.add_edge("e1", "a", "b", Attributes::new()).unwrap();
        b.add_anonymous_edge("b", "a", Attributes::new()).unwrap();
        let network = b.build();

        let states = ComponentStates::all_surviving(&network);
        assert_eq!(states.len(), 3);
        assert!(states.iter().all(|(_, st)| st.is_surviving()));
    }

    #[test]
    fn test_fail_all_overrides() {
        let mut states = ComponentStates::new()
            .with("e1", ComponentState::Surviving)
            .with("e2", ComponentState::Surviving);
        states.fail_all(["e1", "e3"]);
        assert_eq!(states.get("e1"), Some(ComponentState::Failed));
        assert_eq!(states.get("e2"), Some(ComponentState::Surviving));
        assert_eq!(states.get("e3"), Some(ComponentState::Failed));
    }
}
