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

//! Capacity of the input / output / transmission balance.
//!
//! Under a state vector every node group contributes according to how many of its
//! members are still *operational*:
//!
//! | role         | member is operational if                     | all   | some  | none |
//! |--------------|----------------------------------------------|-------|-------|------|
//! | input        | reachable from a source and reaches an output | 1.2 c | c     | 0    |
//! | output       | reachable from a source                      | 1.2 c | c     | 0    |
//! | transmission | reachable from a source and reaches an output | c     | c     | 0    |
//!
//! where `c` is the group's nominal capacity. The contributions are summed per role into
//! `EI`, `EO` and `ET`, and the system capacity is `min(EI, EO, ET)`.
//!
//! Reachability is plain path existence on the filtered graph. One forward search from
//! all sources and one backward search from all outputs answer every membership query.

use crate::{
    error::EvalError,
    evaluator::{Evaluation, PerformanceEvaluator},
    filter::{StateFilter, UnknownComponentPolicy},
    outcome::Classification,
    search::reachable,
};
use fixedbitset::FixedBitSet;
use lifeline_model::{
    groups::{NodeGroup, NodeGroups},
    index::NodeIndex,
    network::{Network, NetworkError},
    state::ComponentStates,
};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

/// Multiplier applied to input and output groups whose members are all operational.
pub const FULL_REDUNDANCY_BONUS: f64 = 1.2;

/// How many members of a group are operational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityTier {
    Full,
    Partial,
    Lost,
}

impl CapacityTier {
    fn of(operational: usize, total: usize) -> Self {
        if operational == 0 {
            CapacityTier::Lost
        } else if operational == total {
            CapacityTier::Full
        } else {
            CapacityTier::Partial
        }
    }
}

/// The contribution of one node group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupCapacity {
    pub name: String,
    /// Capacity read from the group's representative node.
    pub nominal: f64,
    pub operational_members: usize,
    pub total_members: usize,
    pub tier: CapacityTier,
    pub contribution: f64,
}

/// The aggregated capacity together with the per-group breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityReport {
    /// `min(total_input, total_output, total_transmission)`.
    pub system_capacity: f64,
    pub total_input: f64,
    pub total_output: f64,
    pub total_transmission: f64,
    pub inputs: Vec<GroupCapacity>,
    pub outputs: Vec<GroupCapacity>,
    pub transmissions: Vec<GroupCapacity>,
    pub status: Classification,
}

impl Evaluation for CapacityReport {
    #[inline]
    fn classification(&self) -> Classification {
        self.status
    }
}

/// Reachability of every node from the sources and towards the outputs.
struct Reachability {
    from_sources: FixedBitSet,
    to_outputs: FixedBitSet,
}

impl Reachability {
    #[inline]
    fn fed(&self, node: NodeIndex) -> bool {
        self.from_sources.contains(node.get())
    }

    #[inline]
    fn fed_and_draining(&self, node: NodeIndex) -> bool {
        self.fed(node) && self.to_outputs.contains(node.get())
    }
}

/// Aggregates node-group capacities into a system capacity.
///
/// The evaluator borrows a `NodeGroups` partition that must have been derived from the
/// network passed to `evaluate`.
///
/// # Examples
///
/// ```rust
/// # use lifeline_eval::capacity::CapacityEvaluator;
/// # use lifeline_model::groups::NodeGroups;
/// # use lifeline_model::network::NetworkBuilder;
/// # use lifeline_model::state::{ComponentState, ComponentStates};
/// # use serde_json::json;
///
/// let attrs = |v: serde_json::Value| v.as_object().cloned().unwrap();
/// let mut builder = NetworkBuilder::directed();
/// builder.add_node("s", attrs(json!({"type": "source"}))).unwrap();
/// builder.add_node("i", attrs(json!({"type": "input", "group_name": "I", "capacity": 10}))).unwrap();
/// builder.add_node("t", attrs(json!({"type": "transmission", "group_name": "T", "capacity": 20}))).unwrap();
/// builder.add_node("o", attrs(json!({"type": "output", "group_name": "O", "capacity": 5}))).unwrap();
/// builder.add_edge("si", "s", "i", attrs(json!({}))).unwrap();
/// builder.add_edge("it", "i", "t", attrs(json!({}))).unwrap();
/// builder.add_edge("to", "t", "o", attrs(json!({}))).unwrap();
/// let network = builder.build();
/// let groups = NodeGroups::from_network(&network).unwrap();
///
/// let evaluator = CapacityEvaluator::new(&groups);
/// let states = ComponentStates::all_surviving(&network);
/// assert_eq!(evaluator.system_capacity(&network, &states).unwrap(), 6.0);
///
/// let cut = states.with("it", ComponentState::Failed);
/// assert_eq!(evaluator.system_capacity(&network, &cut).unwrap(), 0.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CapacityEvaluator<'g> {
    groups: &'g NodeGroups,
    filter: StateFilter,
    target: f64,
}

impl<'g> CapacityEvaluator<'g> {
    #[inline]
    pub fn new(groups: &'g NodeGroups) -> Self {
        Self {
            groups,
            filter: StateFilter::new(),
            target: 0.0,
        }
    }

    /// Sets the system capacity needed for a `Survived` classification.
    #[inline]
    pub fn with_target(mut self, target: f64) -> Self {
        self.target = target;
        self
    }

    #[inline]
    pub fn unknown_components(mut self, policy: UnknownComponentPolicy) -> Self {
        self.filter = self.filter.unknown_components(policy);
        self
    }

    #[inline]
    pub fn groups(&self) -> &'g NodeGroups {
        self.groups
    }

    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Computes only the scalar system capacity.
    pub fn system_capacity(
        &self,
        network: &Network,
        states: &ComponentStates,
    ) -> Result<f64, EvalError> {
        Ok(self.evaluate(network, states)?.system_capacity)
    }

    fn check_groups(&self, network: &Network) -> Result<(), EvalError> {
        let n = network.num_nodes();
        let groups = self.groups;
        let members = groups
            .sources()
            .iter()
            .chain(groups.output_list())
            .chain(
                groups
                    .inputs()
                    .iter()
                    .chain(groups.outputs())
                    .chain(groups.transmissions())
                    .flat_map(NodeGroup::members),
            );
        for member in members {
            if member.get() >= n {
                return Err(EvalError::InvalidParameter {
                    name: "groups",
                    reason: format!("{member} is out of range for a network of {n} nodes"),
                });
            }
        }
        Ok(())
    }

    fn nominal(network: &Network, group: &NodeGroup) -> Result<f64, EvalError> {
        let representative = group
            .representative()
            .ok_or_else(|| NetworkError::EmptyGroup(group.name().to_owned()))?;
        let node = network.node(representative);
        let capacity = node.capacity().ok_or_else(|| EvalError::MissingCapacity {
            group: group.name().to_owned(),
            node: node.id().to_owned(),
        })?;
        if !(capacity.is_finite() && capacity >= 0.0) {
            return Err(EvalError::InvalidCapacity {
                group: group.name().to_owned(),
                value: capacity,
            });
        }
        Ok(capacity)
    }

    fn assess<F>(
        network: &Network,
        groups: &[NodeGroup],
        operational: F,
        bonus: f64,
    ) -> Result<Vec<GroupCapacity>, EvalError>
    where
        F: Fn(NodeIndex) -> bool,
    {
        groups
            .iter()
            .map(|group| {
                let nominal = Self::nominal(network, group)?;
                let total_members = group.members().len();
                let operational_members =
                    group.members().iter().filter(|&&m| operational(m)).count();
                let tier = CapacityTier::of(operational_members, total_members);
                let contribution = match tier {
                    CapacityTier::Full => nominal * bonus,
                    CapacityTier::Partial => nominal,
                    CapacityTier::Lost => 0.0,
                };
                Ok(GroupCapacity {
                    name: group.name().to_owned(),
                    nominal,
                    operational_members,
                    total_members,
                    tier,
                    contribution,
                })
            })
            .collect()
    }
}

fn total(groups: &[GroupCapacity]) -> f64 {
    groups.iter().map(|g| g.contribution).sum()
}

impl PerformanceEvaluator for CapacityEvaluator<'_> {
    type Outcome = CapacityReport;

    fn name(&self) -> &str {
        "CapacityEvaluator"
    }

    fn evaluate(
        &self,
        network: &Network,
        states: &ComponentStates,
    ) -> Result<CapacityReport, EvalError> {
        self.check_groups(network)?;
        let filtered = self.filter.apply(network, states)?;
        let reach = Reachability {
            from_sources: reachable(&filtered, self.groups.sources(), Direction::Outgoing),
            to_outputs: reachable(&filtered, self.groups.output_list(), Direction::Incoming),
        };

        let inputs = Self::assess(
            network,
            self.groups.inputs(),
            |m| reach.fed_and_draining(m),
            FULL_REDUNDANCY_BONUS,
        )?;
        let outputs = Self::assess(
            network,
            self.groups.outputs(),
            |m| reach.fed(m),
            FULL_REDUNDANCY_BONUS,
        )?;
        let transmissions = Self::assess(
            network,
            self.groups.transmissions(),
            |m| reach.fed_and_draining(m),
            1.0,
        )?;

        let total_input = total(&inputs);
        let total_output = total(&outputs);
        let total_transmission = total(&transmissions);
        let system_capacity = total_input.min(total_output).min(total_transmission);
        let status = Classification::from_condition(system_capacity >= self.target);
        log::debug!(
            "capacity: EI={total_input} EO={total_output} ET={total_transmission} \
             -> {system_capacity} ({status})"
        );

        Ok(CapacityReport {
            system_capacity,
            total_input,
            total_output,
            total_transmission,
            inputs,
            outputs,
            transmissions,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use lifeline_model::groups::NodeGroupsDocument;
    use lifeline_model::state::ComponentState;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn totals(report: &CapacityReport) -> [f64; 4] {
        [
            report.total_input,
            report.total_output,
            report.total_transmission,
            report.system_capacity,
        ]
    }

    fn assert_totals(report: &CapacityReport, expected: [f64; 4]) {
        for (actual, expected) in totals(report).into_iter().zip(expected) {
            assert_close(actual, expected);
        }
    }

    #[test]
    fn test_all_on_earns_redundancy_bonus() {
        let network = fixtures::substation();
        let groups = NodeGroups::from_network(&network).unwrap();
        let report = CapacityEvaluator::new(&groups)
            .evaluate(&network, &ComponentStates::all_surviving(&network))
            .unwrap();

        assert_totals(&report, [180.0, 120.0, 200.0, 120.0]);
        assert!(report.inputs.iter().all(|g| g.tier == CapacityTier::Full));
        // Transmission never earns the bonus.
        assert_eq!(report.transmissions[0].tier, CapacityTier::Full);
        assert_close(report.transmissions[0].contribution, 200.0);
        assert_eq!(report.status, Classification::Survived);
    }

    #[test]
    fn test_lost_redundancy_drops_bonus() {
        let network = fixtures::substation();
        let groups = NodeGroups::from_network(&network).unwrap();
        let states = ComponentStates::all_surviving(&network).with("eb", ComponentState::Failed);
        let report = CapacityEvaluator::new(&groups).evaluate(&network, &states).unwrap();

        assert_totals(&report, [160.0, 120.0, 200.0, 120.0]);
        let i1 = &report.inputs[0];
        assert_eq!(i1.name, "I1");
        assert_eq!((i1.operational_members, i1.total_members), (1, 2));
        assert_eq!(i1.tier, CapacityTier::Partial);
    }

    #[test]
    fn test_failed_transmission_node() {
        let network = fixtures::substation();
        let groups = NodeGroups::from_network(&network).unwrap();
        let states = ComponentStates::all_surviving(&network).with("t1", ComponentState::Failed);
        let report = CapacityEvaluator::new(&groups).evaluate(&network, &states).unwrap();

        assert_totals(&report, [160.0, 108.0, 200.0, 108.0]);
        assert_eq!(report.transmissions[0].tier, CapacityTier::Partial);
    }

    #[test]
    fn test_outputs_cut_off() {
        let network = fixtures::substation();
        let groups = NodeGroups::from_network(&network).unwrap();
        let mut states = ComponentStates::all_surviving(&network);
        states.fail_all(["ej", "ek"]);
        let evaluator = CapacityEvaluator::new(&groups).with_target(100.0);
        let report = evaluator.evaluate(&network, &states).unwrap();

        assert_totals(&report, [120.0, 72.0, 200.0, 72.0]);
        assert_eq!(report.outputs[1].tier, CapacityTier::Lost);
        assert_eq!(report.status, Classification::Failed);
        assert_close(evaluator.system_capacity(&network, &states).unwrap(), 72.0);
    }

    #[test]
    fn test_no_surviving_edges() {
        let network = fixtures::substation();
        let groups = NodeGroups::from_network(&network).unwrap();
        let report = CapacityEvaluator::new(&groups)
            .evaluate(&network, &ComponentStates::new())
            .unwrap();
        assert_totals(&report, [0.0, 0.0, 0.0, 0.0]);
        // Zero capacity still meets the default target.
        assert_eq!(report.status, Classification::Survived);
    }

    #[test]
    fn test_missing_capacity_is_an_error() {
        let network = fixtures::substation();
        let document: NodeGroupsDocument = serde_json::from_value(serde_json::json!({
            "source": ["s1"],
            "input": {"I1": ["i1"]},
            "output": {"O1": ["o1"]},
            "output_list": ["o1"],
            "transmission": {"S": ["s1"]}
        }))
        .unwrap();
        let groups = NodeGroups::from_document(&network, &document).unwrap();
        let err = CapacityEvaluator::new(&groups)
            .evaluate(&network, &ComponentStates::all_surviving(&network))
            .unwrap_err();
        assert_eq!(
            err,
            EvalError::MissingCapacity {
                group: "S".into(),
                node: "s1".into()
            }
        );
    }

    #[test]
    fn test_groups_from_document_match_attributes() {
        let network = fixtures::substation();
        let derived = NodeGroups::from_network(&network).unwrap();
        let resolved = NodeGroups::from_document(&network, &derived.to_document(&network)).unwrap();
        let states = ComponentStates::all_surviving(&network).with("ee", ComponentState::Failed);

        let a = CapacityEvaluator::new(&derived).evaluate(&network, &states).unwrap();
        let b = CapacityEvaluator::new(&resolved).evaluate(&network, &states).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_groups_of_another_network_are_rejected() {
        let substation = fixtures::substation();
        let groups = NodeGroups::from_network(&substation).unwrap();
        let toynet = fixtures::toynet();
        assert!(toynet.num_nodes() < substation.num_nodes());

        let err = CapacityEvaluator::new(&groups)
            .evaluate(&toynet, &ComponentStates::new())
            .unwrap_err();
        assert!(matches!(err, EvalError::InvalidParameter { name: "groups", .. }));
    }
}
