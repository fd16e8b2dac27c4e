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

//! Travel time from an origin to the nearest of a set of destinations.
//!
//! The evaluation runs two shortest-path searches over the edges carrying a usable
//! length attribute:
//!
//! 1. the *baseline* search ignores every component state and fixes the reference time
//!    to the nearest reachable destination;
//! 2. the *filtered* search runs on the subgraph of surviving components.
//!
//! The filtered time is then compared against the thresholds `baseline + budget_i`. The
//! resulting status is the index of the first budget that is not exceeded, so a single
//! budget yields the familiar survive / fail verdict while several budgets grade the
//! degradation.

use crate::{
    error::EvalError,
    evaluator::{Evaluation, PerformanceEvaluator},
    filter::{FilteredGraph, StateFilter, UnknownComponentPolicy},
    outcome::Classification,
    search::{ShortestPaths, shortest_paths},
};
use lifeline_model::{
    index::{EdgeIndex, NodeIndex},
    network::Network,
    state::ComponentStates,
};
use serde::{Deserialize, Serialize};

/// Default average speed, in length units per time unit.
pub const DEFAULT_AVG_SPEED: f64 = 60.0;
/// Default extra-time budget over the baseline.
pub const DEFAULT_BUDGET: f64 = 0.5;
/// Default edge attribute holding the length.
pub const DEFAULT_LENGTH_ATTR: &str = "length_km";

/// Why an evaluation produced no usable travel time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The destination set is empty.
    NoDestinations,
    /// The origin is unknown or has no weighted edge in the failure-free network.
    OriginMissingInBaseline,
    /// No destination is reachable even without failures.
    NoDestinationReachableInBaseline,
    /// The origin itself has failed.
    OriginOff,
    /// Every known destination has failed.
    AllDestinationsOff,
    /// No destination is reachable over the surviving components.
    NoDestinationReachable,
}

impl FailureReason {
    /// A stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            FailureReason::NoDestinations => "no_destinations",
            FailureReason::OriginMissingInBaseline => "origin_missing_in_baseline",
            FailureReason::NoDestinationReachableInBaseline => {
                "no_destination_reachable_in_baseline"
            }
            FailureReason::OriginOff => "origin_off",
            FailureReason::AllDestinationsOff => "all_destinations_off",
            FailureReason::NoDestinationReachable => "no_destination_reachable",
        }
    }

    /// Returns `true` if the reason was established before looking at component
    /// states.
    pub fn is_baseline(self) -> bool {
        matches!(
            self,
            FailureReason::NoDestinations
                | FailureReason::OriginMissingInBaseline
                | FailureReason::NoDestinationReachableInBaseline
        )
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// The graded status of a travel-time evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelTimeStatus {
    /// Index of the first budget the filtered time stays within. Equals the number of
    /// budgets when every budget is exceeded.
    Tier(usize),
    /// No travel time could be computed.
    Fail,
}

impl TravelTimeStatus {
    /// Collapses the status to survive / fail: only `Tier(0)` survives.
    #[inline]
    pub fn classification(self) -> Classification {
        Classification::from_condition(self == TravelTimeStatus::Tier(0))
    }

    #[inline]
    pub fn tier(self) -> Option<usize> {
        match self {
            TravelTimeStatus::Tier(i) => Some(i),
            TravelTimeStatus::Fail => None,
        }
    }
}

impl std::fmt::Display for TravelTimeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TravelTimeStatus::Tier(i) => write!(f, "Tier({i})"),
            TravelTimeStatus::Fail => write!(f, "Fail"),
        }
    }
}

/// The shortest route to the chosen destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathReport {
    pub destination: String,
    pub distance: f64,
    pub time: f64,
    /// Node ids from the origin to the destination.
    pub nodes: Vec<String>,
    /// Node ids interleaved with the labels of the edges between them.
    pub route: Vec<String>,
}

/// Everything needed to reconstruct a travel-time decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelTimeDetail {
    pub reason: Option<FailureReason>,
    pub baseline: Option<PathReport>,
    pub filtered: Option<PathReport>,
    /// `baseline time + budget` for every budget. Empty without a baseline.
    pub thresholds: Vec<f64>,
    pub avg_speed: f64,
}

/// The result of a travel-time evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelTimeOutcome {
    /// Filtered travel time to the nearest reachable destination.
    pub time: Option<f64>,
    pub status: TravelTimeStatus,
    pub detail: TravelTimeDetail,
}

impl TravelTimeOutcome {
    #[inline]
    pub fn reason(&self) -> Option<FailureReason> {
        self.detail.reason
    }
}

impl Evaluation for TravelTimeOutcome {
    #[inline]
    fn classification(&self) -> Classification {
        self.status.classification()
    }
}

/// Classifies a state vector by the travel time from `origin` to the nearest of
/// `destinations`.
///
/// Lengths are read from the `length_attr` edge attribute; edges without a numeric
/// value take no part in either search. Times are `length / avg_speed`.
///
/// # Examples
///
/// ```rust
/// # use lifeline_eval::travel::{TravelTimeEvaluator, TravelTimeStatus};
/// # use lifeline_eval::evaluator::PerformanceEvaluator;
/// # use lifeline_model::network::{Attributes, NetworkBuilder};
/// # use lifeline_model::state::{ComponentState, ComponentStates};
/// # use serde_json::json;
///
/// let length = |km: f64| {
///     let mut attrs = Attributes::new();
///     attrs.insert("length_km".into(), json!(km));
///     attrs
/// };
///
/// let mut builder = NetworkBuilder::undirected();
/// for id in ["a", "b", "c"] {
///     builder.add_node(id, Attributes::new()).unwrap();
/// }
/// builder.add_edge("ab", "a", "b", length(30.0)).unwrap();
/// builder.add_edge("bc", "b", "c", length(30.0)).unwrap();
/// builder.add_edge("ac", "a", "c", length(90.0)).unwrap();
/// let network = builder.build();
///
/// let evaluator = TravelTimeEvaluator::new("a", ["c"]).budgets(vec![0.5, 1.0]);
/// let states = ComponentStates::all_surviving(&network).with("bc", ComponentState::Failed);
/// let outcome = evaluator.evaluate(&network, &states).unwrap();
///
/// // One hour without failures, one and a half over the detour.
/// assert_eq!(outcome.time, Some(1.5));
/// assert_eq!(outcome.status, TravelTimeStatus::Tier(0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelTimeEvaluator {
    origin: String,
    destinations: Vec<String>,
    avg_speed: f64,
    budgets: Vec<f64>,
    length_attr: String,
    #[serde(default)]
    filter: StateFilter,
}

impl TravelTimeEvaluator {
    /// Creates an evaluator with the default speed, budget and length attribute.
    /// Repeated destinations are dropped, keeping the first occurrence.
    pub fn new<I, S>(origin: impl Into<String>, destinations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for destination in destinations {
            let destination = destination.into();
            if !unique.contains(&destination) {
                unique.push(destination);
            }
        }

        Self {
            origin: origin.into(),
            destinations: unique,
            avg_speed: DEFAULT_AVG_SPEED,
            budgets: vec![DEFAULT_BUDGET],
            length_attr: DEFAULT_LENGTH_ATTR.to_owned(),
            filter: StateFilter::new(),
        }
    }

    #[inline]
    pub fn avg_speed(mut self, avg_speed: f64) -> Self {
        self.avg_speed = avg_speed;
        self
    }

    /// Uses a single extra-time budget.
    #[inline]
    pub fn budget(mut self, budget: f64) -> Self {
        self.budgets = vec![budget];
        self
    }

    /// Uses an ordered list of extra-time budgets, tightest first.
    #[inline]
    pub fn budgets(mut self, budgets: Vec<f64>) -> Self {
        self.budgets = budgets;
        self
    }

    #[inline]
    pub fn length_attr(mut self, length_attr: impl Into<String>) -> Self {
        self.length_attr = length_attr.into();
        self
    }

    #[inline]
    pub fn unknown_components(mut self, policy: UnknownComponentPolicy) -> Self {
        self.filter = self.filter.unknown_components(policy);
        self
    }

    #[inline]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    #[inline]
    pub fn destinations(&self) -> &[String] {
        &self.destinations
    }

    /// Checks the speed and the budgets.
    ///
    /// # Errors
    ///
    /// Returns `EvalError::InvalidParameter` if the speed is not a positive finite
    /// number, or if the budget list is empty or holds a negative or non-finite value.
    pub fn validate(&self) -> Result<(), EvalError> {
        if !(self.avg_speed.is_finite() && self.avg_speed > 0.0) {
            return Err(EvalError::InvalidParameter {
                name: "avg_speed",
                reason: format!("expected a positive finite speed, got {}", self.avg_speed),
            });
        }
        if self.budgets.is_empty() {
            return Err(EvalError::InvalidParameter {
                name: "budgets",
                reason: "at least one budget is required".to_owned(),
            });
        }
        if let Some(bad) = self
            .budgets
            .iter()
            .find(|b| !(b.is_finite() && **b >= 0.0))
        {
            return Err(EvalError::InvalidParameter {
                name: "budgets",
                reason: format!("expected non-negative finite budgets, got {bad}"),
            });
        }
        Ok(())
    }

    /// Reads the length of every edge. `None` marks an edge without a usable length.
    fn edge_lengths(&self, network: &Network) -> Result<Vec<Option<f64>>, EvalError> {
        network
            .edges()
            .iter()
            .enumerate()
            .map(|(i, edge)| match edge.weight(&self.length_attr) {
                Some(w) if !(w.is_finite() && w >= 0.0) => Err(EvalError::InvalidWeight {
                    edge: network.edge_label(EdgeIndex::new(i)),
                    attribute: self.length_attr.clone(),
                    value: w,
                }),
                w => Ok(w),
            })
            .collect()
    }

    /// The nearest reachable destination; ties go to the earlier destination.
    fn nearest(tree: &ShortestPaths, destinations: &[NodeIndex]) -> Option<(NodeIndex, f64)> {
        let mut best: Option<(NodeIndex, f64)> = None;
        for &destination in destinations {
            if let Some(d) = tree.distance(destination) {
                if best.is_none_or(|(_, b)| d < b) {
                    best = Some((destination, d));
                }
            }
        }
        best
    }

    fn report(
        &self,
        network: &Network,
        tree: &ShortestPaths,
        destination: NodeIndex,
        distance: f64,
    ) -> PathReport {
        let (nodes, route) = match tree.path(destination) {
            Some(path) => {
                let nodes: Vec<String> = path
                    .nodes
                    .iter()
                    .map(|&n| network.node(n).id().to_owned())
                    .collect();
                let mut route = Vec::with_capacity(nodes.len() + path.edges.len());
                for (i, node) in nodes.iter().enumerate() {
                    if i > 0 {
                        route.push(network.edge_label(path.edges[i - 1]));
                    }
                    route.push(node.clone());
                }
                (nodes, route)
            }
            None => (Vec::new(), Vec::new()),
        };

        PathReport {
            destination: network.node(destination).id().to_owned(),
            distance,
            time: distance / self.avg_speed,
            nodes,
            route,
        }
    }

    fn failure(
        &self,
        reason: FailureReason,
        baseline: Option<PathReport>,
        thresholds: Vec<f64>,
    ) -> TravelTimeOutcome {
        log::debug!(
            "travel time {} -> {:?}: {reason}",
            self.origin,
            self.destinations
        );
        TravelTimeOutcome {
            time: None,
            status: TravelTimeStatus::Fail,
            detail: TravelTimeDetail {
                reason: Some(reason),
                baseline,
                filtered: None,
                thresholds,
                avg_speed: self.avg_speed,
            },
        }
    }
}

impl PerformanceEvaluator for TravelTimeEvaluator {
    type Outcome = TravelTimeOutcome;

    fn name(&self) -> &str {
        "TravelTimeEvaluator"
    }

    fn evaluate(
        &self,
        network: &Network,
        states: &ComponentStates,
    ) -> Result<TravelTimeOutcome, EvalError> {
        self.validate()?;
        if self.destinations.is_empty() {
            return Ok(self.failure(FailureReason::NoDestinations, None, Vec::new()));
        }

        let lengths = self.edge_lengths(network)?;
        let length = |e: EdgeIndex| lengths[e.get()].unwrap_or(f64::INFINITY);
        let weighted = |e: EdgeIndex| lengths[e.get()].is_some();

        // Baseline.
        let baseline_graph = FilteredGraph::baseline(network, weighted);
        let origin = match network.node_index(&self.origin) {
            Some(origin) if baseline_graph.has_incident_edges(origin) => origin,
            _ => {
                return Ok(self.failure(
                    FailureReason::OriginMissingInBaseline,
                    None,
                    Vec::new(),
                ));
            }
        };
        let destinations: Vec<NodeIndex> = self
            .destinations
            .iter()
            .filter_map(|id| network.node_index(id))
            .collect();

        let baseline_tree = shortest_paths(&baseline_graph, origin, length);
        let Some((baseline_dest, baseline_distance)) = Self::nearest(&baseline_tree, &destinations)
        else {
            return Ok(self.failure(
                FailureReason::NoDestinationReachableInBaseline,
                None,
                Vec::new(),
            ));
        };
        let baseline = self.report(network, &baseline_tree, baseline_dest, baseline_distance);
        let thresholds: Vec<f64> = self.budgets.iter().map(|b| baseline.time + b).collect();

        // Filtered.
        let filtered_graph = self.filter.apply_where(network, states, weighted)?;
        if filtered_graph.is_node_off(origin) {
            return Ok(self.failure(FailureReason::OriginOff, Some(baseline), thresholds));
        }
        if destinations.iter().all(|&d| filtered_graph.is_node_off(d)) {
            return Ok(self.failure(
                FailureReason::AllDestinationsOff,
                Some(baseline),
                thresholds,
            ));
        }

        let filtered_tree = shortest_paths(&filtered_graph, origin, length);
        let Some((dest, distance)) = Self::nearest(&filtered_tree, &destinations) else {
            return Ok(self.failure(
                FailureReason::NoDestinationReachable,
                Some(baseline),
                thresholds,
            ));
        };
        let filtered = self.report(network, &filtered_tree, dest, distance);
        let time = filtered.time;

        let tier = thresholds
            .iter()
            .position(|&t| t >= time)
            .unwrap_or(thresholds.len());
        let status = TravelTimeStatus::Tier(tier);
        log::debug!(
            "travel time {} -> {}: {time} (baseline {} via {}) -> {status}",
            self.origin,
            filtered.destination,
            baseline.time,
            baseline.destination
        );

        Ok(TravelTimeOutcome {
            time: Some(time),
            status,
            detail: TravelTimeDetail {
                reason: None,
                baseline: Some(baseline),
                filtered: Some(filtered),
                thresholds,
                avg_speed: self.avg_speed,
            },
        })
    }
}
