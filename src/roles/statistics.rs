//! Per-role summary statistics

use itertools::Itertools;
use serde::Serialize;
use statrs::statistics::{Data, Median, Statistics};

use crate::roles::{Role, RoleAssignment, RoleClassification};

/// Mean and median of one metric over a group of vertices
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub median: f64,
}

impl MetricSummary {
    /// NaN values are left out; an empty input summarizes to NaN
    fn of(values: impl Iterator<Item = f64>) -> Self {
        let values: Vec<f64> = values.filter(|v| !v.is_nan()).collect();
        if values.is_empty() {
            return Self {
                mean: f64::NAN,
                median: f64::NAN,
            };
        }

        let mean = values.iter().mean();
        let median = Data::new(values).median();
        Self { mean, median }
    }
}

/// Size and metric profile of one role
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleStatistics {
    pub role: Role,
    pub count: usize,
    /// Share of all classified vertices, in percent
    pub share_pct: f64,
    pub degree: MetricSummary,
    pub betweenness: MetricSummary,
    pub pagerank: MetricSummary,
    pub bridging_strength: MetricSummary,
}

/// Summarize each role that has at least one member, in role rank order
pub fn role_statistics(classification: &RoleClassification) -> Vec<RoleStatistics> {
    let total = classification.assignments.len();
    let groups = classification
        .assignments
        .iter()
        .into_group_map_by(|assignment| assignment.role);

    Role::ALL
        .iter()
        .filter_map(|role| {
            let members = groups.get(role)?;
            Some(summarize(*role, members, total))
        })
        .collect()
}

fn summarize(role: Role, members: &[&RoleAssignment], total: usize) -> RoleStatistics {
    let metric = |f: fn(&RoleAssignment) -> f64| MetricSummary::of(members.iter().map(|a| f(a)));

    RoleStatistics {
        role,
        count: members.len(),
        share_pct: members.len() as f64 / total as f64 * 100.0,
        degree: metric(|a| a.record.centrality.degree),
        betweenness: metric(|a| a.record.centrality.betweenness),
        pagerank: metric(|a| a.record.centrality.pagerank),
        bridging_strength: metric(|a| a.record.bridging_strength),
    }
}
