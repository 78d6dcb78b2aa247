//! Structural cohesion of each community

use std::fmt;

use serde::Serialize;
use statrs::statistics::Statistics;

use crate::community::{CommunityIndex, InteractionTally};
use crate::data::CommunityId;

/// Ratio of internal to external interactions.
///
/// A community with no external ties has no finite ratio; that case is a
/// distinct variant so no arithmetic can be done on it by accident.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum CohesionRatio {
    Finite(f64),
    NoExternalTies,
}

impl CohesionRatio {
    fn from_counts(intra: usize, inter: usize) -> Self {
        if inter == 0 {
            CohesionRatio::NoExternalTies
        } else {
            CohesionRatio::Finite(intra as f64 / inter as f64)
        }
    }

    pub fn finite(self) -> Option<f64> {
        match self {
            CohesionRatio::Finite(ratio) => Some(ratio),
            CohesionRatio::NoExternalTies => None,
        }
    }

    pub fn is_unbounded(self) -> bool {
        matches!(self, CohesionRatio::NoExternalTies)
    }
}

impl fmt::Display for CohesionRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CohesionRatio::Finite(ratio) => write!(f, "{:.6}", ratio),
            CohesionRatio::NoExternalTies => f.write_str("inf"),
        }
    }
}

/// Internal versus external connectivity of one community
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityCohesion {
    pub community: CommunityId,
    pub size: usize,
    pub intra_edges: usize,
    pub inter_edges: usize,
    /// intra_edges / (size * (size - 1)); 0 for communities under two members.
    /// Parallel interactions and self-loops are counted, so this can exceed 1.
    pub intra_density: f64,
    pub intra_inter_ratio: CohesionRatio,
}

impl CommunityCohesion {
    /// Directed capacity without self-pairs
    pub fn max_possible_intra(&self) -> usize {
        self.size * self.size.saturating_sub(1)
    }
}

/// Network-wide view over the per-community rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohesionSummary {
    pub community_count: usize,
    /// None when there are no communities
    pub mean_intra_density: Option<f64>,
    /// Mean over finite ratios only; None when every community lacks external ties
    pub mean_finite_ratio: Option<f64>,
    pub communities_without_external_ties: usize,
}

/// Cohesion of every community in the index, largest first with ties
/// broken by ascending community id
pub fn analyze_cohesion(index: &CommunityIndex, tally: &InteractionTally) -> Vec<CommunityCohesion> {
    let mut rows: Vec<CommunityCohesion> = index
        .communities()
        .map(|(community, size)| {
            let counts = tally.get(community);
            let capacity = size * size.saturating_sub(1);
            let intra_density = if size < 2 {
                0.0
            } else {
                counts.intra as f64 / capacity as f64
            };

            CommunityCohesion {
                community,
                size,
                intra_edges: counts.intra,
                inter_edges: counts.inter,
                intra_density,
                intra_inter_ratio: CohesionRatio::from_counts(counts.intra, counts.inter),
            }
        })
        .collect();

    rows.sort_by(|a, b| b.size.cmp(&a.size).then(a.community.cmp(&b.community)));
    rows
}

pub fn summarize_cohesion(rows: &[CommunityCohesion]) -> CohesionSummary {
    let mean = |values: Vec<f64>| (!values.is_empty()).then(|| values.mean());

    CohesionSummary {
        community_count: rows.len(),
        mean_intra_density: mean(rows.iter().map(|r| r.intra_density).collect()),
        mean_finite_ratio: mean(rows.iter().filter_map(|r| r.intra_inter_ratio.finite()).collect()),
        communities_without_external_ties: rows
            .iter()
            .filter(|r| r.intra_inter_ratio.is_unbounded())
            .count(),
    }
}
