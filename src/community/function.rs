//! Functional profile of each community: which interaction kinds dominate inside it

use std::collections::BTreeMap;

use serde::Serialize;

use crate::community::{CommunityIndex, InteractionTally};
use crate::data::{CommunityId, InteractionType};

/// Interaction-type composition of the interactions inside one community
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityFunction {
    pub community: CommunityId,
    pub size: usize,
    /// Every intra interaction, including types outside the canonical six
    pub total_intra: usize,
    /// Percent of `total_intra` per canonical type, indexed by [`InteractionType::index`]
    pub percentages: [f64; 6],
    pub dominant: InteractionType,
}

impl CommunityFunction {
    pub fn percentage(&self, kind: InteractionType) -> f64 {
        self.percentages[kind.index()]
    }
}

/// Profile every community that has at least one intra interaction.
///
/// The denominator counts all intra interactions, so the six percentages sum
/// to less than 100 when non-canonical types are present. Rows are ordered by
/// descending intra volume, ties by ascending community id.
pub fn analyze_function(index: &CommunityIndex, tally: &InteractionTally) -> Vec<CommunityFunction> {
    let mut rows: Vec<CommunityFunction> = index
        .communities()
        .filter_map(|(community, size)| {
            let counts = tally.get(community);
            if counts.intra == 0 {
                return None;
            }

            let total = counts.intra as f64;
            let mut percentages = [0.0; 6];
            for kind in InteractionType::ALL {
                percentages[kind.index()] = counts.intra_of(kind) as f64 / total * 100.0;
            }

            Some(CommunityFunction {
                community,
                size,
                total_intra: counts.intra,
                percentages,
                dominant: dominant_type(&percentages),
            })
        })
        .collect();

    rows.sort_by(|a, b| b.total_intra.cmp(&a.total_intra).then(a.community.cmp(&b.community)));
    rows
}

/// Highest percentage wins; on ties the earlier type in enumeration order
fn dominant_type(percentages: &[f64; 6]) -> InteractionType {
    let mut dominant = InteractionType::ALL[0];
    for kind in InteractionType::ALL.into_iter().skip(1) {
        if percentages[kind.index()] > percentages[dominant.index()] {
            dominant = kind;
        }
    }
    dominant
}

/// How many communities each type dominates
pub fn dominant_type_counts(rows: &[CommunityFunction]) -> BTreeMap<InteractionType, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry(row.dominant).or_insert(0) += 1;
    }
    counts
}
