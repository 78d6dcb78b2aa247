//! Per-developer activity volume from the interaction log

use std::collections::HashMap;

use itertools::Itertools;
use serde::Serialize;

use crate::data::{Interaction, InteractionType};

/// Interactions initiated by one developer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeveloperActivity {
    /// 1-based position in the ranking
    pub rank: usize,
    pub developer: String,
    /// All interactions with this developer as source, any type
    pub total: usize,
    /// Per canonical type, indexed by [`InteractionType::index`]
    pub by_type: [usize; 6],
}

impl DeveloperActivity {
    pub fn count(&self, kind: InteractionType) -> usize {
        self.by_type[kind.index()]
    }
}

/// Rank developers by how many interactions they initiated, keeping the top `limit`.
/// Ties are broken by developer name.
pub fn rank_activity(interactions: &[Interaction], limit: usize) -> Vec<DeveloperActivity> {
    let mut per_source: HashMap<&str, (usize, [usize; 6])> = HashMap::new();
    for interaction in interactions {
        let entry = per_source.entry(interaction.source.as_str()).or_default();
        entry.0 += 1;
        if let Some(kind) = interaction.kind {
            entry.1[kind.index()] += 1;
        }
    }

    per_source
        .into_iter()
        .sorted_by(|(a_name, (a_total, _)), (b_name, (b_total, _))| {
            b_total.cmp(a_total).then_with(|| a_name.cmp(b_name))
        })
        .take(limit)
        .enumerate()
        .map(|(i, (developer, (total, by_type)))| DeveloperActivity {
            rank: i + 1,
            developer: developer.to_string(),
            total,
            by_type,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interaction(source: &str, kind: &str) -> Interaction {
        Interaction::new(source, "someone", kind, 1.0, "")
    }

    #[test]
    fn ranks_by_total_then_name() {
        let log = vec![
            interaction("carol", "PR_MERGE"),
            interaction("alice", "COMMENT_PR"),
            interaction("bob", "PR_REVIEW"),
            interaction("alice", "PR_MERGE"),
            interaction("bob", "COMMIT_PUSH"),
            interaction("dave", "ISSUE_CLOSE"),
        ];
        let ranking = rank_activity(&log, 10);

        let names: Vec<&str> = ranking.iter().map(|a| a.developer.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol", "dave"]);
        assert_eq!(ranking[0].rank, 1);
        assert_eq!(ranking[1].total, 2);
        assert_eq!(ranking[1].count(InteractionType::PrReview), 1);
        assert_eq!(ranking[1].by_type.iter().sum::<usize>(), 1);
    }

    #[test]
    fn truncates_to_limit() {
        let log = vec![interaction("a", "PR_MERGE"), interaction("b", "PR_MERGE"), interaction("a", "PR_MERGE")];
        let ranking = rank_activity(&log, 1);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].developer, "a");
        assert_eq!(ranking[0].count(InteractionType::PrMerge), 2);
    }
}
