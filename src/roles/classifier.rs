//! Ordered rule set assigning exactly one role per vertex

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::roles::{IntegratedRecord, Role, RoleThresholds};

/// Below this many vertices the quartiles collapse onto each other
pub const MIN_VERTICES_FOR_QUARTILES: usize = 4;

/// Non-fatal conditions found while classifying
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ClassificationWarning {
    /// Too few vertices for distinct quartiles; most vertices end up Intermediate
    DegenerateThresholds { vertex_count: usize },
    /// Vertices whose metric was missing or unparseable
    NonFiniteMetric { metric: &'static str, count: usize },
}

/// A vertex, its merged metrics and the role it was given
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub record: IntegratedRecord,
    pub role: Role,
}

/// Output of one classification run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleClassification {
    /// One entry per input record, in input order
    pub assignments: Vec<RoleAssignment>,
    pub thresholds: RoleThresholds,
    pub warnings: Vec<ClassificationWarning>,
}

impl RoleClassification {
    /// Number of vertices per role, indexed by [`Role::rank`]
    pub fn role_counts(&self) -> [usize; 4] {
        let mut counts = [0; 4];
        for assignment in &self.assignments {
            counts[assignment.role.rank() as usize] += 1;
        }
        counts
    }

    /// Assignments ordered by role rank, then descending PageRank, then vertex id
    pub fn sorted_assignments(&self) -> Vec<&RoleAssignment> {
        let mut sorted: Vec<&RoleAssignment> = self.assignments.iter().collect();
        sorted.sort_by(|a, b| {
            a.role
                .rank()
                .cmp(&b.role.rank())
                .then_with(|| {
                    b.record
                        .centrality
                        .pagerank
                        .total_cmp(&a.record.centrality.pagerank)
                })
                .then_with(|| compare_vertex_ids(&a.record.centrality.vertex, &b.record.centrality.vertex))
        });
        sorted
    }
}

/// Numeric ids compare numerically, anything else lexically after them
fn compare_vertex_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Apply the role rules to one vertex. First match wins and every
/// comparison is strict, so a value sitting exactly on a quartile does not
/// satisfy the rule that quartile guards.
pub fn classify_vertex(record: &IntegratedRecord, thresholds: &RoleThresholds) -> Role {
    let metrics = &record.centrality;

    if metrics.betweenness > thresholds.betweenness_q3 || record.bridging_strength > 0.0 {
        Role::Connector
    } else if metrics.degree > thresholds.degree_q3 && metrics.pagerank > thresholds.pagerank_q3 {
        Role::Core
    } else if metrics.degree < thresholds.degree_q1 && metrics.pagerank < thresholds.pagerank_q1 {
        Role::Peripheral
    } else {
        Role::Intermediate
    }
}

/// Compute thresholds over the full vertex set and classify every vertex
pub fn classify(records: &[IntegratedRecord]) -> Result<RoleClassification> {
    let thresholds = RoleThresholds::from_records(records)?;
    log::debug!("Role thresholds: {:?}", thresholds);

    let mut warnings = Vec::new();
    if records.len() < MIN_VERTICES_FOR_QUARTILES {
        log::warn!(
            "Only {} vertices, quartile thresholds are degenerate and most roles will be Intermediate",
            records.len()
        );
        warnings.push(ClassificationWarning::DegenerateThresholds {
            vertex_count: records.len(),
        });
    }

    for (metric, count) in [
        ("DegreeCentrality", records.iter().filter(|r| r.centrality.degree.is_nan()).count()),
        (
            "BetweennessCentrality",
            records.iter().filter(|r| r.centrality.betweenness.is_nan()).count(),
        ),
        ("PageRank", records.iter().filter(|r| r.centrality.pagerank.is_nan()).count()),
    ] {
        if count > 0 {
            log::warn!("{} vertices have no usable {}", count, metric);
            warnings.push(ClassificationWarning::NonFiniteMetric { metric, count });
        }
    }

    let assignments = records
        .iter()
        .map(|record| RoleAssignment {
            record: record.clone(),
            role: classify_vertex(record, &thresholds),
        })
        .collect();

    Ok(RoleClassification {
        assignments,
        thresholds,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CentralityRecord;
    use proptest::prelude::*;

    fn record(vertex: &str, degree: f64, betweenness: f64, pagerank: f64, bridging: f64) -> IntegratedRecord {
        IntegratedRecord {
            centrality: CentralityRecord {
                vertex: vertex.to_string(),
                label: vertex.to_string(),
                degree,
                betweenness,
                closeness: 0.5,
                pagerank,
            },
            bridging_strength: bridging,
        }
    }

    fn fixed() -> RoleThresholds {
        RoleThresholds {
            degree_q1: 0.2,
            degree_q3: 0.6,
            pagerank_q1: 0.1,
            pagerank_q3: 0.3,
            betweenness_q3: 0.5,
        }
    }

    #[test]
    fn rule_table_against_fixed_thresholds() {
        let t = fixed();
        assert_eq!(classify_vertex(&record("a", 0.4, 0.9, 0.2, 0.0), &t), Role::Connector);
        assert_eq!(classify_vertex(&record("b", 0.4, 0.1, 0.2, 0.3), &t), Role::Connector);
        assert_eq!(classify_vertex(&record("c", 0.9, 0.1, 0.5, 0.0), &t), Role::Core);
        assert_eq!(classify_vertex(&record("d", 0.1, 0.1, 0.05, 0.0), &t), Role::Peripheral);
        assert_eq!(classify_vertex(&record("e", 0.9, 0.1, 0.2, 0.0), &t), Role::Intermediate);
        assert_eq!(classify_vertex(&record("f", 0.1, 0.1, 0.2, 0.0), &t), Role::Intermediate);
    }

    #[test]
    fn connector_takes_priority_over_core() {
        let t = fixed();
        assert_eq!(classify_vertex(&record("a", 0.9, 0.9, 0.9, 0.0), &t), Role::Connector);
        assert_eq!(classify_vertex(&record("b", 0.01, 0.0, 0.01, 1.0), &t), Role::Connector);
    }

    #[test]
    fn boundary_values_fall_through() {
        let t = fixed();
        // Betweenness exactly at Q3 without bridging is not a connector
        assert_eq!(classify_vertex(&record("a", 0.4, 0.5, 0.2, 0.0), &t), Role::Intermediate);
        // Degree and PageRank exactly at Q3 are not core
        assert_eq!(classify_vertex(&record("b", 0.6, 0.1, 0.3, 0.0), &t), Role::Intermediate);
        // Degree exactly at Q1 is not peripheral
        assert_eq!(classify_vertex(&record("c", 0.2, 0.1, 0.05, 0.0), &t), Role::Intermediate);
    }

    #[test]
    fn betweenness_on_computed_q3_is_not_connector() {
        let records = vec![
            record("1", 0.1, 0.0, 0.1, 0.0),
            record("2", 0.2, 0.0, 0.2, 0.0),
            record("3", 0.3, 0.4, 0.3, 0.0),
            record("4", 0.4, 0.4, 0.4, 0.0),
            record("5", 0.5, 0.4, 0.5, 0.0),
        ];
        let classification = classify(&records).unwrap();

        assert_eq!(classification.thresholds.betweenness_q3, 0.4);
        assert!(classification
            .assignments
            .iter()
            .all(|a| a.role != Role::Connector));
    }

    #[test]
    fn small_universe_is_flagged_degenerate() {
        let records = vec![record("1", 0.5, 0.0, 0.5, 0.0), record("2", 0.5, 0.0, 0.5, 0.0)];
        let classification = classify(&records).unwrap();

        assert!(classification
            .warnings
            .contains(&ClassificationWarning::DegenerateThresholds { vertex_count: 2 }));
        assert!(classification
            .assignments
            .iter()
            .all(|a| a.role == Role::Intermediate));
    }

    #[test]
    fn single_vertex_is_intermediate() {
        let classification = classify(&[record("1", 1.0, 0.0, 1.0, 0.0)]).unwrap();
        assert_eq!(classification.assignments[0].role, Role::Intermediate);
    }

    #[test]
    fn nan_metrics_are_reported() {
        let records = vec![
            record("1", f64::NAN, 0.0, 0.1, 0.0),
            record("2", 0.2, 0.0, 0.2, 0.0),
            record("3", 0.3, 0.0, 0.3, 0.0),
            record("4", 0.4, 0.0, 0.4, 0.0),
        ];
        let classification = classify(&records).unwrap();
        assert!(classification.warnings.contains(&ClassificationWarning::NonFiniteMetric {
            metric: "DegreeCentrality",
            count: 1,
        }));
        assert_eq!(classification.assignments.len(), 4);
    }

    #[test]
    fn sorted_by_role_rank_then_pagerank() {
        let records = vec![
            record("1", 0.1, 0.0, 0.01, 0.0),
            record("2", 0.9, 0.0, 0.90, 0.0),
            record("3", 0.5, 0.0, 0.30, 1.0),
            record("4", 0.5, 0.0, 0.40, 0.0),
            record("5", 0.5, 0.0, 0.35, 0.0),
            record("6", 0.5, 0.0, 0.20, 0.0),
        ];
        let classification = classify(&records).unwrap();
        let order: Vec<(&str, Role)> = classification
            .sorted_assignments()
            .into_iter()
            .map(|a| (a.record.centrality.vertex.as_str(), a.role))
            .collect();

        assert_eq!(order[0], ("2", Role::Core));
        assert_eq!(order[1], ("3", Role::Connector));
        assert_eq!(order.last(), Some(&("1", Role::Peripheral)));

        let intermediate: Vec<&str> = order
            .iter()
            .filter(|(_, role)| *role == Role::Intermediate)
            .map(|(v, _)| *v)
            .collect();
        assert_eq!(intermediate, vec!["4", "5", "6"]);
    }

    #[test]
    fn vertex_ids_sort_numerically() {
        assert_eq!(compare_vertex_ids("2", "10"), Ordering::Less);
        assert_eq!(compare_vertex_ids("10", "abc"), Ordering::Less);
        assert_eq!(compare_vertex_ids("abc", "abd"), Ordering::Less);
    }

    fn arbitrary_records() -> impl Strategy<Value = Vec<IntegratedRecord>> {
        prop::collection::vec(
            (0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0, prop_oneof![Just(0.0f64), 0.0f64..2.0]),
            1..60,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (degree, betweenness, pagerank, bridging))| {
                    record(&i.to_string(), degree, betweenness, pagerank, bridging)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn every_vertex_gets_exactly_one_role(records in arbitrary_records()) {
            let classification = classify(&records).unwrap();
            prop_assert_eq!(classification.assignments.len(), records.len());
            prop_assert_eq!(classification.role_counts().iter().sum::<usize>(), records.len());
            for (assignment, record) in classification.assignments.iter().zip(&records) {
                prop_assert_eq!(&assignment.record, record);
            }
        }

        #[test]
        fn classification_is_idempotent(records in arbitrary_records()) {
            let first = classify(&records).unwrap();
            let second = classify(&records).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn bridging_always_means_connector(records in arbitrary_records()) {
            let classification = classify(&records).unwrap();
            for assignment in &classification.assignments {
                if assignment.record.bridging_strength > 0.0 {
                    prop_assert_eq!(assignment.role, Role::Connector);
                }
            }
        }
    }
}
