//! Left join of centrality records with bridging records

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::data::{BridgingRecord, CentralityRecord};
use crate::error::{AnalysisError, Result};

/// A centrality record with its bridging strength attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegratedRecord {
    pub centrality: CentralityRecord,
    /// Zero for vertices that bridge no communities
    pub bridging_strength: f64,
}

/// Attach bridging strengths to every centrality record.
///
/// The output has exactly one row per centrality record, in input order.
/// Vertices without a bridging record get a strength of 0.
pub fn integrate_bridging(
    centrality: &[CentralityRecord],
    bridging: &[BridgingRecord],
) -> Result<Vec<IntegratedRecord>> {
    let mut seen = HashSet::with_capacity(centrality.len());
    for record in centrality {
        if !seen.insert(record.vertex.as_str()) {
            return Err(AnalysisError::DuplicateVertex {
                table: "centrality",
                vertex: record.vertex.clone(),
            });
        }
    }

    let mut strengths: HashMap<&str, f64> = HashMap::with_capacity(bridging.len());
    for record in bridging {
        if !seen.contains(record.vertex.as_str()) {
            log::debug!(
                "Ignoring bridging record for vertex {} which has no centrality record",
                record.vertex
            );
        }

        let strength = if record.bridging_strength.is_nan() {
            0.0
        } else if record.bridging_strength < 0.0 {
            log::warn!(
                "Negative bridging strength {} for vertex {}, clamping to 0",
                record.bridging_strength,
                record.vertex
            );
            0.0
        } else {
            record.bridging_strength
        };

        if strengths.insert(record.vertex.as_str(), strength).is_some() {
            return Err(AnalysisError::DuplicateVertex {
                table: "bridging_developers",
                vertex: record.vertex.clone(),
            });
        }
    }

    let merged = centrality
        .iter()
        .map(|record| IntegratedRecord {
            centrality: record.clone(),
            bridging_strength: strengths.get(record.vertex.as_str()).copied().unwrap_or(0.0),
        })
        .collect();

    Ok(merged)
}
