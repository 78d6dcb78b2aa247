//! Global quartile thresholds for role classification

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::roles::IntegratedRecord;

/// Quantile of `values` at `p` in [0, 1] by linear interpolation between the
/// two nearest ranks (position `(n - 1) * p`). NaN values are skipped;
/// returns `None` when nothing is left.
pub fn quantile(values: &[f64], p: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let position = (sorted.len() - 1) as f64 * p.clamp(0.0, 1.0);
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// The five cut points the role rules compare against.
///
/// Computed once per run over the whole vertex universe and handed to the
/// classifier explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoleThresholds {
    pub degree_q1: f64,
    pub degree_q3: f64,
    pub pagerank_q1: f64,
    pub pagerank_q3: f64,
    pub betweenness_q3: f64,
}

impl RoleThresholds {
    /// Compute thresholds over every record.
    ///
    /// A metric whose values are all NaN yields a NaN threshold, which no
    /// strict comparison can satisfy.
    pub fn from_records(records: &[IntegratedRecord]) -> Result<Self> {
        if records.is_empty() {
            return Err(AnalysisError::EmptyInput { table: "centrality" });
        }

        let degree: Vec<f64> = records.iter().map(|r| r.centrality.degree).collect();
        let pagerank: Vec<f64> = records.iter().map(|r| r.centrality.pagerank).collect();
        let betweenness: Vec<f64> = records.iter().map(|r| r.centrality.betweenness).collect();

        let q = |values: &[f64], p: f64| quantile(values, p).unwrap_or(f64::NAN);

        Ok(Self {
            degree_q1: q(&degree, 0.25),
            degree_q3: q(&degree, 0.75),
            pagerank_q1: q(&pagerank, 0.25),
            pagerank_q3: q(&pagerank, 0.75),
            betweenness_q3: q(&betweenness, 0.75),
        })
    }
}
