//! One batch run over an immutable snapshot

use crate::activity::{rank_activity, DeveloperActivity};
use crate::community::{analyze_communities, CommunityReport};
use crate::config::Config;
use crate::data::MetricsSnapshot;
use crate::error::Result;
use crate::roles::statistics::{role_statistics, RoleStatistics};
use crate::roles::{classify_roles, RoleClassification};
use crate::temporal::{analyze_temporal, TemporalReport};

/// Every table derived from one snapshot
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub vertex_count: usize,
    pub interaction_count: usize,
    pub roles: RoleClassification,
    pub role_statistics: Vec<RoleStatistics>,
    pub communities: CommunityReport,
    pub activity: Vec<DeveloperActivity>,
    pub temporal: TemporalReport,
}

/// Derive all outputs. Any structural problem fails the whole run before
/// anything is returned.
pub fn analyze(snapshot: &MetricsSnapshot, config: &Config) -> Result<AnalysisOutput> {
    log::info!("Classifying developer roles");
    let roles = classify_roles(snapshot)?;
    let role_statistics = role_statistics(&roles);

    log::info!("Analyzing community cohesion and function");
    let communities = analyze_communities(snapshot, config.endpoint_key)?;

    log::info!("Ranking developer activity");
    let activity = rank_activity(&snapshot.interactions, config.activity_top_n);

    log::info!("Bucketing interactions by month");
    let temporal = analyze_temporal(&snapshot.interactions);

    Ok(AnalysisOutput {
        vertex_count: snapshot.centrality.len(),
        interaction_count: snapshot.interactions.len(),
        roles,
        role_statistics,
        communities,
        activity,
        temporal,
    })
}
