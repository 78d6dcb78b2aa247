//! Community cohesion and functional characterization

pub mod cohesion;
pub mod function;
pub mod index;

use serde::Serialize;

use crate::config::EndpointKey;
use crate::data::MetricsSnapshot;
use crate::error::Result;

pub use cohesion::{analyze_cohesion, summarize_cohesion, CohesionRatio, CohesionSummary, CommunityCohesion};
pub use function::{analyze_function, dominant_type_counts, CommunityFunction};
pub use index::{CommunityIndex, CommunityTally, InteractionTally};

/// Both per-community tables plus the network-wide cohesion summary
#[derive(Debug, Clone, Serialize)]
pub struct CommunityReport {
    pub cohesion: Vec<CommunityCohesion>,
    pub function: Vec<CommunityFunction>,
    pub summary: CohesionSummary,
    pub unassigned_endpoints: usize,
}

/// Index the communities once, tally the interaction log in one pass, and
/// derive the cohesion and functional tables from the shared tally
pub fn analyze_communities(snapshot: &MetricsSnapshot, key: EndpointKey) -> Result<CommunityReport> {
    let index = CommunityIndex::build(&snapshot.communities, key)?;
    let tally = InteractionTally::build(&index, &snapshot.interactions);

    let cohesion = analyze_cohesion(&index, &tally);
    let function = analyze_function(&index, &tally);
    let summary = summarize_cohesion(&cohesion);

    log::info!(
        "Analyzed {} communities, {} with internal interactions",
        index.community_count(),
        function.len()
    );
    if let Some(density) = summary.mean_intra_density {
        log::info!("Mean intra-community density: {:.6}", density);
    }
    match summary.mean_finite_ratio {
        Some(ratio) => log::info!("Mean intra/inter ratio: {:.2}", ratio),
        None => log::info!("No community has external ties"),
    }

    Ok(CommunityReport {
        cohesion,
        function,
        summary,
        unassigned_endpoints: tally.unassigned_endpoints,
    })
}
