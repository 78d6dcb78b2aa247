//! Functional role classification of network participants

pub mod bridging;
pub mod classifier;
pub mod statistics;
pub mod thresholds;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::MetricsSnapshot;
use crate::error::Result;

pub use bridging::{integrate_bridging, IntegratedRecord};
pub use classifier::{classify, classify_vertex, ClassificationWarning, RoleAssignment, RoleClassification};
pub use thresholds::{quantile, RoleThresholds};

/// The role a developer plays in the collaboration network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Core,
    Connector,
    Intermediate,
    Peripheral,
}

impl Role {
    /// Roles in presentation order
    pub const ALL: [Role; 4] = [Role::Core, Role::Connector, Role::Intermediate, Role::Peripheral];

    /// Sort rank used by the output tables (Core first)
    pub fn rank(self) -> u8 {
        match self {
            Role::Core => 0,
            Role::Connector => 1,
            Role::Intermediate => 2,
            Role::Peripheral => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Core => "Core",
            Role::Connector => "Connector",
            Role::Intermediate => "Intermediate",
            Role::Peripheral => "Peripheral",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merge bridging data into the centrality table and classify every vertex
pub fn classify_roles(snapshot: &MetricsSnapshot) -> Result<RoleClassification> {
    let merged = integrate_bridging(&snapshot.centrality, &snapshot.bridging)?;
    let classification = classify(&merged)?;

    let counts = classification.role_counts();
    log::info!(
        "Classified {} developers: {} core, {} connector, {} intermediate, {} peripheral",
        classification.assignments.len(),
        counts[Role::Core.rank() as usize],
        counts[Role::Connector.rank() as usize],
        counts[Role::Intermediate.rank() as usize],
        counts[Role::Peripheral.rank() as usize],
    );

    Ok(classification)
}
