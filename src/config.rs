//! Configuration management for the role analyzer

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// File name of the centrality table inside the metrics directory
pub const CENTRALITY_FILE: &str = "centrality_metrics.csv";

/// File name of the community assignment table inside the metrics directory
pub const COMMUNITIES_FILE: &str = "community_assignments.csv";

/// File name of the bridging table inside the metrics directory
pub const BRIDGING_FILE: &str = "bridging_developers.csv";

/// Which vertex attribute the interaction log uses for its endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum EndpointKey {
    /// Endpoints are developer logins (the `Label` column)
    #[default]
    Label,
    /// Endpoints are vertex identifiers (the `Vertex` column)
    Vertex,
}

/// Run configuration for the role analyzer
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the centrality, community and bridging tables
    pub metrics_dir: PathBuf,

    /// Path of the raw interaction log
    pub interactions_path: PathBuf,

    /// Directory output tables are written to
    pub output_dir: PathBuf,

    /// How interaction endpoints are matched to community members
    pub endpoint_key: EndpointKey,

    /// Number of developers kept in the activity ranking
    pub activity_top_n: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metrics_dir: PathBuf::from("output"),
            interactions_path: PathBuf::from("data/interactions.csv"),
            output_dir: PathBuf::from("output/tables"),
            endpoint_key: EndpointKey::Label,
            activity_top_n: 30,
        }
    }
}

impl Config {
    /// Create a new configuration with custom values
    pub fn new(
        metrics_dir: impl Into<PathBuf>,
        interactions_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            metrics_dir: metrics_dir.into(),
            interactions_path: interactions_path.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn centrality_path(&self) -> PathBuf {
        self.metrics_dir.join(CENTRALITY_FILE)
    }

    pub fn communities_path(&self) -> PathBuf {
        self.metrics_dir.join(COMMUNITIES_FILE)
    }

    pub fn bridging_path(&self) -> PathBuf {
        self.metrics_dir.join(BRIDGING_FILE)
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}
