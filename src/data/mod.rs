//! Input tables and their in-memory records

pub mod loader;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Community identifier as produced by the upstream detection step
pub type CommunityId = i64;

/// Per-vertex centrality metrics. The set of these records is the
/// universe every vertex-level output is computed over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityRecord {
    /// Vertex identifier, normalized to its string form
    pub vertex: String,
    /// Display label (the developer login)
    pub label: String,
    pub degree: f64,
    pub betweenness: f64,
    pub closeness: f64,
    pub pagerank: f64,
}

/// Membership of one vertex in one community
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityAssignment {
    pub vertex: String,
    pub label: String,
    pub community: CommunityId,
}

/// A vertex that ties several communities together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgingRecord {
    pub vertex: String,
    pub label: String,
    pub community: CommunityId,
    pub bridging_strength: f64,
    pub connected_communities: u32,
}

/// The six interaction kinds the analysis reports on, in tie-break order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InteractionType {
    #[serde(rename = "COMMENT_ISSUE")]
    CommentIssue,
    #[serde(rename = "COMMENT_PR")]
    CommentPr,
    #[serde(rename = "ISSUE_CLOSE")]
    IssueClose,
    #[serde(rename = "PR_REVIEW")]
    PrReview,
    #[serde(rename = "PR_APPROVAL")]
    PrApproval,
    #[serde(rename = "PR_MERGE")]
    PrMerge,
}

impl InteractionType {
    /// All canonical kinds in enumeration order
    pub const ALL: [InteractionType; 6] = [
        InteractionType::CommentIssue,
        InteractionType::CommentPr,
        InteractionType::IssueClose,
        InteractionType::PrReview,
        InteractionType::PrApproval,
        InteractionType::PrMerge,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InteractionType::CommentIssue => "COMMENT_ISSUE",
            InteractionType::CommentPr => "COMMENT_PR",
            InteractionType::IssueClose => "ISSUE_CLOSE",
            InteractionType::PrReview => "PR_REVIEW",
            InteractionType::PrApproval => "PR_APPROVAL",
            InteractionType::PrMerge => "PR_MERGE",
        }
    }

    /// Position in [`InteractionType::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InteractionType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| format!("unknown interaction type: {}", s))
    }
}

/// One directed interaction between two developers.
///
/// Parallel interactions are kept as separate records. Types outside the
/// canonical six are preserved in `raw_type` and have `kind == None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub source: String,
    pub target: String,
    pub raw_type: String,
    pub kind: Option<InteractionType>,
    pub weight: f64,
    pub timestamp: String,
}

impl Interaction {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        raw_type: impl Into<String>,
        weight: f64,
        timestamp: impl Into<String>,
    ) -> Self {
        let raw_type = raw_type.into();
        let kind = raw_type.parse().ok();
        Self {
            source: source.into(),
            target: target.into(),
            raw_type,
            kind,
            weight,
            timestamp: timestamp.into(),
        }
    }
}

/// One immutable snapshot of every input table
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    pub centrality: Vec<CentralityRecord>,
    pub communities: Vec<CommunityAssignment>,
    pub bridging: Vec<BridgingRecord>,
    pub interactions: Vec<Interaction>,
}
