//! Vertex-to-community index and the single pass over the interaction log

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::EndpointKey;
use crate::data::{CommunityAssignment, CommunityId, Interaction, InteractionType};
use crate::error::{AnalysisError, Result};

/// Maps each interaction endpoint to the community its vertex belongs to
#[derive(Debug, Clone)]
pub struct CommunityIndex {
    membership: HashMap<String, CommunityId>,
    sizes: BTreeMap<CommunityId, usize>,
}

impl CommunityIndex {
    /// Build the index from the assignment table, keyed the way the
    /// interaction log names its endpoints
    pub fn build(assignments: &[CommunityAssignment], key: EndpointKey) -> Result<Self> {
        let mut membership = HashMap::with_capacity(assignments.len());
        let mut sizes = BTreeMap::new();
        let mut vertices = HashSet::with_capacity(assignments.len());

        for assignment in assignments {
            if !vertices.insert(assignment.vertex.as_str()) {
                return Err(AnalysisError::DuplicateVertex {
                    table: "community_assignments",
                    vertex: assignment.vertex.clone(),
                });
            }

            let endpoint = match key {
                EndpointKey::Label => &assignment.label,
                EndpointKey::Vertex => &assignment.vertex,
            };
            if membership
                .insert(endpoint.clone(), assignment.community)
                .is_some()
            {
                return Err(AnalysisError::DuplicateVertex {
                    table: "community_assignments",
                    vertex: endpoint.clone(),
                });
            }

            *sizes.entry(assignment.community).or_insert(0) += 1;
        }

        log::debug!(
            "Indexed {} vertices into {} communities",
            membership.len(),
            sizes.len()
        );

        Ok(Self { membership, sizes })
    }

    pub fn community_of(&self, endpoint: &str) -> Option<CommunityId> {
        self.membership.get(endpoint).copied()
    }

    /// Number of members of a community, 0 for unknown ids
    pub fn size(&self, community: CommunityId) -> usize {
        self.sizes.get(&community).copied().unwrap_or(0)
    }

    /// Every community with its size, in ascending id order
    pub fn communities(&self) -> impl Iterator<Item = (CommunityId, usize)> + '_ {
        self.sizes.iter().map(|(&id, &size)| (id, size))
    }

    pub fn community_count(&self) -> usize {
        self.sizes.len()
    }
}

/// Interaction counts for one community
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommunityTally {
    /// Both endpoints inside the community
    pub intra: usize,
    /// Exactly one endpoint inside the community
    pub inter: usize,
    /// Intra interactions per canonical type, indexed by [`InteractionType::index`]
    pub intra_by_type: [usize; 6],
}

impl CommunityTally {
    pub fn intra_of(&self, kind: InteractionType) -> usize {
        self.intra_by_type[kind.index()]
    }
}

/// Result of resolving every interaction against a [`CommunityIndex`]
#[derive(Debug, Clone, Default)]
pub struct InteractionTally {
    per_community: BTreeMap<CommunityId, CommunityTally>,
    /// Endpoints that match no community member
    pub unassigned_endpoints: usize,
}

impl InteractionTally {
    /// Resolve both endpoints of every interaction once and accumulate the
    /// counts of the communities involved. Endpoints missing from the index
    /// count toward no community.
    pub fn build(index: &CommunityIndex, interactions: &[Interaction]) -> Self {
        let mut tally = Self::default();

        for interaction in interactions {
            let source = index.community_of(&interaction.source);
            let target = index.community_of(&interaction.target);
            tally.unassigned_endpoints += usize::from(source.is_none()) + usize::from(target.is_none());

            match (source, target) {
                (Some(s), Some(t)) if s == t => {
                    let entry = tally.per_community.entry(s).or_default();
                    entry.intra += 1;
                    if let Some(kind) = interaction.kind {
                        entry.intra_by_type[kind.index()] += 1;
                    }
                }
                (source, target) => {
                    for community in source.into_iter().chain(target) {
                        tally.per_community.entry(community).or_default().inter += 1;
                    }
                }
            }
        }

        if tally.unassigned_endpoints > 0 {
            log::debug!(
                "{} interaction endpoints belong to no community and were excluded",
                tally.unassigned_endpoints
            );
        }

        tally
    }

    /// Counts for a community; all zero when it took part in no interaction
    pub fn get(&self, community: CommunityId) -> CommunityTally {
        self.per_community.get(&community).cloned().unwrap_or_default()
    }
}
