use serde::{Deserialize, Serialize};

use crate::model::{
    common::{District, Position},
    db::candidate::NewCandidate,
};

/// A candidate profile as submitted by an administrator.
///
/// Deliberately excludes the vote tally: profiles are created and edited
/// freely, while the tally is only ever touched by the vote-cast and
/// vote-reset transactions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CandidateSpec {
    pub name: String,
    pub party: String,
    pub district: District,
    pub position: Position,
    pub running_mate: Option<String>,
    pub platform: Option<String>,
    pub photo_url: Option<String>,
    pub ballot_order: u32,
    pub is_active: bool,
}

impl From<CandidateSpec> for NewCandidate {
    /// Convert a spec into a new candidate with a zeroed tally.
    fn from(spec: CandidateSpec) -> Self {
        Self {
            name: spec.name,
            party: spec.party,
            district: spec.district,
            position: spec.position,
            running_mate: spec.running_mate,
            platform: spec.platform,
            photo_url: spec.photo_url,
            ballot_order: spec.ballot_order,
            is_active: spec.is_active,
            votes: 0,
        }
    }
}

#[cfg(test)]
mod examples {
    use super::*;

    impl CandidateSpec {
        pub fn example() -> Self {
            Self {
                name: "Alex Tan".to_string(),
                party: "Progress Party".to_string(),
                district: "North".to_string(),
                position: "Mayor".to_string(),
                running_mate: Some("Riley Cruz".to_string()),
                platform: Some("Better transit for everyone.".to_string()),
                photo_url: None,
                ballot_order: 1,
                is_active: true,
            }
        }
    }
}
