use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::model::{
    common::{District, Position},
    mongodb::Id,
};

/// Core candidate data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCore {
    pub name: String,
    pub party: String,
    pub district: District,
    /// The position this candidate is running for.
    pub position: Position,
    pub running_mate: Option<String>,
    pub platform: Option<String>,
    pub photo_url: Option<String>,
    /// Where the candidate appears on the ballot paper.
    pub ballot_order: u32,
    /// Inactive candidates are hidden from voters and cannot receive votes.
    pub is_active: bool,
    /// Running tally of votes received. Kept consistent with the set of
    /// voter ballot ledgers referencing this candidate by only ever being
    /// mutated inside the vote-cast and vote-reset transactions.
    pub votes: u64,
}

impl CandidateCore {
    /// Count one more vote for this candidate.
    pub fn increment_votes(&mut self) {
        self.votes += 1;
    }

    /// Reverse one vote for this candidate.
    ///
    /// The tally is clamped at zero rather than failing: a reset racing an
    /// external tally edit must never drive the count negative.
    pub fn decrement_votes(&mut self) {
        self.votes = self.votes.saturating_sub(1);
    }
}

/// A candidate without an ID.
pub type NewCandidate = CandidateCore;

/// A candidate from the database, with their unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub candidate: CandidateCore,
}

impl Deref for Candidate {
    type Target = CandidateCore;

    fn deref(&self) -> &Self::Target {
        &self.candidate
    }
}

impl DerefMut for Candidate {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.candidate
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl CandidateCore {
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
                votes: 0,
            }
        }

        pub fn example_councillor() -> Self {
            Self {
                name: "Sam Okafor".to_string(),
                party: "Unity Alliance".to_string(),
                district: "North".to_string(),
                position: "Councillor".to_string(),
                running_mate: None,
                platform: None,
                photo_url: None,
                ballot_order: 2,
                is_active: true,
                votes: 0,
            }
        }
    }

    impl Candidate {
        pub fn example() -> Self {
            Self {
                id: Id::new(),
                candidate: CandidateCore::example(),
            }
        }

        pub fn example_councillor() -> Self {
            Self {
                id: Id::new(),
                candidate: CandidateCore::example_councillor(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_increments_and_decrements() {
        let mut candidate = CandidateCore::example();
        candidate.increment_votes();
        candidate.increment_votes();
        assert_eq!(candidate.votes, 2);
        candidate.decrement_votes();
        assert_eq!(candidate.votes, 1);
    }

    #[test]
    fn tally_never_goes_negative() {
        let mut candidate = CandidateCore::example();
        assert_eq!(candidate.votes, 0);
        candidate.decrement_votes();
        assert_eq!(candidate.votes, 0);
        candidate.increment_votes();
        candidate.decrement_votes();
        candidate.decrement_votes();
        assert_eq!(candidate.votes, 0);
    }
}
