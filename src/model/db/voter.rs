use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::model::{
    common::{BallotLedger, District},
    mongodb::Id,
};

/// Core voter data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterCore {
    pub full_name: String,
    /// Unique contact address, supplied by the external identity provider
    /// at registration.
    pub email: String,
    pub district: District,
    pub contact_number: Option<String>,
    /// The voter's ballot ledger: everything they have voted on, per
    /// election and position.
    pub votes: BallotLedger,
}

impl VoterCore {
    /// Create a new voter with an empty ballot ledger.
    pub fn new(
        full_name: String,
        email: String,
        district: District,
        contact_number: Option<String>,
    ) -> Self {
        Self {
            full_name,
            email,
            district,
            contact_number,
            votes: BallotLedger::default(),
        }
    }
}

/// A voter without an ID.
pub type NewVoter = VoterCore;

/// A voter from the database, with their unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub voter: VoterCore,
}

impl Deref for Voter {
    type Target = VoterCore;

    fn deref(&self) -> &Self::Target {
        &self.voter
    }
}

impl DerefMut for Voter {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.voter
    }
}


#[cfg(test)]
mod tests {
    use mongodb::bson::{from_bson, to_bson};

    use crate::model::common::BallotEntry;

    use super::*;

    #[test]
    fn new_voter_has_empty_ledger() {
        let voter = VoterCore::example();
        assert_eq!(voter.votes, BallotLedger::default());
    }

    #[test]
    fn voter_round_trips_through_bson() {
        let mut voter = Voter::example();
        voter.votes.record(Id::new(), "Mayor".into(), BallotEntry::new(Id::new()));

        let bson = to_bson(&voter).unwrap();
        let back: Voter = from_bson(bson).unwrap();
        assert_eq!(voter, back);
    }
}
