use std::collections::{hash_map::Entry, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    common::{ElectionId, Position},
    mongodb::{serde_string_map, Id},
};

/// A single recorded ballot: who the vote went to, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotEntry {
    pub candidate_id: Id,
    pub cast_at: DateTime<Utc>,
}

impl BallotEntry {
    /// A ballot for the given candidate, cast now.
    pub fn new(candidate_id: Id) -> Self {
        Self {
            candidate_id,
            cast_at: Utc::now(),
        }
    }
}

/// Per-voter record of which positions in which elections have been voted
/// on, and for whom.
///
/// The existence of an entry for an (election, position) pair *is* the
/// "has voted" flag; there is no separate boolean to keep in sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BallotLedger {
    #[serde(with = "serde_string_map")]
    votes: HashMap<ElectionId, HashMap<Position, BallotEntry>>,
}

impl BallotLedger {
    /// Has this voter already voted for the given position in the given
    /// election?
    pub fn has_voted(&self, election_id: ElectionId, position: &str) -> bool {
        self.entry(election_id, position).is_some()
    }

    /// The recorded ballot for the given position in the given election,
    /// if there is one.
    pub fn entry(&self, election_id: ElectionId, position: &str) -> Option<&BallotEntry> {
        self.votes
            .get(&election_id)
            .and_then(|entries| entries.get(position))
    }

    /// All recorded ballots for the given election, keyed by position.
    pub fn for_election(
        &self,
        election_id: ElectionId,
    ) -> Option<&HashMap<Position, BallotEntry>> {
        self.votes.get(&election_id)
    }

    /// Record a ballot for the given position in the given election.
    ///
    /// Entries for other positions and elections are untouched. Returns
    /// `false` and leaves the ledger unchanged if a ballot for this
    /// position is already recorded.
    pub fn record(
        &mut self,
        election_id: ElectionId,
        position: Position,
        entry: BallotEntry,
    ) -> bool {
        match self.votes.entry(election_id).or_default().entry(position) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
        }
    }

    /// Remove and return all recorded ballots for the given election.
    ///
    /// All positions for the election are cleared together. Clearing an
    /// election with no recorded ballots returns an empty map.
    pub fn clear_election(&mut self, election_id: ElectionId) -> HashMap<Position, BallotEntry> {
        self.votes.remove(&election_id).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::{from_bson, to_bson};

    use super::*;

    const MAYOR: &str = "Mayor";
    const COUNCILLOR: &str = "Councillor";

    #[test]
    fn empty_ledger_has_no_votes() {
        let ledger = BallotLedger::default();
        assert!(!ledger.has_voted(Id::new(), MAYOR));
        assert!(ledger.entry(Id::new(), MAYOR).is_none());
        assert!(ledger.for_election(Id::new()).is_none());
    }

    #[test]
    fn record_then_query() {
        let election = Id::new();
        let candidate = Id::new();
        let mut ledger = BallotLedger::default();

        assert!(ledger.record(election, MAYOR.into(), BallotEntry::new(candidate)));
        assert!(ledger.has_voted(election, MAYOR));
        assert_eq!(ledger.entry(election, MAYOR).unwrap().candidate_id, candidate);
        // Other positions and elections are unaffected.
        assert!(!ledger.has_voted(election, COUNCILLOR));
        assert!(!ledger.has_voted(Id::new(), MAYOR));
    }

    #[test]
    fn double_record_is_rejected() {
        let election = Id::new();
        let first = Id::new();
        let second = Id::new();
        let mut ledger = BallotLedger::default();

        assert!(ledger.record(election, MAYOR.into(), BallotEntry::new(first)));
        assert!(!ledger.record(election, MAYOR.into(), BallotEntry::new(second)));
        // The original entry survives.
        assert_eq!(ledger.entry(election, MAYOR).unwrap().candidate_id, first);
    }

    #[test]
    fn record_merges_non_destructively() {
        let e1 = Id::new();
        let e2 = Id::new();
        let mut ledger = BallotLedger::default();

        assert!(ledger.record(e1, MAYOR.into(), BallotEntry::new(Id::new())));
        assert!(ledger.record(e1, COUNCILLOR.into(), BallotEntry::new(Id::new())));
        assert!(ledger.record(e2, MAYOR.into(), BallotEntry::new(Id::new())));

        assert_eq!(ledger.for_election(e1).unwrap().len(), 2);
        assert_eq!(ledger.for_election(e2).unwrap().len(), 1);
    }

    #[test]
    fn clear_election_is_idempotent() {
        let e1 = Id::new();
        let e2 = Id::new();
        let mut ledger = BallotLedger::default();
        ledger.record(e1, MAYOR.into(), BallotEntry::new(Id::new()));
        ledger.record(e1, COUNCILLOR.into(), BallotEntry::new(Id::new()));
        ledger.record(e2, MAYOR.into(), BallotEntry::new(Id::new()));

        let cleared = ledger.clear_election(e1);
        assert_eq!(cleared.len(), 2);
        assert!(!ledger.has_voted(e1, MAYOR));
        // The other election's ballots survive.
        assert!(ledger.has_voted(e2, MAYOR));

        // A second clear finds nothing to remove.
        assert!(ledger.clear_election(e1).is_empty());
        assert!(ledger.has_voted(e2, MAYOR));
    }

    #[test]
    fn ledger_round_trips_through_bson() {
        let election = Id::new();
        let mut ledger = BallotLedger::default();
        ledger.record(election, MAYOR.into(), BallotEntry::new(Id::new()));
        ledger.record(election, COUNCILLOR.into(), BallotEntry::new(Id::new()));

        let bson = to_bson(&ledger).unwrap();
        let back: BallotLedger = from_bson(bson).unwrap();
        assert_eq!(ledger, back);
    }
}
