mod ballot;

pub use ballot::{BallotEntry, BallotLedger};

use crate::model::mongodb::Id;

/// Our election IDs are document IDs.
pub type ElectionId = Id;
/// A contested office within an election (e.g. "Mayor").
pub type Position = String;
/// The electoral district a voter or candidate is registered in.
pub type District = String;
