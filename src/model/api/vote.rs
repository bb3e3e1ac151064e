use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{common::Position, mongodb::Id};

/// A ballot that the voter wishes to cast: a specific candidate for a
/// specific position.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BallotSpec {
    pub candidate: Id,
    pub position: Position,
}

/// A recorded ballot as reported back to the voter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BallotRecord {
    pub position: Position,
    pub candidate_id: Id,
    pub cast_at: DateTime<Utc>,
}
