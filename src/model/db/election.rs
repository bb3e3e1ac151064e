use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{common::Position, mongodb::Id};

/// Core election data, as stored in the database.
///
/// Elections are created and edited by administrators; the voting core only
/// ever reads them, to validate that a cast ballot names a position the
/// election actually contests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionCore {
    pub name: String,
    /// Only active elections accept votes.
    pub is_active: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// The contested positions, in ballot-paper order.
    pub positions: Vec<Position>,
}

impl ElectionCore {
    /// Does this election contest the given position?
    pub fn contains_position(&self, position: &str) -> bool {
        self.positions.iter().any(|p| p == position)
    }
}

/// An election without an ID.
pub type NewElection = ElectionCore;

/// An election from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub election: ElectionCore,
}

impl Deref for Election {
    type Target = ElectionCore;

    fn deref(&self) -> &Self::Target {
        &self.election
    }
}

impl DerefMut for Election {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.election
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use chrono::Duration;

    use super::*;

    impl ElectionCore {
        pub fn example() -> Self {
            Self {
                name: "Municipal Election 2025".to_string(),
                is_active: true,
                start_date: Utc::now() - Duration::days(1),
                end_date: Utc::now() + Duration::days(30),
                positions: vec![
                    "Mayor".to_string(),
                    "Vice-Mayor".to_string(),
                    "Councillor".to_string(),
                ],
            }
        }
    }

    impl Election {
        pub fn example() -> Self {
            Self {
                id: Id::new(),
                election: ElectionCore::example(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_position() {
        let election = ElectionCore::example();
        assert!(election.contains_position("Mayor"));
        assert!(election.contains_position("Vice-Mayor"));
        assert!(!election.contains_position("Governor"));
    }

    #[test]
    fn wrapper_exposes_core() {
        let election = Election::example();
        assert!(election.is_active);
        assert_eq!(election.positions.len(), 3);
    }
}
