use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{common::Position, db::election::NewElection};

/// An election as submitted by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ElectionSpec {
    pub name: String,
    pub is_active: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub positions: Vec<Position>,
}

impl ElectionSpec {
    /// Is this spec internally consistent?
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && !self.positions.is_empty() && self.start_date <= self.end_date
    }
}

impl From<ElectionSpec> for NewElection {
    fn from(spec: ElectionSpec) -> Self {
        Self {
            name: spec.name,
            is_active: spec.is_active,
            start_date: spec.start_date,
            end_date: spec.end_date,
            positions: spec.positions,
        }
    }
}

#[cfg(test)]
mod examples {
    use chrono::Duration;

    use super::*;

    impl ElectionSpec {
        pub fn example() -> Self {
            Self {
                name: "Municipal Election 2025".to_string(),
                is_active: true,
                start_date: Utc::now() - Duration::days(1),
                end_date: Utc::now() + Duration::days(30),
                positions: vec!["Mayor".to_string(), "Councillor".to_string()],
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn validation() {
        assert!(ElectionSpec::example().is_valid());

        let mut no_positions = ElectionSpec::example();
        no_positions.positions.clear();
        assert!(!no_positions.is_valid());

        let mut backwards = ElectionSpec::example();
        backwards.end_date = backwards.start_date - Duration::days(1);
        assert!(!backwards.is_valid());
    }
}
