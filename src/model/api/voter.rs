use serde::{Deserialize, Serialize};

use crate::model::{common::District, db::voter::NewVoter};

/// A voter profile as submitted at registration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VoterSpec {
    pub full_name: String,
    pub email: String,
    pub district: District,
    pub contact_number: Option<String>,
}

/// The editable part of a voter profile. The email address is fixed at
/// registration, and the ballot ledger is only ever touched by the voting
/// core.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VoterProfile {
    pub full_name: String,
    pub district: District,
    pub contact_number: Option<String>,
}

impl From<VoterSpec> for NewVoter {
    /// Convert a spec into a new voter with an empty ballot ledger.
    fn from(spec: VoterSpec) -> Self {
        Self::new(
            spec.full_name,
            spec.email,
            spec.district,
            spec.contact_number,
        )
    }
}

#[cfg(test)]
mod examples {
    use super::*;

    impl VoterSpec {
        pub fn example() -> Self {
            Self {
                full_name: "Jess Hernandez".to_string(),
                email: "jess.hernandez@example.com".to_string(),
                district: "North".to_string(),
                contact_number: Some("+1 555 0100".to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::common::BallotLedger;

    use super::*;

    #[test]
    fn registration_starts_with_an_empty_ledger() {
        let voter: NewVoter = VoterSpec::example().into();
        assert_eq!(voter.votes, BallotLedger::default());
        assert_eq!(voter.district, "North");
    }
}
