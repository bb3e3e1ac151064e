//! API-facing types: request/response bodies and authentication tokens.

pub mod admin;
pub mod auth;
pub mod candidate;
pub mod election;
pub mod vote;
pub mod voter;

pub use admin::AdminCredentials;
pub use candidate::CandidateSpec;
pub use election::ElectionSpec;
pub use vote::{BallotRecord, BallotSpec};
pub use voter::{VoterProfile, VoterSpec};
