//! DB-compatible (e.g. de/serialisable) types.
//!
//! Each document type comes in two flavours: a `*Core` (aliased `New*`)
//! without an ID, used for inserts, and a wrapper carrying the Mongo `_id`.

pub mod admin;
pub mod candidate;
pub mod election;
pub mod voter;

pub use admin::{Admin, NewAdmin};
pub use candidate::{Candidate, NewCandidate};
pub use election::{Election, NewElection};
pub use voter::{NewVoter, Voter};
