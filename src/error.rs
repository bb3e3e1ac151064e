use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use mongodb::error::Error as DbError;
use rocket::{http::Status, response::Responder};
use thiserror::Error;

use crate::model::common::{District, Position};
use crate::model::mongodb::errors::is_transient_transaction_error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error("Database error: {0}")]
    Db(DbError),
    #[error("{1}")]
    Status(Status, String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("A ballot for position '{position}' has already been cast in this election")]
    AlreadyVoted { position: Position },
    #[error("Candidate is not from the voter's district (voter district '{voter_district}', candidate district '{candidate_district}')")]
    DistrictMismatch {
        voter_district: District,
        candidate_district: District,
    },
    #[error("Candidate '{0}' is not active and cannot receive votes")]
    InactiveCandidate(String),
    #[error("Candidate position mismatch: requested '{requested}', found '{actual}'")]
    PositionMismatch {
        requested: Position,
        actual: Position,
    },
    #[error("The transaction conflicted with a concurrent write; try again")]
    TransactionConflict,
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

impl From<DbError> for Error {
    /// Transient transaction failures get their own variant so callers can
    /// distinguish "retry this" from a genuine database fault.
    fn from(err: DbError) -> Self {
        if is_transient_transaction_error(&err) {
            Self::TransactionConflict
        } else {
            Self::Db(err)
        }
    }
}

impl From<&Error> for Status {
    fn from(err: &Error) -> Self {
        match err {
            Error::Db(_) => Status::InternalServerError,
            Error::Jwt(jwt) => match jwt.kind() {
                JwtErrorKind::ExpiredSignature | JwtErrorKind::ImmatureSignature => {
                    Status::Unauthorized
                }
                _ => Status::BadRequest,
            },
            Error::Status(status, _) => *status,
            Error::NotFound(_) => Status::NotFound,
            Error::AlreadyVoted { .. } | Error::TransactionConflict => Status::Conflict,
            Error::DistrictMismatch { .. }
            | Error::InactiveCandidate(_)
            | Error::PositionMismatch { .. } => Status::UnprocessableEntity,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, _: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        match &self {
            Self::Db(err) => error!("Database error: {err}"),
            other => warn!("{other}"),
        }
        Err(Status::from(&self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        let already_voted = Error::AlreadyVoted {
            position: "Mayor".to_string(),
        };
        assert_eq!(Status::from(&already_voted), Status::Conflict);
        assert_eq!(Status::from(&Error::TransactionConflict), Status::Conflict);
        assert_eq!(
            Status::from(&Error::not_found("Candidate x")),
            Status::NotFound
        );
        let mismatch = Error::DistrictMismatch {
            voter_district: "North".to_string(),
            candidate_district: "South".to_string(),
        };
        assert_eq!(Status::from(&mismatch), Status::UnprocessableEntity);
    }
}
