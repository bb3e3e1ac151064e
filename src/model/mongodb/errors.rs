//! For some reason, the mongodb crate doesn't provide error code or label
//! constants. This module fills in the gaps.

use mongodb::error::{Error as DbError, ErrorKind, WriteFailure};

pub const DUPLICATE_KEY: i32 = 11000;

pub const TRANSIENT_TRANSACTION_ERROR: &str = "TransientTransactionError";
pub const UNKNOWN_TRANSACTION_COMMIT_RESULT: &str = "UnknownTransactionCommitResult";

/// Return true if the given error is a duplicate key write error.
pub fn is_duplicate_key_error(err: &DbError) -> bool {
    if let ErrorKind::Write(WriteFailure::WriteError(ref e)) = *err.kind {
        return e.code == DUPLICATE_KEY;
    }
    false
}

/// Return true if the given error is a transient transaction failure, i.e.
/// the transaction aborted due to a conflicting concurrent write (or an
/// ambiguous commit) and may simply be retried.
pub fn is_transient_transaction_error(err: &DbError) -> bool {
    err.contains_label(TRANSIENT_TRANSACTION_ERROR)
        || err.contains_label(UNKNOWN_TRANSACTION_COMMIT_RESULT)
}
