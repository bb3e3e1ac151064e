use mongodb::bson::doc;

use crate::error::{Error, Result};
use crate::model::{
    api::auth::AuthToken,
    db::{Election, Voter},
    mongodb::{Coll, Id},
};

/// Return the voter identified by the given token.
pub async fn voter_by_token(token: &AuthToken<Voter>, voters: &Coll<Voter>) -> Result<Voter> {
    voters
        .find_one(token.id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Voter {}", token.id)))
}

/// Return the given election only if it exists and is accepting votes.
pub async fn active_election_by_id(
    election_id: Id,
    elections: &Coll<Election>,
) -> Result<Election> {
    let filter = doc! {
        "_id": *election_id,
        "is_active": true,
    };
    elections
        .find_one(filter, None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Active election {election_id}")))
}
