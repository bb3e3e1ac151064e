use rocket::{serde::json::Json, Route};

use crate::error::Result;
use crate::model::{
    api::{auth::AuthToken, VoterProfile},
    db::Voter,
    mongodb::Coll,
};

use super::common::voter_by_token;

pub fn routes() -> Vec<Route> {
    routes![get_profile, update_profile]
}

#[get("/voter/profile")]
async fn get_profile(token: AuthToken<Voter>, voters: Coll<Voter>) -> Result<Json<Voter>> {
    let voter = voter_by_token(&token, &voters).await?;
    Ok(Json(voter))
}

/// Update the voter's own profile. The email address and ballot ledger are
/// untouched.
#[put("/voter/profile", data = "<profile>", format = "json")]
async fn update_profile(
    token: AuthToken<Voter>,
    profile: Json<VoterProfile>,
    voters: Coll<Voter>,
) -> Result<Json<Voter>> {
    let mut voter = voter_by_token(&token, &voters).await?;

    voter.full_name = profile.0.full_name;
    voter.district = profile.0.district;
    voter.contact_number = profile.0.contact_number;

    voters
        .replace_one(voter.id.as_doc(), &voter, None)
        .await?;
    Ok(Json(voter))
}
