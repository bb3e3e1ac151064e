use mongodb::bson::doc;
use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{
    api::{
        auth::{AuthToken, AUTH_TOKEN_COOKIE},
        AdminCredentials, VoterSpec,
    },
    db::{
        admin::Admin,
        voter::{NewVoter, Voter},
    },
    mongodb::{errors::is_duplicate_key_error, Coll, Id},
};

pub fn routes() -> Vec<Route> {
    routes![authenticate, register, logout]
}

/// Log in as an admin.
#[post("/auth/admin", data = "<credentials>", format = "json")]
async fn authenticate(
    cookies: &CookieJar<'_>,
    credentials: Json<AdminCredentials>,
    admins: Coll<Admin>,
    config: &State<Config>,
) -> Result<()> {
    let with_username = doc! {
        "username": &credentials.username,
    };

    let admin = admins
        .find_one(with_username, None)
        .await?
        .filter(|admin| admin.verify_password(&credentials.password))
        .ok_or_else(|| {
            Error::Status(
                Status::Unauthorized,
                "No admin found with the provided username and password combination.".to_string(),
            )
        })?;

    let token = AuthToken::new(&admin);
    cookies.add(token.into_cookie(config));

    Ok(())
}

/// Register as a voter and start a session.
///
/// Identity verification happens upstream of this endpoint; here we only
/// create the voter document (with an empty ballot ledger) and hand out a
/// session cookie.
#[post("/auth/voter/register", data = "<spec>", format = "json")]
async fn register(
    cookies: &CookieJar<'_>,
    spec: Json<VoterSpec>,
    new_voters: Coll<NewVoter>,
    voters: Coll<Voter>,
    config: &State<Config>,
) -> Result<Json<Voter>> {
    let voter: NewVoter = spec.0.into();

    let new_id: Id = match new_voters.insert_one(&voter, None).await {
        Ok(result) => result
            .inserted_id
            .as_object_id()
            .unwrap() // Valid because the ID comes directly from the DB.
            .into(),
        Err(err) if is_duplicate_key_error(&err) => {
            return Err(Error::Status(
                Status::Conflict,
                format!("A voter is already registered with email '{}'", voter.email),
            ));
        }
        Err(err) => return Err(err.into()),
    };

    let voter = voters.find_one(new_id.as_doc(), None).await?.unwrap();

    let token = AuthToken::new(&voter);
    cookies.add(token.into_cookie(config));

    Ok(Json(voter))
}

/// Log out, whoever you are.
#[post("/auth/logout")]
async fn logout(cookies: &CookieJar<'_>) {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
}
