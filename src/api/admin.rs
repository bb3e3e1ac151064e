use mongodb::{bson::doc, Client};
use rocket::{futures::TryStreamExt, http::Status, serde::json::Json, Route, State};

use crate::error::{Error, Result};
use crate::model::{
    api::{auth::AuthToken, AdminCredentials, CandidateSpec, ElectionSpec, VoterProfile},
    db::{
        admin::{Admin, NewAdmin},
        candidate::{Candidate, NewCandidate},
        election::{Election, NewElection},
        voter::Voter,
    },
    mongodb::{errors::is_duplicate_key_error, Coll, Id},
};

pub fn routes() -> Vec<Route> {
    routes![
        get_admins,
        create_admin,
        delete_admin,
        create_election,
        modify_election,
        delete_election,
        create_candidate,
        modify_candidate,
        delete_candidate,
        get_voters,
        modify_voter,
        delete_voter,
        reset_votes,
    ]
}

#[get("/admins")]
async fn get_admins(_token: AuthToken<Admin>, admins: Coll<Admin>) -> Result<Json<Vec<String>>> {
    let admin_list: Vec<Admin> = admins.find(None, None).await?.try_collect().await?;
    let admin_names = admin_list
        .into_iter()
        .map(|admin| admin.admin.username)
        .collect();
    Ok(Json(admin_names))
}

#[post("/admins", data = "<new_admin>", format = "json")]
async fn create_admin(
    _token: AuthToken<Admin>,
    new_admin: Json<AdminCredentials>,
    admins: Coll<NewAdmin>,
) -> Result<()> {
    let admin: NewAdmin = new_admin
        .0
        .try_into()
        .map_err(|_| Error::Status(Status::BadRequest, "Illegal admin credentials".to_string()))?;

    // The unique index on usernames backs this up against races.
    match admins.insert_one(&admin, None).await {
        Ok(_) => Ok(()),
        Err(err) if is_duplicate_key_error(&err) => Err(Error::Status(
            Status::BadRequest,
            format!("Admin username already in use: {}", admin.username),
        )),
        Err(err) => Err(err.into()),
    }
}

#[delete("/admins", data = "<username>", format = "json")]
async fn delete_admin(
    _token: AuthToken<Admin>,
    username: Json<String>,
    admins: Coll<Admin>,
) -> Result<()> {
    // Prevent deleting the last admin.
    let count = admins.count_documents(None, None).await?;
    if count == 1 {
        return Err(Error::Status(
            Status::UnprocessableEntity,
            "Cannot delete the last admin!".to_string(),
        ));
    }

    let filter = doc! {
        "username": &*username,
    };
    let result = admins.delete_one(filter, None).await?;
    if result.deleted_count == 0 {
        Err(Error::not_found(format!("Admin {}", *username)))
    } else {
        Ok(())
    }
}

#[post("/elections", data = "<spec>", format = "json")]
async fn create_election(
    _token: AuthToken<Admin>,
    spec: Json<ElectionSpec>,
    new_elections: Coll<NewElection>,
    elections: Coll<Election>,
) -> Result<Json<Election>> {
    validate_election_spec(&spec)?;

    let election: NewElection = spec.0.into();
    let new_id: Id = new_elections
        .insert_one(&election, None)
        .await?
        .inserted_id
        .as_object_id()
        .unwrap() // Valid because the ID comes directly from the DB.
        .into();

    // Retrieve the full election information including ID.
    let election = elections.find_one(new_id.as_doc(), None).await?.unwrap();
    Ok(Json(election))
}

#[put("/elections/<election_id>", data = "<spec>", format = "json")]
async fn modify_election(
    _token: AuthToken<Admin>,
    election_id: Id,
    spec: Json<ElectionSpec>,
    new_elections: Coll<NewElection>,
    elections: Coll<Election>,
) -> Result<Json<Election>> {
    validate_election_spec(&spec)?;

    let new_election: NewElection = spec.0.into();
    let result = new_elections
        .replace_one(election_id.as_doc(), &new_election, None)
        .await?;
    if result.matched_count == 0 {
        return Err(Error::not_found(format!("Election {election_id}")));
    }

    let election = elections
        .find_one(election_id.as_doc(), None)
        .await?
        .unwrap(); // Presence just checked.
    Ok(Json(election))
}

#[delete("/elections/<election_id>")]
async fn delete_election(
    _token: AuthToken<Admin>,
    election_id: Id,
    elections: Coll<Election>,
    voters: Coll<Voter>,
    db_client: &State<Client>,
) -> Result<()> {
    // Atomically delete the election and every ledger entry that refers to
    // it, so no voter appears to have voted in an election that no longer
    // exists.
    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    let result = elections
        .delete_one_with_session(election_id.as_doc(), None, &mut session)
        .await?;
    if result.deleted_count == 0 {
        return Err(Error::not_found(format!("Election {election_id}")));
    }

    let ledger_field = format!("votes.{election_id}");
    let update = doc! {
        "$unset": {
            &ledger_field: "",
        }
    };
    voters
        .update_many_with_session(doc! {}, update, None, &mut session)
        .await?;

    session.commit_transaction().await?;
    info!("Deleted election {election_id}");
    Ok(())
}

#[post("/candidates", data = "<spec>", format = "json")]
async fn create_candidate(
    _token: AuthToken<Admin>,
    spec: Json<CandidateSpec>,
    new_candidates: Coll<NewCandidate>,
    candidates: Coll<Candidate>,
) -> Result<Json<Candidate>> {
    let candidate: NewCandidate = spec.0.into();
    let new_id: Id = new_candidates
        .insert_one(&candidate, None)
        .await?
        .inserted_id
        .as_object_id()
        .unwrap() // Valid because the ID comes directly from the DB.
        .into();

    let candidate = candidates.find_one(new_id.as_doc(), None).await?.unwrap();
    Ok(Json(candidate))
}

#[put("/candidates/<candidate_id>", data = "<spec>", format = "json")]
async fn modify_candidate(
    _token: AuthToken<Admin>,
    candidate_id: Id,
    spec: Json<CandidateSpec>,
    new_candidates: Coll<NewCandidate>,
    candidates: Coll<Candidate>,
) -> Result<Json<Candidate>> {
    let existing = candidates
        .find_one(candidate_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Candidate {candidate_id}")))?;

    // Profile edits must not touch the tally; only the vote-cast and
    // vote-reset transactions may do that.
    let mut updated: NewCandidate = spec.0.into();
    updated.votes = existing.votes;

    new_candidates
        .replace_one(candidate_id.as_doc(), &updated, None)
        .await?;

    let candidate = candidates
        .find_one(candidate_id.as_doc(), None)
        .await?
        .unwrap(); // Presence already checked.
    Ok(Json(candidate))
}

#[delete("/candidates/<candidate_id>")]
async fn delete_candidate(
    _token: AuthToken<Admin>,
    candidate_id: Id,
    candidates: Coll<Candidate>,
) -> Result<()> {
    // Ledger entries referencing this candidate are left in place; the
    // reset protocol tolerates them by skipping the missing candidate.
    let result = candidates.delete_one(candidate_id.as_doc(), None).await?;
    if result.deleted_count == 0 {
        return Err(Error::not_found(format!("Candidate {candidate_id}")));
    }
    Ok(())
}

#[get("/voters")]
async fn get_voters(_token: AuthToken<Admin>, voters: Coll<Voter>) -> Result<Json<Vec<Voter>>> {
    let all_voters = voters.find(None, None).await?.try_collect().await?;
    Ok(Json(all_voters))
}

#[put("/voters/<voter_id>", data = "<profile>", format = "json")]
async fn modify_voter(
    _token: AuthToken<Admin>,
    voter_id: Id,
    profile: Json<VoterProfile>,
    voters: Coll<Voter>,
) -> Result<Json<Voter>> {
    let mut voter = voters
        .find_one(voter_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Voter {voter_id}")))?;

    // Profile edits keep the email and ballot ledger intact.
    voter.full_name = profile.0.full_name;
    voter.district = profile.0.district;
    voter.contact_number = profile.0.contact_number;

    voters
        .replace_one(voter_id.as_doc(), &voter, None)
        .await?;
    Ok(Json(voter))
}

#[delete("/voters/<voter_id>")]
async fn delete_voter(
    _token: AuthToken<Admin>,
    voter_id: Id,
    voters: Coll<Voter>,
) -> Result<()> {
    // Deleting a voter does not reverse their cast ballots; reset first if
    // the tallies must be corrected.
    let result = voters.delete_one(voter_id.as_doc(), None).await?;
    if result.deleted_count == 0 {
        return Err(Error::not_found(format!("Voter {voter_id}")));
    }
    Ok(())
}

/// Reverse all of a voter's votes for one election: decrement every affected
/// candidate tally and clear the voter's ledger entries for that election,
/// atomically.
///
/// Resetting a voter with no recorded ballots for the election is a no-op
/// success, so re-running a reset is always safe.
#[post("/voters/<voter_id>/elections/<election_id>/reset")]
async fn reset_votes(
    _token: AuthToken<Admin>,
    voter_id: Id,
    election_id: Id,
    voters: Coll<Voter>,
    candidates: Coll<Candidate>,
    db_client: &State<Client>,
) -> Result<()> {
    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    let mut voter = voters
        .find_one_with_session(voter_id.as_doc(), None, &mut session)
        .await?
        .ok_or_else(|| Error::not_found(format!("Voter {voter_id}")))?;

    let cleared = voter.votes.clear_election(election_id);
    if cleared.is_empty() {
        info!("Voter {voter_id} had no ballots to reset for election {election_id}");
        return Ok(());
    }

    for (position, entry) in &cleared {
        let candidate = candidates
            .find_one_with_session(entry.candidate_id.as_doc(), None, &mut session)
            .await?;
        match candidate {
            Some(mut candidate) => {
                candidate.decrement_votes();
                candidates
                    .replace_one_with_session(
                        candidate.id.as_doc(),
                        &candidate,
                        None,
                        &mut session,
                    )
                    .await?;
            }
            None => {
                // The candidate may have been deleted since the vote was
                // cast; skip the decrement.
                warn!(
                    "Skipping tally decrement for missing candidate {} (position '{position}') \
                     while resetting voter {voter_id}",
                    entry.candidate_id
                );
            }
        }
    }

    voters
        .replace_one_with_session(voter_id.as_doc(), &voter, None, &mut session)
        .await?;

    session.commit_transaction().await?;

    info!(
        "Reset {} ballot(s) for voter {voter_id} in election {election_id}",
        cleared.len()
    );
    Ok(())
}

fn validate_election_spec(spec: &ElectionSpec) -> Result<()> {
    if !spec.is_valid() {
        return Err(Error::Status(
            Status::BadRequest,
            "Election must have a name, at least one position, and start before it ends"
                .to_string(),
        ));
    }
    Ok(())
}
