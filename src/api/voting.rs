use mongodb::Client;
use rocket::{serde::json::Json, Route, State};

use crate::error::{Error, Result};
use crate::model::{
    api::{auth::AuthToken, BallotRecord, BallotSpec},
    common::{BallotEntry, ElectionId},
    db::{Candidate, Election, Voter},
    mongodb::{Coll, Id},
};

use super::common::{active_election_by_id, voter_by_token};

pub fn routes() -> Vec<Route> {
    routes![cast_vote, has_voted, get_ballots]
}

/// Cast a ballot: record it in the voter's ledger and increment the
/// candidate's tally, atomically.
///
/// Every precondition on the voter and candidate is checked *inside* the
/// transaction, so two concurrent attempts by the same voter observe each
/// other: the loser either sees the winner's ledger entry and fails with
/// `AlreadyVoted`, or aborts with `TransactionConflict` for the client to
/// retry.
#[post("/voter/elections/<election_id>/votes", data = "<ballot>", format = "json")]
async fn cast_vote(
    token: AuthToken<Voter>,
    election_id: Id,
    ballot: Json<BallotSpec>,
    elections: Coll<Election>,
    voters: Coll<Voter>,
    candidates: Coll<Candidate>,
    db_client: &State<Client>,
) -> Result<()> {
    let ballot = ballot.0;

    // The election is a read-only input: it must exist, accept votes, and
    // contest the requested position.
    let election = active_election_by_id(election_id, &elections).await?;
    if !election.contains_position(&ballot.position) {
        return Err(Error::not_found(format!(
            "Position '{}' in election '{}'",
            ballot.position, election.name
        )));
    }

    let mut session = db_client.start_session(None).await?;
    session.start_transaction(None).await?;

    let mut candidate = candidates
        .find_one_with_session(ballot.candidate.as_doc(), None, &mut session)
        .await?
        .ok_or_else(|| Error::not_found(format!("Candidate {}", ballot.candidate)))?;
    let mut voter = voters
        .find_one_with_session(token.id.as_doc(), None, &mut session)
        .await?
        .ok_or_else(|| Error::not_found(format!("Voter {}", token.id)))?;

    validate_ballot(&voter, &candidate, election_id, &ballot.position)?;

    // Both mutations go through the same session; the transaction either
    // commits them together or not at all.
    candidate.increment_votes();
    candidates
        .replace_one_with_session(candidate.id.as_doc(), &candidate, None, &mut session)
        .await?;

    let recorded = voter.votes.record(
        election_id,
        ballot.position.clone(),
        BallotEntry::new(candidate.id),
    );
    debug_assert!(recorded, "ledger must be free after validation");
    voters
        .replace_one_with_session(voter.id.as_doc(), &voter, None, &mut session)
        .await?;

    session.commit_transaction().await?;

    info!(
        "Voter {} cast a ballot for position '{}' in election {}",
        voter.id, ballot.position, election_id
    );
    Ok(())
}

/// Has the voter already voted for the given position in the given election?
///
/// Advisory only: the UI uses this to grey out ballots, but the
/// authoritative check is the one inside the cast-vote transaction.
#[get("/voter/elections/<election_id>/votes/<position>")]
async fn has_voted(
    token: AuthToken<Voter>,
    election_id: Id,
    position: &str,
    voters: Coll<Voter>,
) -> Result<Json<bool>> {
    let voter = voter_by_token(&token, &voters).await?;
    Ok(Json(voter.votes.has_voted(election_id, position)))
}

/// All ballots the voter has cast in the given election.
#[get("/voter/elections/<election_id>/votes")]
async fn get_ballots(
    token: AuthToken<Voter>,
    election_id: Id,
    voters: Coll<Voter>,
) -> Result<Json<Vec<BallotRecord>>> {
    let voter = voter_by_token(&token, &voters).await?;
    let records = voter
        .votes
        .for_election(election_id)
        .map(|entries| {
            entries
                .iter()
                .map(|(position, entry)| BallotRecord {
                    position: position.clone(),
                    candidate_id: entry.candidate_id,
                    cast_at: entry.cast_at,
                })
                .collect()
        })
        .unwrap_or_default();
    Ok(Json(records))
}

/// Check all business-rule preconditions for a ballot, in order:
/// double-vote, district, candidate activity, position.
///
/// Called with transactionally-consistent snapshots of the voter and
/// candidate documents.
fn validate_ballot(
    voter: &Voter,
    candidate: &Candidate,
    election_id: ElectionId,
    position: &str,
) -> Result<()> {
    if voter.votes.has_voted(election_id, position) {
        return Err(Error::AlreadyVoted {
            position: position.to_string(),
        });
    }
    if candidate.district != voter.district {
        return Err(Error::DistrictMismatch {
            voter_district: voter.district.clone(),
            candidate_district: candidate.district.clone(),
        });
    }
    if !candidate.is_active {
        return Err(Error::InactiveCandidate(candidate.name.clone()));
    }
    if candidate.position != position {
        return Err(Error::PositionMismatch {
            requested: position.to_string(),
            actual: candidate.position.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ballot_is_accepted() {
        let voter = Voter::example();
        let candidate = Candidate::example();
        assert!(validate_ballot(&voter, &candidate, Id::new(), "Mayor").is_ok());
    }

    #[test]
    fn double_vote_is_rejected() {
        let election = Id::new();
        let mut voter = Voter::example();
        let candidate = Candidate::example();
        voter
            .votes
            .record(election, "Mayor".into(), BallotEntry::new(candidate.id));

        let result = validate_ballot(&voter, &candidate, election, "Mayor");
        assert!(matches!(result, Err(Error::AlreadyVoted { .. })));
        // Voting for a different position in the same election is fine,
        // as is the same position in a different election.
        let councillor = Candidate::example_councillor();
        assert!(validate_ballot(&voter, &councillor, election, "Councillor").is_ok());
        assert!(validate_ballot(&voter, &candidate, Id::new(), "Mayor").is_ok());
    }

    #[test]
    fn district_mismatch_is_rejected() {
        // Voter from the South district, candidate from the North.
        let voter = Voter::example_south();
        let candidate = Candidate::example();

        let result = validate_ballot(&voter, &candidate, Id::new(), "Mayor");
        assert!(matches!(result, Err(Error::DistrictMismatch { .. })));
    }

    #[test]
    fn inactive_candidate_is_rejected() {
        let voter = Voter::example();
        let mut candidate = Candidate::example();
        candidate.is_active = false;

        let result = validate_ballot(&voter, &candidate, Id::new(), "Mayor");
        assert!(matches!(result, Err(Error::InactiveCandidate(_))));
    }

    #[test]
    fn position_mismatch_is_rejected() {
        let voter = Voter::example();
        let candidate = Candidate::example();

        let result = validate_ballot(&voter, &candidate, Id::new(), "Councillor");
        assert!(matches!(
            result,
            Err(Error::PositionMismatch { requested, actual })
                if requested == "Councillor" && actual == "Mayor"
        ));
    }

    /// The tally stays equal to the number of ledger entries referencing the
    /// candidate across any sequence of casts and resets.
    #[test]
    fn tally_conserves_ledger_references() {
        let election = Id::new();
        let mut candidate = Candidate::example();
        let mut voters = vec![Voter::example(), Voter::example(), Voter::example()];

        // Three distinct voters cast ballots for the same candidate.
        for voter in voters.iter_mut() {
            validate_ballot(voter, &candidate, election, "Mayor").unwrap();
            assert!(voter.votes.record(
                election,
                "Mayor".into(),
                BallotEntry::new(candidate.id)
            ));
            candidate.increment_votes();
        }
        assert_eq!(candidate.votes, 3);

        // Reset one voter: their ledger entries drive the decrements.
        let cleared = voters[0].votes.clear_election(election);
        for (_, entry) in &cleared {
            assert_eq!(entry.candidate_id, candidate.id);
            candidate.decrement_votes();
        }
        assert_eq!(candidate.votes, 2);

        let referencing = voters
            .iter()
            .filter(|voter| {
                voter
                    .votes
                    .entry(election, "Mayor")
                    .map_or(false, |entry| entry.candidate_id == candidate.id)
            })
            .count();
        assert_eq!(candidate.votes as usize, referencing);
    }
}
