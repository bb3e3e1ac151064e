use mongodb::{
    bson::{doc, Document},
    options::FindOptions,
};
use rocket::{futures::TryStreamExt, serde::json::Json, Route};

use crate::error::{Error, Result};
use crate::model::{
    db::{Candidate, Election},
    mongodb::{Coll, Id},
};

pub fn routes() -> Vec<Route> {
    routes![get_elections, get_election, get_candidates]
}

#[get("/elections")]
async fn get_elections(elections: Coll<Election>) -> Result<Json<Vec<Election>>> {
    let all_elections = elections.find(None, None).await?.try_collect().await?;
    Ok(Json(all_elections))
}

#[get("/elections/<election_id>")]
async fn get_election(election_id: Id, elections: Coll<Election>) -> Result<Json<Election>> {
    let election = elections
        .find_one(election_id.as_doc(), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Election {election_id}")))?;
    Ok(Json(election))
}

/// List active candidates, optionally narrowed to a district and/or
/// position, in ballot-paper order.
#[get("/candidates?<district>&<position>")]
async fn get_candidates(
    district: Option<String>,
    position: Option<String>,
    candidates: Coll<Candidate>,
) -> Result<Json<Vec<Candidate>>> {
    let mut filter: Document = doc! {
        "is_active": true,
    };
    if let Some(district) = district {
        filter.insert("district", district);
    }
    if let Some(position) = position {
        filter.insert("position", position);
    }

    let options = FindOptions::builder()
        .sort(doc! {"ballot_order": 1, "name": 1})
        .build();

    let matching = candidates
        .find(filter, options)
        .await?
        .try_collect()
        .await?;
    Ok(Json(matching))
}
