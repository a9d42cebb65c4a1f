use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::{
    api::{
        candidate::{CandidateList, RevisionDesc},
        standings::StandingsDesc,
    },
    standings::Standings,
};
use crate::store::Candidates;

pub fn routes() -> Vec<Route> {
    routes![all_candidates, revision, standings]
}

/// Unlike the board's listing action, this surfaces storage faults as a 500.
#[get("/api/candidates")]
async fn all_candidates(candidates: &State<Candidates>) -> Result<Json<CandidateList>> {
    let list = candidates.try_list().await?;
    Ok(Json(list.into()))
}

#[get("/api/candidates/revision")]
fn revision(candidates: &State<Candidates>) -> Json<RevisionDesc> {
    Json(RevisionDesc {
        revision: candidates.revision(),
    })
}

#[get("/api/standings")]
async fn standings(candidates: &State<Candidates>) -> Json<StandingsDesc> {
    let standings = Standings::new(candidates.list().await);
    Json(standings.into())
}

#[cfg(test)]
mod tests {
    use rocket::{http::Status, local::asynchronous::Client, serde::json::serde_json};

    use super::*;
    use crate::model::{
        api::ErrorBody,
        mongodb::Id,
        projection::{Delta, Projection},
    };
    use crate::store::testing::Unreachable;

    async fn get_json<T: serde::de::DeserializeOwned>(client: &Client, uri: String) -> T {
        let response = client.get(uri).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert!(response.body().is_some());
        let raw_response = response.into_string().await.unwrap();
        serde_json::from_str(&raw_response).unwrap()
    }

    #[backend_test]
    async fn lists_highest_first(client: Client, candidates: Candidates) {
        let john = candidates.create("John", "").await.unwrap();
        let jane = candidates.create("Jane", "").await.unwrap();
        candidates.increment_vote(&jane.id.to_string()).await.unwrap();

        let list: CandidateList = get_json(&client, uri!(all_candidates).to_string()).await;
        let ids: Vec<_> = list.candidates.iter().map(|c| *c.id).collect();
        assert_eq!(ids, vec![jane.id, john.id]);
        assert_eq!(list.candidates[0].votes, 1);
    }

    #[backend_test]
    async fn revision_follows_mutations(client: Client, candidates: Candidates) {
        let before: RevisionDesc = get_json(&client, uri!(revision).to_string()).await;
        assert_eq!(before.revision, 0);

        candidates.create("Alex", "").await.unwrap();
        let after: RevisionDesc = get_json(&client, uri!(revision).to_string()).await;
        assert_eq!(after.revision, 1);
    }

    #[backend_test]
    async fn standings_board(client: Client, candidates: Candidates) {
        let alex = candidates.create("Alex", "").await.unwrap();
        let sam = candidates.create("Sam", "").await.unwrap();
        candidates.create("Kim", "").await.unwrap();
        for _ in 0..2 {
            candidates.increment_vote(&alex.id.to_string()).await.unwrap();
        }
        candidates.increment_vote(&sam.id.to_string()).await.unwrap();

        let board: StandingsDesc = get_json(&client, uri!(standings).to_string()).await;
        assert_eq!(board.candidate_count, 3);
        assert_eq!(board.total_votes, 3);
        assert_eq!(board.leader.as_ref().unwrap().name, "Alex");
        assert!(board.candidates[0].is_leader);
        assert!(!board.candidates[1].is_leader);
        assert_eq!(board.candidates[0].percentage_label, "66.7%");
        assert_eq!(board.candidates[1].votes_label, "1 vote");
        assert_eq!(board.candidates[2].percentage_label, "0.0%");
    }

    #[backend_test]
    async fn empty_board(client: Client) {
        let board: StandingsDesc = get_json(&client, uri!(standings).to_string()).await;
        assert_eq!(board.candidate_count, 0);
        assert_eq!(board.total_votes, 0);
        assert!(board.leader.is_none());
    }

    #[backend_test]
    async fn projection_reconciles_with_server(client: Client, candidates: Candidates) {
        let alex = candidates.create("Alex", "").await.unwrap();

        let mut projection = Projection::new();
        projection.refresh(candidates.list().await, candidates.revision());
        let seen: RevisionDesc = get_json(&client, uri!(revision).to_string()).await;
        assert!(!projection.is_stale(seen.revision));

        // Someone else votes; then we vote and apply only what the server confirmed.
        candidates.increment_vote(&alex.id.to_string()).await.unwrap();
        let confirmed = candidates.increment_vote(&alex.id.to_string()).await.unwrap();
        assert!(projection.apply(Delta::Voted(confirmed)));
        assert_eq!(projection.standings().total_votes(), 2);

        let seen: RevisionDesc = get_json(&client, uri!(revision).to_string()).await;
        assert!(projection.is_stale(seen.revision));
    }

    #[rocket::async_test]
    async fn storage_fault_policies_differ() {
        log4rs_test_utils::test_logging::init_logging_once_for(["vote_backend"], None, None);

        let rocket = crate::rocket_for_candidates(Candidates::new(Unreachable));
        let client = Client::tracked(rocket).await.unwrap();

        // The HTTP listing fails closed...
        let response = client.get(uri!(all_candidates)).dispatch().await;
        assert_eq!(Status::InternalServerError, response.status());
        let raw_response = response.into_string().await.unwrap();
        let body: ErrorBody = serde_json::from_str(&raw_response).unwrap();
        assert_eq!(body.error, "Failed to fetch candidates");

        // ...while the board's reads fail open.
        let response = client.get("/actions/candidates").dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let raw_response = response.into_string().await.unwrap();
        let list: CandidateList = serde_json::from_str(&raw_response).unwrap();
        assert!(list.candidates.is_empty());

        let board: StandingsDesc = get_json(&client, uri!(standings).to_string()).await;
        assert_eq!(board.candidate_count, 0);

        // Mutations report a flat message.
        let response = client
            .post("/actions/candidates/vote")
            .header(rocket::http::ContentType::Form)
            .body(format!("id={}", Id::new()))
            .dispatch()
            .await;
        let raw_response = response.into_string().await.unwrap();
        assert_eq!(
            raw_response,
            r#"{"error":"Failed to record vote. Please try again."}"#
        );
    }
}
