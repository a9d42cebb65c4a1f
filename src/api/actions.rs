//! Form actions driven by the candidate board. Every mutating action answers
//! HTTP 200 with either `{"success": true}` or `{"error": "..."}`.

use rocket::{form::Form, serde::json::Json, Route, State};

use crate::model::api::{
    action::{required, ActionOutcome, AddCandidateForm, CandidateIdForm, UpdateCandidateForm},
    candidate::CandidateList,
};
use crate::store::Candidates;

pub fn routes() -> Vec<Route> {
    routes![
        list_candidates,
        add_candidate,
        update_candidate,
        delete_candidate,
        vote_for_candidate,
    ]
}

/// Fails open: a storage fault renders as an empty board.
#[get("/actions/candidates")]
async fn list_candidates(candidates: &State<Candidates>) -> Json<CandidateList> {
    Json(candidates.list().await.into())
}

#[post("/actions/candidates/add", data = "<form>")]
async fn add_candidate(
    form: Form<AddCandidateForm>,
    candidates: &State<Candidates>,
) -> Json<ActionOutcome> {
    let form = form.into_inner();
    let Some(name) = required(form.name) else {
        return Json(ActionOutcome::failure("Candidate name is required"));
    };
    let description = form.description.unwrap_or_default();

    let result = candidates.create(&name, &description).await;
    Json(ActionOutcome::from_result(
        result,
        "adding candidate",
        "Failed to add candidate. Please try again.",
    ))
}

#[post("/actions/candidates/update", data = "<form>")]
async fn update_candidate(
    form: Form<UpdateCandidateForm>,
    candidates: &State<Candidates>,
) -> Json<ActionOutcome> {
    let form = form.into_inner();
    let (Some(id), Some(name)) = (required(form.id), required(form.name)) else {
        return Json(ActionOutcome::failure("Invalid data provided"));
    };
    let description = form.description.unwrap_or_default();

    let result = candidates.update(&id, &name, &description).await;
    Json(ActionOutcome::from_result(
        result,
        "updating candidate",
        "Failed to update candidate. Please try again.",
    ))
}

#[post("/actions/candidates/delete", data = "<form>")]
async fn delete_candidate(
    form: Form<CandidateIdForm>,
    candidates: &State<Candidates>,
) -> Json<ActionOutcome> {
    let Some(id) = required(form.into_inner().id) else {
        return Json(ActionOutcome::failure("Candidate ID is required"));
    };

    let result = candidates.delete(&id).await;
    Json(ActionOutcome::from_result(
        result,
        "deleting candidate",
        "Failed to delete candidate. Please try again.",
    ))
}

#[post("/actions/candidates/vote", data = "<form>")]
async fn vote_for_candidate(
    form: Form<CandidateIdForm>,
    candidates: &State<Candidates>,
) -> Json<ActionOutcome> {
    let Some(id) = required(form.into_inner().id) else {
        return Json(ActionOutcome::failure("Candidate ID is required"));
    };

    let result = candidates.increment_vote(&id).await;
    Json(ActionOutcome::from_result(
        result,
        "voting for candidate",
        "Failed to record vote. Please try again.",
    ))
}
