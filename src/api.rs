use rocket::{http::Status, serde::json::Json, Catcher, Request, Route};

use crate::model::api::ErrorBody;

mod actions;
mod candidates;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(actions::routes());
    routes.extend(candidates::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![default_catcher]
}

/// Keep error bodies JSON-shaped even when no route produced them.
#[catch(default)]
fn default_catcher(status: Status, _req: &Request<'_>) -> Json<ErrorBody> {
    Json(ErrorBody::new(status.reason().unwrap_or("Unknown error")))
}
