use log::error;
use mongodb::error::Error as DbError;
use rocket::{
    http::Status,
    response::{status::Custom, Responder},
    serde::json::Json,
    Request,
};
use thiserror::Error;

use crate::model::api::ErrorBody;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the candidate repository.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller-supplied data was malformed; the caller must correct it.
    #[error("{0}")]
    Validation(String),
    /// The referenced record does not exist (any more).
    #[error("{0} not found")]
    NotFound(String),
    /// The backing store is unreachable or errored.
    #[error(transparent)]
    Storage(#[from] StorageFault),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

impl From<DbError> for Error {
    fn from(err: DbError) -> Self {
        Self::Storage(err.into())
    }
}

/// Infrastructure failures from either store backend.
#[derive(Debug, Error)]
pub enum StorageFault {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("In-memory candidate store is unavailable: a writer panicked while holding it")]
    Poisoned,
}

/// Renders as `{"error": ...}`. Only the candidate listing returns `Error`
/// directly, so storage faults are reported in its terms; the form actions
/// flatten errors into their own envelope instead.
impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'o> {
        let (status, message) = match self {
            Self::Validation(_) => (Status::BadRequest, self.to_string()),
            Self::NotFound(_) => (Status::NotFound, self.to_string()),
            Self::Storage(fault) => {
                error!("Storage fault while serving {}: {fault}", req.uri());
                (
                    Status::InternalServerError,
                    "Failed to fetch candidates".to_string(),
                )
            }
        };
        Custom(status, Json(ErrorBody::new(message))).respond_to(req)
    }
}

#[cfg(test)]
mod tests {
    use rocket::local::asynchronous::Client;

    use super::*;

    async fn render(client: &Client, err: Error) -> (Status, String) {
        let req = client.get("/api/candidates");
        let mut response = err.respond_to(&req).unwrap();
        let status = response.status();
        let body = response.body_mut().to_string().await.unwrap();
        (status, body)
    }

    #[test]
    fn messages() {
        assert_eq!(
            Error::validation("Candidate name is required").to_string(),
            "Candidate name is required"
        );
        assert_eq!(Error::not_found("Candidate abc").to_string(), "Candidate abc not found");
        assert!(matches!(
            Error::from(StorageFault::Poisoned),
            Error::Storage(StorageFault::Poisoned)
        ));
    }

    #[rocket::async_test]
    async fn responder_statuses() {
        log4rs_test_utils::test_logging::init_logging_once_for(["vote_backend"], None, None);
        let client = Client::untracked(rocket::build()).await.unwrap();

        let (status, body) = render(&client, Error::validation("Invalid data provided")).await;
        assert_eq!(status, Status::BadRequest);
        assert_eq!(body, r#"{"error":"Invalid data provided"}"#);

        let (status, body) = render(&client, Error::not_found("Candidate abc")).await;
        assert_eq!(status, Status::NotFound);
        assert_eq!(body, r#"{"error":"Candidate abc not found"}"#);

        let (status, body) = render(&client, StorageFault::Poisoned.into()).await;
        assert_eq!(status, Status::InternalServerError);
        assert_eq!(body, r#"{"error":"Failed to fetch candidates"}"#);
    }
}
