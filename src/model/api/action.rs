use log::error;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Form fields for adding a candidate.
#[derive(Debug, Default, FromForm)]
pub struct AddCandidateForm {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Form fields for editing a candidate.
#[derive(Debug, Default, FromForm)]
pub struct UpdateCandidateForm {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Form fields naming a single candidate, for deleting or voting.
#[derive(Debug, Default, FromForm)]
pub struct CandidateIdForm {
    pub id: Option<String>,
}

/// Extract a field that must be present and non-blank.
pub fn required(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}

/// The uniform envelope returned by every mutating action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionOutcome {
    Success { success: bool },
    Failure { error: String },
}

impl ActionOutcome {
    pub fn success() -> Self {
        Self::Success { success: true }
    }

    pub fn failure(msg: impl Into<String>) -> Self {
        Self::Failure { error: msg.into() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { success: true })
    }

    /// Flatten a repository outcome into the envelope.
    ///
    /// `doing` names the action for the log line; `fallback` is what the
    /// user sees when storage fails.
    pub fn from_result<T>(result: Result<T>, doing: &str, fallback: &str) -> Self {
        match result {
            Ok(_) => Self::success(),
            Err(Error::Validation(msg)) => Self::failure(msg),
            Err(Error::NotFound(_)) => Self::failure("Candidate not found"),
            Err(Error::Storage(fault)) => {
                error!("Error {doing}: {fault}");
                Self::failure(fallback)
            }
        }
    }
}

/// Body of a failed read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rocket::serde::json::{json, serde_json};

    use super::*;
    use crate::error::StorageFault;

    #[test]
    fn envelope_shapes() {
        assert_eq!(
            serde_json::to_value(ActionOutcome::success()).unwrap(),
            json!({ "success": true })
        );
        assert_eq!(
            serde_json::to_value(ActionOutcome::failure("nope")).unwrap(),
            json!({ "error": "nope" })
        );
        let parsed: ActionOutcome = serde_json::from_str(r#"{"error":"x"}"#).unwrap();
        assert_eq!(parsed, ActionOutcome::failure("x"));
    }

    #[test]
    fn maps_every_error_kind_to_a_message() {
        let fallback = "Failed to record vote. Please try again.";
        let outcome =
            ActionOutcome::from_result::<()>(Err(Error::validation("bad")), "voting", fallback);
        assert_eq!(outcome, ActionOutcome::failure("bad"));

        let outcome =
            ActionOutcome::from_result::<()>(Err(Error::not_found("Candidate x")), "voting", fallback);
        assert_eq!(outcome, ActionOutcome::failure("Candidate not found"));

        let outcome =
            ActionOutcome::from_result::<()>(Err(StorageFault::Poisoned.into()), "voting", fallback);
        assert_eq!(outcome, ActionOutcome::failure(fallback));

        assert!(ActionOutcome::from_result(Ok(()), "voting", fallback).is_success());
    }

    #[test]
    fn blank_fields_are_missing() {
        assert_eq!(required(None), None);
        assert_eq!(required(Some("   ".to_string())), None);
        assert_eq!(required(Some(" Alex ".to_string())), Some(" Alex ".to_string()));
    }
}
