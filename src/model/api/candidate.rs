use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{api::id::ApiId, db::candidate::Candidate};

/// API-friendly representation of a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDescription {
    pub id: ApiId,
    pub name: String,
    pub description: String,
    pub votes: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Candidate> for CandidateDescription {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.id.into(),
            name: candidate.candidate.name,
            description: candidate.candidate.description,
            votes: candidate.candidate.votes,
            created_at: candidate.candidate.created_at,
            updated_at: candidate.candidate.updated_at,
        }
    }
}

/// The body of every candidate listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateList {
    pub candidates: Vec<CandidateDescription>,
}

impl From<Vec<Candidate>> for CandidateList {
    fn from(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }
}

/// The current revalidation counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionDesc {
    pub revision: u64,
}

#[cfg(test)]
mod tests {
    use rocket::serde::json::{serde_json, Value};

    use super::*;
    use crate::model::{db::candidate::CandidateCore, mongodb::Id};

    #[test]
    fn serialises_camel_case_with_string_id() {
        let id = Id::new();
        let desc = CandidateDescription::from(Candidate::new(id, CandidateCore::example()));
        let json: Value = serde_json::to_value(&desc).unwrap();

        assert_eq!(json["id"], Value::String(id.to_string()));
        assert_eq!(json["name"], "Alex");
        assert_eq!(json["description"], "Rep");
        assert_eq!(json["votes"], 0);
        assert!(json["createdAt"].is_string());
        assert!(json["updatedAt"].is_string());
        assert!(json.get("_id").is_none());

        let back: CandidateDescription = serde_json::from_value(json).unwrap();
        assert_eq!(back, desc);
    }
}
