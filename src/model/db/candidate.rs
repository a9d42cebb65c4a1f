use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// Core candidate data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCore {
    /// Display name, stored trimmed and never empty.
    pub name: String,
    /// Free-text blurb, stored trimmed; empty if none was given.
    pub description: String,
    /// Vote tally. Only ever incremented.
    pub votes: u64,
    /// Set by the store on insertion.
    #[serde(rename = "createdAt", with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    /// Refreshed by the store on every update and vote.
    #[serde(rename = "updatedAt", with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl CandidateCore {
    /// A fresh candidate with no votes, stamped at `now`.
    pub fn new(name: String, description: String, now: DateTime<Utc>) -> Self {
        Self {
            name,
            description,
            votes: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A candidate from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub candidate: CandidateCore,
}

impl Candidate {
    pub fn new(id: Id, candidate: CandidateCore) -> Self {
        Self { id, candidate }
    }
}

impl Deref for Candidate {
    type Target = CandidateCore;

    fn deref(&self) -> &Self::Target {
        &self.candidate
    }
}

impl DerefMut for Candidate {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.candidate
    }
}

/// The sample candidates the in-memory store can be seeded with.
pub fn fixtures(now: DateTime<Utc>) -> Vec<Candidate> {
    [
        ("John Doe", "Computer Science Department Representative", 5),
        ("Jane Smith", "Student Council President Candidate", 3),
        ("Alex Johnson", "Cultural Committee Head", 7),
    ]
    .into_iter()
    .map(|(name, description, votes)| {
        let mut core = CandidateCore::new(name.to_string(), description.to_string(), now);
        core.votes = votes;
        Candidate::new(Id::new(), core)
    })
    .collect()
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl CandidateCore {
        pub fn example() -> Self {
            Self::new("Alex".to_string(), "Rep".to_string(), Utc::now())
        }

        pub fn example_with_votes(name: &str, votes: u64) -> Self {
            let mut core = Self::new(name.to_string(), String::new(), Utc::now());
            core.votes = votes;
            core
        }
    }
}
