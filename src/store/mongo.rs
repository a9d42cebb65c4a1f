use mongodb::{
    bson::{doc, DateTime},
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Database,
};
use rocket::futures::TryStreamExt;

use crate::model::{
    db::candidate::{Candidate, CandidateCore},
    mongodb::{Coll, Id},
};

use super::{CandidateStore, StoreResult};

/// Candidates persisted in MongoDB.
///
/// Holds no mutable state of its own; all consistency comes from the
/// database's single-document atomicity.
#[derive(Clone)]
pub struct MongoStore {
    candidates: Coll<Candidate>,
}

impl MongoStore {
    pub fn new(db: &Database) -> Self {
        Self {
            candidates: Coll::from_db(db),
        }
    }

    fn return_updated() -> FindOneAndUpdateOptions {
        FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build()
    }
}

#[rocket::async_trait]
impl CandidateStore for MongoStore {
    async fn find_all(&self) -> StoreResult<Vec<Candidate>> {
        // Break ties by ID so creation order wins, matching the in-memory store.
        let options = FindOptions::builder()
            .sort(doc! { "votes": -1, "_id": 1 })
            .build();
        let candidates: Vec<Candidate> = self
            .candidates
            .find(None, options)
            .await?
            .try_collect()
            .await?;
        Ok(candidates)
    }

    async fn insert(&self, name: String, description: String) -> StoreResult<Candidate> {
        // Millisecond precision, so the returned record matches what is stored.
        let now = DateTime::now().to_chrono();
        let candidate = Candidate::new(Id::new(), CandidateCore::new(name, description, now));
        self.candidates.insert_one(&candidate, None).await?;
        Ok(candidate)
    }

    async fn update(
        &self,
        id: Id,
        name: String,
        description: String,
    ) -> StoreResult<Option<Candidate>> {
        let update = doc! {
            "$set": {
                "name": name,
                "description": description,
                "updatedAt": DateTime::now(),
            }
        };
        let candidate = self
            .candidates
            .find_one_and_update(id.as_doc(), update, Self::return_updated())
            .await?;
        Ok(candidate)
    }

    async fn remove(&self, id: Id) -> StoreResult<bool> {
        let result = self.candidates.delete_one(id.as_doc(), None).await?;
        Ok(result.deleted_count == 1)
    }

    async fn increment_votes(&self, id: Id) -> StoreResult<Option<Candidate>> {
        // One round trip: the read-modify-write happens inside the server.
        let update = doc! {
            "$inc": { "votes": 1_i64 },
            "$set": { "updatedAt": DateTime::now() },
        };
        let candidate = self
            .candidates
            .find_one_and_update(id.as_doc(), update, Self::return_updated())
            .await?;
        Ok(candidate)
    }
}
