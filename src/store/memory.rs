use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use log::info;

use crate::error::StorageFault;
use crate::model::{
    db::candidate::{fixtures, Candidate, CandidateCore},
    mongodb::Id,
};

use super::{CandidateStore, StoreResult};

/// A process-local candidate list, for running without a database.
///
/// Created once at ignition and dropped with the server; it is never
/// re-seeded while running. Every operation takes the one lock for its whole
/// duration, which makes vote increments atomic but serialises all access.
#[derive(Debug, Default)]
pub struct MemoryStore {
    candidates: Mutex<Vec<Candidate>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with the sample candidates.
    pub fn with_fixtures() -> Self {
        let candidates = fixtures(Utc::now());
        info!("Seeded in-memory store with {} candidates", candidates.len());
        Self {
            candidates: Mutex::new(candidates),
        }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Vec<Candidate>>> {
        self.candidates.lock().map_err(|_| StorageFault::Poisoned)
    }
}

#[rocket::async_trait]
impl CandidateStore for MemoryStore {
    async fn find_all(&self) -> StoreResult<Vec<Candidate>> {
        let mut candidates = self.lock()?.clone();
        // Stable, so ties stay in creation order.
        candidates.sort_by(|a, b| b.votes.cmp(&a.votes));
        Ok(candidates)
    }

    async fn insert(&self, name: String, description: String) -> StoreResult<Candidate> {
        let candidate = Candidate::new(Id::new(), CandidateCore::new(name, description, Utc::now()));
        self.lock()?.push(candidate.clone());
        Ok(candidate)
    }

    async fn update(
        &self,
        id: Id,
        name: String,
        description: String,
    ) -> StoreResult<Option<Candidate>> {
        let mut candidates = self.lock()?;
        Ok(candidates.iter_mut().find(|c| c.id == id).map(|candidate| {
            candidate.name = name;
            candidate.description = description;
            candidate.updated_at = Utc::now();
            candidate.clone()
        }))
    }

    async fn remove(&self, id: Id) -> StoreResult<bool> {
        let mut candidates = self.lock()?;
        let before = candidates.len();
        candidates.retain(|c| c.id != id);
        Ok(candidates.len() != before)
    }

    async fn increment_votes(&self, id: Id) -> StoreResult<Option<Candidate>> {
        let mut candidates = self.lock()?;
        Ok(candidates.iter_mut().find(|c| c.id == id).map(|candidate| {
            candidate.votes += 1;
            candidate.updated_at = Utc::now();
            candidate.clone()
        }))
    }
}
