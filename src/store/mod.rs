//! The candidate repository: a single handle over one of two interchangeable
//! backends, chosen once when the server ignites.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, error};

use crate::error::{Error, Result, StorageFault};
use crate::model::{db::candidate::Candidate, mongodb::Id};

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

pub type StoreResult<T> = std::result::Result<T, StorageFault>;

/// A backend able to persist candidates.
///
/// Backends only report storage faults; a missing record is `None`/`false`,
/// and the [`Candidates`] handle turns that into [`Error::NotFound`].
#[rocket::async_trait]
pub trait CandidateStore: Send + Sync {
    /// All candidates, highest votes first.
    async fn find_all(&self) -> StoreResult<Vec<Candidate>>;

    /// Persist a new candidate with no votes.
    async fn insert(&self, name: String, description: String) -> StoreResult<Candidate>;

    /// Overwrite name and description, leaving votes alone.
    async fn update(&self, id: Id, name: String, description: String)
        -> StoreResult<Option<Candidate>>;

    /// Hard-delete. Returns whether anything was removed.
    async fn remove(&self, id: Id) -> StoreResult<bool>;

    /// Add exactly one vote in a single atomic step.
    async fn increment_votes(&self, id: Id) -> StoreResult<Option<Candidate>>;
}

/// Counter bumped after every successful mutation, so readers can tell when
/// their copy of the list went stale.
#[derive(Debug, Default)]
pub struct Revision(AtomicU64);

impl Revision {
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// The single authority for reading and mutating candidates.
#[derive(Clone)]
pub struct Candidates {
    store: Arc<dyn CandidateStore>,
    revision: Arc<Revision>,
}

impl Candidates {
    pub fn new(store: impl CandidateStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
            revision: Arc::new(Revision::default()),
        }
    }

    /// All candidates, highest votes first.
    ///
    /// Fails open: if storage is down this logs the fault and returns an empty
    /// list, so the board still renders.
    pub async fn list(&self) -> Vec<Candidate> {
        match self.store.find_all().await {
            Ok(candidates) => candidates,
            Err(fault) => {
                error!("Error fetching candidates: {fault}");
                Vec::new()
            }
        }
    }

    /// All candidates, highest votes first, surfacing storage faults.
    pub async fn try_list(&self) -> Result<Vec<Candidate>> {
        Ok(self.store.find_all().await?)
    }

    pub async fn create(&self, name: &str, description: &str) -> Result<Candidate> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("Candidate name is required"));
        }
        let candidate = self
            .store
            .insert(name.to_string(), description.trim().to_string())
            .await?;
        self.mutated("created", candidate.id);
        Ok(candidate)
    }

    pub async fn update(&self, id: &str, name: &str, description: &str) -> Result<Candidate> {
        let name = name.trim();
        if id.trim().is_empty() || name.is_empty() {
            return Err(Error::validation("Invalid data provided"));
        }
        let id = parse_id(id)?;
        let candidate = self
            .store
            .update(id, name.to_string(), description.trim().to_string())
            .await?
            .ok_or_else(|| not_found(id))?;
        self.mutated("updated", id);
        Ok(candidate)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = parse_id(id)?;
        if !self.store.remove(id).await? {
            return Err(not_found(id));
        }
        self.mutated("deleted", id);
        Ok(())
    }

    pub async fn increment_vote(&self, id: &str) -> Result<Candidate> {
        let id = parse_id(id)?;
        let candidate = self
            .store
            .increment_votes(id)
            .await?
            .ok_or_else(|| not_found(id))?;
        self.mutated("voted for", id);
        Ok(candidate)
    }

    /// The current revalidation counter.
    pub fn revision(&self) -> u64 {
        self.revision.current()
    }

    fn mutated(&self, what: &str, id: Id) {
        let revision = self.revision.bump();
        debug!("Candidate {id} {what}, revision now {revision}");
    }
}

fn not_found(id: Id) -> Error {
    Error::not_found(format!("Candidate {id}"))
}

/// An ID that is blank or malformed can never resolve to a record.
fn parse_id(id: &str) -> Result<Id> {
    let id = id.trim();
    if id.is_empty() {
        return Err(Error::validation("Candidate ID is required"));
    }
    id.parse()
        .map_err(|_| Error::not_found(format!("Candidate {id}")))
}
