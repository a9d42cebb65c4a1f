//! The presentation's local copy of the candidate list.
//!
//! The projection is only ever changed by records the server confirmed. A
//! confirmed record replaces the local one wholesale; nothing is patched from
//! what the client merely expected to happen.
//!
//! This is a library API for presentation code running in-process against a
//! [`Candidates`](crate::store::Candidates) handle, whose operations return
//! the confirmed records a [`Delta`] carries. The HTTP actions only answer
//! with an envelope, so HTTP clients re-read the list instead.

use crate::model::{db::candidate::Candidate, mongodb::Id, standings::Standings};

/// A mutation the server has confirmed, carrying the record it returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delta {
    Added(Candidate),
    Updated(Candidate),
    Voted(Candidate),
    Deleted(Id),
}

/// A possibly stale local view of the candidates.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    candidates: Vec<Candidate>,
    /// The revalidation counter the last full read was taken at.
    revision: Option<u64>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything with a fresh read taken at `revision`.
    pub fn refresh(&mut self, candidates: Vec<Candidate>, revision: u64) {
        self.candidates = candidates;
        self.revision = Some(revision);
    }

    /// Apply a confirmed mutation. Returns false if it referred to a
    /// candidate this projection does not know about, in which case nothing
    /// changed and the caller should refresh.
    pub fn apply(&mut self, delta: Delta) -> bool {
        match delta {
            Delta::Added(candidate) => {
                if self.position(candidate.id).is_some() {
                    return self.replace(candidate);
                }
                self.candidates.push(candidate);
                true
            }
            Delta::Updated(candidate) | Delta::Voted(candidate) => self.replace(candidate),
            Delta::Deleted(id) => match self.position(id) {
                Some(index) => {
                    self.candidates.remove(index);
                    true
                }
                None => false,
            },
        }
    }

    /// Whether the server has moved past the last full read.
    pub fn is_stale(&self, current_revision: u64) -> bool {
        self.revision != Some(current_revision)
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn standings(&self) -> Standings {
        Standings::new(self.candidates.clone())
    }

    fn position(&self, id: Id) -> Option<usize> {
        self.candidates.iter().position(|c| c.id == id)
    }

    fn replace(&mut self, candidate: Candidate) -> bool {
        match self.position(candidate.id) {
            Some(index) => {
                self.candidates[index] = candidate;
                true
            }
            None => false,
        }
    }
}
