//! Derived display values over a list of candidates.

use crate::model::db::candidate::Candidate;

/// Candidates ranked by votes, with the totals the presentation shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standings {
    ranked: Vec<Candidate>,
    total_votes: u64,
}

impl Standings {
    /// Rank the given candidates, highest votes first. Ties keep their input order.
    pub fn new(mut candidates: Vec<Candidate>) -> Self {
        candidates.sort_by(|a, b| b.votes.cmp(&a.votes));
        let total_votes = candidates.iter().map(|c| c.votes).sum();
        Self {
            ranked: candidates,
            total_votes,
        }
    }

    pub fn ranked(&self) -> &[Candidate] {
        &self.ranked
    }

    pub fn total_votes(&self) -> u64 {
        self.total_votes
    }

    /// The top-ranked candidate, if there are any candidates at all.
    pub fn leader(&self) -> Option<&Candidate> {
        self.ranked.first()
    }

    /// Share of all votes held by `candidate`, in percent. Zero when nobody has voted.
    pub fn percentage(&self, candidate: &Candidate) -> f64 {
        if self.total_votes == 0 {
            0.0
        } else {
            candidate.votes as f64 / self.total_votes as f64 * 100.0
        }
    }
}

/// Format a percentage the way the board shows it, e.g. `46.7%`.
pub fn format_percentage(percentage: f64) -> String {
    format!("{percentage:.1}%")
}

/// "1 vote", "2 votes", "0 votes".
pub fn vote_label(votes: u64) -> String {
    if votes == 1 {
        "1 vote".to_string()
    } else {
        format!("{votes} votes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{db::candidate::CandidateCore, mongodb::Id};

    fn candidate(name: &str, votes: u64) -> Candidate {
        Candidate::new(Id::new(), CandidateCore::example_with_votes(name, votes))
    }

    #[test]
    fn ranks_and_totals() {
        let standings = Standings::new(vec![
            candidate("John", 5),
            candidate("Jane", 3),
            candidate("Alex", 7),
        ]);

        let names: Vec<_> = standings.ranked().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Alex", "John", "Jane"]);
        assert_eq!(standings.total_votes(), 15);
        assert_eq!(standings.leader().unwrap().name, "Alex");

        let alex = &standings.ranked()[0];
        assert_eq!(format_percentage(standings.percentage(alex)), "46.7%");
    }

    #[test]
    fn ties_keep_input_order() {
        let standings = Standings::new(vec![candidate("A", 1), candidate("B", 2), candidate("C", 1)]);
        let names: Vec<_> = standings.ranked().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["B", "A", "C"]);
    }

    #[test]
    fn no_votes_means_zero_percent() {
        let standings = Standings::new(vec![candidate("A", 0), candidate("B", 0)]);
        assert_eq!(standings.total_votes(), 0);
        assert_eq!(standings.percentage(&standings.ranked()[1]), 0.0);
        assert_eq!(format_percentage(0.0), "0.0%");
    }

    #[test]
    fn empty_board_has_no_leader() {
        let standings = Standings::new(Vec::new());
        assert!(standings.leader().is_none());
        assert_eq!(standings.total_votes(), 0);
    }

    #[test]
    fn labels() {
        assert_eq!(vote_label(0), "0 votes");
        assert_eq!(vote_label(1), "1 vote");
        assert_eq!(vote_label(12), "12 votes");
    }
}
