use serde::{Deserialize, Serialize};

use crate::model::{
    api::candidate::CandidateDescription,
    standings::{format_percentage, vote_label, Standings},
};

/// A single ranked row on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingDesc {
    pub candidate: CandidateDescription,
    pub percentage: f64,
    /// Pre-formatted for display, e.g. `46.7%`.
    pub percentage_label: String,
    pub votes_label: String,
    pub is_leader: bool,
}

/// The whole board, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsDesc {
    pub candidate_count: usize,
    pub total_votes: u64,
    pub leader: Option<CandidateDescription>,
    pub candidates: Vec<StandingDesc>,
}

impl From<Standings> for StandingsDesc {
    fn from(standings: Standings) -> Self {
        let total_votes = standings.total_votes();
        let leader_id = standings.leader().map(|c| c.id);
        let rows: Vec<StandingDesc> = standings
            .ranked()
            .iter()
            .map(|candidate| {
                let percentage = standings.percentage(candidate);
                StandingDesc {
                    candidate: candidate.clone().into(),
                    percentage,
                    percentage_label: format_percentage(percentage),
                    votes_label: vote_label(candidate.votes),
                    is_leader: Some(candidate.id) == leader_id,
                }
            })
            .collect();
        Self {
            candidate_count: rows.len(),
            total_votes,
            leader: rows.first().map(|row| row.candidate.clone()),
            candidates: rows,
        }
    }
}
