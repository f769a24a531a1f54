use std::time::Instant;

use super::Agent;
use crate::stats::{CandidatePairStats, CandidateStats};

impl Agent {
    /// Returns a stats snapshot for every candidate pair currently on the checklist.
    pub fn get_candidate_pairs_stats(&self) -> Vec<CandidatePairStats> {
        let now = Instant::now();
        self.candidate_pairs
            .iter()
            .map(|p| CandidatePairStats {
                timestamp: now,
                local_candidate_id: self.local_candidates[p.local_index].id(),
                remote_candidate_id: self.remote_candidates[p.remote_index].id(),
                state: p.state,
                nominated: p.nominated,
                priority: p.priority(),
            })
            .collect()
    }

    /// Returns a stats snapshot for every local candidate gathered so far.
    pub fn get_local_candidates_stats(&self) -> Vec<CandidateStats> {
        let now = Instant::now();
        self.local_candidates
            .iter()
            .map(|c| CandidateStats {
                timestamp: now,
                id: c.id(),
                network_type: c.network_type(),
                ip: c.address(),
                port: c.port(),
                candidate_type: c.candidate_type(),
                priority: c.priority(),
            })
            .collect()
    }

    /// Returns a stats snapshot for every remote candidate learned so far.
    pub fn get_remote_candidates_stats(&self) -> Vec<CandidateStats> {
        let now = Instant::now();
        self.remote_candidates
            .iter()
            .map(|c| CandidateStats {
                timestamp: now,
                id: c.id(),
                network_type: c.network_type(),
                ip: c.address(),
                port: c.port(),
                candidate_type: c.candidate_type(),
                priority: c.priority(),
            })
            .collect()
    }
}
