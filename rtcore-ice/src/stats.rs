use std::time::Instant;

use crate::candidate::candidate_pair::CandidatePairState;
use crate::candidate::CandidateType;
use crate::network_type::NetworkType;

/// A point-in-time snapshot of a candidate pair's state, mirroring the
/// `RTCIceCandidatePairStats` dictionary exposed through `getStats()`.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePairStats {
    pub timestamp: Instant,
    pub local_candidate_id: String,
    pub remote_candidate_id: String,
    pub state: CandidatePairState,
    pub nominated: bool,
    pub priority: u64,
}

impl Default for CandidatePairStats {
    fn default() -> Self {
        Self {
            timestamp: Instant::now(),
            local_candidate_id: String::new(),
            remote_candidate_id: String::new(),
            state: CandidatePairState::default(),
            nominated: false,
            priority: 0,
        }
    }
}

/// A point-in-time snapshot of a single local or remote candidate, mirroring
/// the `RTCIceCandidateStats` dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateStats {
    pub timestamp: Instant,
    pub id: String,
    pub network_type: NetworkType,
    pub ip: String,
    pub port: u16,
    pub candidate_type: CandidateType,
    pub priority: u32,
}

impl Default for CandidateStats {
    fn default() -> Self {
        Self {
            timestamp: Instant::now(),
            id: String::new(),
            network_type: NetworkType::default(),
            ip: String::new(),
            port: 0,
            candidate_type: CandidateType::default(),
            priority: 0,
        }
    }
}
