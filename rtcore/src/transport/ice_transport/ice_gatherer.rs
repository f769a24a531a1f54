use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use ice::agent::Agent;
use ice::url::Url;
use ice::Credentials;

use crate::api::setting_engine::SettingEngine;
use crate::peer_connection::policy::ice_transport_policy::RTCIceTransportPolicy;
use crate::stats::stats_collector::StatsCollector;
use crate::stats::SourceStatsType::*;
use crate::stats::{ICECandidatePairStats, StatsReportType};
use crate::transport::ice_transport::ice_candidate::*;
use crate::transport::ice_transport::ice_gatherer_state::RTCIceGathererState;
use crate::transport::ice_transport::ice_parameters::RTCIceParameters;
use crate::transport::ice_transport::ice_server::RTCIceServer;
use shared::error::Result;

/// ICEGatherOptions provides options relating to the gathering of ICE candidates.
#[derive(Default, Debug, Clone)]
pub struct RTCIceGatherOptions {
    pub ice_servers: Vec<RTCIceServer>,
    pub ice_gather_policy: RTCIceTransportPolicy,
}

pub enum IceGathererEvent {
    OnLocalCandidate(RTCIceCandidate),
    OnICEGathererState(RTCIceGathererState),
    OnGatheringComplete,
}

/// ICEGatherer gathers local host, server reflexive and relay
/// candidates, as well as enabling the retrieval of local Interactive
/// Connectivity Establishment (ICE) parameters which can be
/// exchanged in signaling.
pub struct RTCIceGatherer {
    pub(crate) validated_servers: Vec<Url>,
    pub(crate) gather_policy: RTCIceTransportPolicy,
    pub(crate) setting_engine: Arc<SettingEngine>,

    pub(crate) state: RTCIceGathererState,
    pub(crate) events: VecDeque<IceGathererEvent>,

    pub(crate) agent: Agent,
}

impl RTCIceGatherer {
    pub(crate) fn new(
        agent: Agent,
        validated_servers: Vec<Url>,
        gather_policy: RTCIceTransportPolicy,
        setting_engine: Arc<SettingEngine>,
    ) -> Self {
        RTCIceGatherer {
            agent,
            gather_policy,
            validated_servers,
            setting_engine,

            state: RTCIceGathererState::New,
            events: VecDeque::new(),
        }
    }

    /// Close prunes all local candidates, and closes the ports.
    pub fn close(&mut self) -> Result<()> {
        self.set_state(RTCIceGathererState::Closed);
        self.agent.close()?;
        Ok(())
    }

    /// get_local_parameters returns the ICE parameters of the ICEGatherer.
    pub fn get_local_parameters(&mut self) -> Result<RTCIceParameters> {
        let Credentials { ufrag, pwd } = self.agent.get_local_credentials();

        Ok(RTCIceParameters {
            username_fragment: ufrag.to_string(),
            password: pwd.to_string(),
            ice_lite: false,
        })
    }

    /// get_local_candidates returns the sequence of valid local candidates associated with the ICEGatherer.
    pub fn get_local_candidates(&mut self) -> Vec<RTCIceCandidate> {
        let ice_candidates = self.agent.get_local_candidates();
        rtc_ice_candidates_from_ice_candidates(ice_candidates)
    }

    /// State indicates the current state of the ICE gatherer.
    pub fn state(&self) -> RTCIceGathererState {
        self.state
    }

    pub fn set_state(&mut self, s: RTCIceGathererState) {
        self.state = s;
        self.events
            .push_back(IceGathererEvent::OnICEGathererState(s));
    }

    pub(crate) fn collect_stats(&self, collector: &mut StatsCollector) {
        let mut reports = HashMap::new();

        for stats in self.agent.get_candidate_pairs_stats() {
            let stats: ICECandidatePairStats = stats.into();
            reports.insert(stats.id.clone(), StatsReportType::CandidatePair(stats));
        }

        for stats in self.agent.get_local_candidates_stats() {
            reports.insert(
                stats.id.clone(),
                StatsReportType::from(LocalCandidate(stats)),
            );
        }

        for stats in self.agent.get_remote_candidates_stats() {
            reports.insert(
                stats.id.clone(),
                StatsReportType::from(RemoteCandidate(stats)),
            );
        }

        collector.merge(reports);
    }
}
