pub mod certificate;
pub mod configuration;
pub mod offer_answer_options;
pub mod peer_connection_state;
pub mod policy;
pub mod sdp;
pub mod signaling_state;

use ::sdp::description::session::Origin;
use rcgen::KeyPair;
use shared::error::{Error, Result};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use rand::{thread_rng, Rng};

use crate::api::API;
use crate::peer_connection::configuration::media_engine::MediaEngine;
use crate::peer_connection::configuration::setting_engine::SettingEngine;
use crate::transport::ice_transport::ice_connection_state::RTCIceConnectionState;
use crate::peer_connection::certificate::RTCCertificate;
use crate::peer_connection::configuration::RTCConfiguration;
use crate::peer_connection::peer_connection_state::{
    NegotiationNeededState, RTCPeerConnectionState,
};
use crate::peer_connection::policy::ice_transport_policy::RTCIceTransportPolicy;
use crate::peer_connection::sdp::session_description::RTCSessionDescription;
use crate::peer_connection::signaling_state::RTCSignalingState;
/// SIMULCAST_PROBE_COUNT is the amount of RTP Packets
/// that handleUndeclaredSSRC will read and try to dispatch from
/// mid and rid values
pub(crate) const SIMULCAST_PROBE_COUNT: usize = 10;

/// SIMULCAST_MAX_PROBE_ROUTINES is how many active routines can be used to probe
/// If the total amount of incoming SSRCes exceeds this new requests will be ignored
pub(crate) const SIMULCAST_MAX_PROBE_ROUTINES: u64 = 25;

pub(crate) const MEDIA_SECTION_APPLICATION: &str = "application";

const RUNES_ALPHA: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// math_rand_alpha generates a mathematical random alphabet sequence of the requested length.
pub fn math_rand_alpha(n: usize) -> String {
    let mut rng = thread_rng();

    let rand_string: String = (0..n)
        .map(|_| {
            let idx = rng.gen_range(0..RUNES_ALPHA.len());
            RUNES_ALPHA[idx] as char
        })
        .collect();

    rand_string
}

pub enum PeerConnectionEvent {
    // Peer-to-peer connections
    OnNegotiationNeeded,
    OnIceCandidate,
    OnIceCandidateError,
    OnSignalingStateChange(RTCSignalingState),
    OnIceConnectionStateChange(RTCIceConnectionState),
    OnIceGatheringStateChane,
    OnPeerConnectionStateChange(RTCPeerConnectionState),
    // RTP Media API
    OnTrack,
    // Peer-to-peer Data API
    OnDataChannel,
}

/// PeerConnection represents a WebRTC connection that establishes a
/// peer-to-peer communications with another PeerConnection instance in a
/// browser, or to another endpoint implementing the required protocols.
pub struct RTCPeerConnection {
    pub(super) sdp_origin: Origin,
    pub(crate) configuration: RTCConfiguration,
    pub(super) is_closed: bool,
    pub(super) is_negotiation_needed: bool,
    pub(super) negotiation_needed_state: NegotiationNeededState,
    pub(super) last_offer: String,
    pub(super) last_answer: String,
    pub(super) signaling_state: RTCSignalingState,
    pub(super) peer_connection_state: RTCPeerConnectionState,
    pub(super) ice_connection_state: RTCIceConnectionState,
    pub(super) current_local_description: Option<RTCSessionDescription>,
    pub(super) current_remote_description: Option<RTCSessionDescription>,
    pub(super) pending_local_description: Option<RTCSessionDescription>,
    pub(super) pending_remote_description: Option<RTCSessionDescription>,

    pub(super) ice_agent: ice::Agent,

    pub(crate) stats_id: String,
    /// a value containing the last known greater mid value
    /// we internally generate mids as numbers. Needed since JSEP
    /// requires that when reusing a media section a new unique mid
    /// should be defined (see JSEP 3.4.1).
    pub(super) greater_mid: isize,
    /// A reference to the associated API state used by this connection
    pub(super) setting_engine: Arc<SettingEngine>,
    pub(crate) media_engine: MediaEngine,

    pub(crate) events: VecDeque<PeerConnectionEvent>,
}

impl std::fmt::Debug for RTCPeerConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RTCPeerConnection")
            .field("stats_id", &self.stats_id)
            .field("signaling_state", &self.signaling_state)
            .field("ice_connection_state", &self.ice_connection_state)
            .finish()
    }
}

impl std::fmt::Display for RTCPeerConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(RTCPeerConnection {})", self.stats_id)
    }
}

impl RTCPeerConnection {
    /// creates a PeerConnection with the default codecs and
    /// interceptors.  See register_default_codecs and register_default_interceptors.
    ///
    /// If you wish to customize the set of available codecs or the set of
    /// active interceptors, create a MediaEngine and call api.new_peer_connection
    /// instead of this function.
    pub(crate) fn new(api: &API, mut configuration: RTCConfiguration) -> Result<Self> {
        RTCPeerConnection::init_configuration(&mut configuration)?;

        let mut candidate_types = vec![];
        if api.setting_engine.candidates.ice_lite {
            candidate_types.push(ice::candidate::CandidateType::Host);
        } else if configuration.ice_transport_policy == RTCIceTransportPolicy::Relay {
            candidate_types.push(ice::candidate::CandidateType::Relay);
        }

        let mut validated_servers = vec![];
        for server in configuration.get_ice_servers() {
            let url = server.urls()?;
            validated_servers.extend(url);
        }

        let ice_agent_config = ice::AgentConfig {
            lite: api.setting_engine.candidates.ice_lite,
            urls: validated_servers,
            disconnected_timeout: api.setting_engine.timeout.ice_disconnected_timeout,
            failed_timeout: api.setting_engine.timeout.ice_failed_timeout,
            keepalive_interval: api.setting_engine.timeout.ice_keepalive_interval,
            candidate_types,
            host_acceptance_min_wait: api.setting_engine.timeout.ice_host_acceptance_min_wait,
            srflx_acceptance_min_wait: api.setting_engine.timeout.ice_srflx_acceptance_min_wait,
            prflx_acceptance_min_wait: api.setting_engine.timeout.ice_prflx_acceptance_min_wait,
            relay_acceptance_min_wait: api.setting_engine.timeout.ice_relay_acceptance_min_wait,
            local_ufrag: api.setting_engine.candidates.username_fragment.clone(),
            local_pwd: api.setting_engine.candidates.password.clone(),
            ..Default::default()
        };

        let ice_agent = ice::Agent::new(Arc::new(ice_agent_config))?;

        // <https://w3c.github.io/webrtc-pc/#constructor> (Step #2)
        // Some variables defined explicitly despite their implicit zero values to
        // allow better readability to understand what is happening.
        Ok(RTCPeerConnection {
            sdp_origin: Default::default(),
            stats_id: format!(
                "PeerConnection-{}",
                SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap()
                    .as_nanos()
            ),

            configuration,

            is_closed: false,
            greater_mid: -1,

            negotiation_needed_state: NegotiationNeededState::Empty,
            last_offer: "".to_string(),
            last_answer: "".to_string(),
            signaling_state: RTCSignalingState::Stable,
            ice_connection_state: RTCIceConnectionState::New,
            current_local_description: None,
            current_remote_description: None,
            pending_local_description: None,
            pending_remote_description: None,
            peer_connection_state: RTCPeerConnectionState::New,

            setting_engine: api.setting_engine.clone(),
            media_engine: api.media_engine.clone(),
            is_negotiation_needed: false,
            ice_agent,
            events: Default::default(),
        })
    }

    /// init_configuration defines validation of the specified Configuration and
    /// its assignment to the internal configuration variable. This function differs
    /// from its set_configuration counterpart because most of the checks do not
    /// include verification statements related to the existing state. Thus the
    /// function describes only minor verification of some the struct variables.
    fn init_configuration(configuration: &mut RTCConfiguration) -> Result<()> {
        let sanitized_ice_servers = configuration.get_ice_servers();
        if !sanitized_ice_servers.is_empty() {
            for server in &sanitized_ice_servers {
                server.validate()?;
            }
        }

        // TODO: <https://www.w3.org/TR/webrtc/#constructor> (step #2):
        // Let connection have a [[DocumentOrigin]] internal slot,
        // initialized to the relevant settings object's origin.

        // <https://www.w3.org/TR/webrtc/#constructor> (step #5)
        if !configuration.certificates.is_empty() {
            // If the value of certificate.expires is less than the current time,
            // throw an InvalidAccessError.
            let now = SystemTime::now();
            for cert in &configuration.certificates {
                cert.expires
                    .duration_since(now)
                    .map_err(|_| Error::ErrCertificateExpired)?;
            }

            //TODO: If certificate.[[Origin]] is not same origin with connection.[[DocumentOrigin]],
            // throw an InvalidAccessError.
        } else {
            // (step #6) Else, generate one or more new RTCCertificate instances with this RTCPeerConnection
            // instance and store them. This MAY happen asynchronously and the value of certificates
            // remains undefined for the subsequent steps. As noted in Section 4.3.2.3 of [RFC8826],
            // WebRTC utilizes self-signed rather than Public Key Infrastructure (PKI) certificates,
            // so that the expiration check is to ensure that keys are not used indefinitely and
            // additional certificate checks are unnecessary.
            let kp = KeyPair::generate(&rcgen::PKCS_ECDSA_P256_SHA256)?;
            let cert = RTCCertificate::from_key_pair(kp)?;
            configuration.certificates = vec![cert];
        };

        Ok(())
    }

    /// 4.4.1.3 Update the connection state
    fn update_peer_connection_state_change(&mut self, new_state: RTCPeerConnectionState) {
        self.peer_connection_state = new_state;
        self.events
            .push_back(PeerConnectionEvent::OnPeerConnectionStateChange(new_state));
    }

    fn update_signaling_state_change(&mut self, new_state: RTCSignalingState) {
        self.signaling_state = new_state;
        self.events
            .push_back(PeerConnectionEvent::OnSignalingStateChange(new_state));
    }

    fn update_ice_connection_state_change(&mut self, new_state: RTCIceConnectionState) {
        self.ice_connection_state = new_state;
        self.events
            .push_back(PeerConnectionEvent::OnIceConnectionStateChange(new_state));
    }

    /// get_configuration returns a Configuration object representing the current
    /// configuration of this PeerConnection object. The returned object is a
    /// copy and direct mutation on it will not take affect until set_configuration
    /// has been called with Configuration passed as its only argument.
    /// <https://www.w3.org/TR/webrtc/#dom-rtcpeerconnection-getconfiguration>
    pub fn get_configuration(&self) -> &RTCConfiguration {
        &self.configuration
    }

    pub fn get_stats_id(&self) -> &str {
        self.stats_id.as_str()
    }

}
