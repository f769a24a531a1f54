use std::fmt;

use url::Url;

use super::common::{Attribute, Bandwidth, EncryptionKey};
use super::media::MediaDescription;

pub const ATTR_KEY_CANDIDATE: &str = "candidate";
pub const ATTR_KEY_END_OF_CANDIDATES: &str = "end-of-candidates";
pub const ATTR_KEY_ICELITE: &str = "ice-lite";
pub const ATTR_KEY_ICE2: &str = "ice2";
pub const ATTR_KEY_ICEOPTIONS: &str = "ice-options";
pub const ATTR_KEY_ICEUFRAG: &str = "ice-ufrag";
pub const ATTR_KEY_ICEPWD: &str = "ice-pwd";
pub const ATTR_KEY_FINGERPRINT: &str = "fingerprint";
pub const ATTR_KEY_SETUP: &str = "setup";
pub const ATTR_KEY_MID: &str = "mid";
pub const ATTR_KEY_GROUP: &str = "group";
pub const ATTR_KEY_RTPMAP: &str = "rtpmap";
pub const ATTR_KEY_FMTP: &str = "fmtp";
pub const ATTR_KEY_RTCPFB: &str = "rtcp-fb";
pub const ATTR_KEY_RTCPMUX: &str = "rtcp-mux";
pub const ATTR_KEY_RTCPRSIZE: &str = "rtcp-rsize";
pub const ATTR_KEY_SSRC: &str = "ssrc";
pub const ATTR_KEY_SSRCGROUP: &str = "ssrc-group";
pub const ATTR_KEY_EXTMAP: &str = "extmap";
pub const ATTR_KEY_EXTMAP_ALLOW_MIXED: &str = "extmap-allow-mixed";
pub const ATTR_KEY_SENDRECV: &str = "sendrecv";
pub const ATTR_KEY_SENDONLY: &str = "sendonly";
pub const ATTR_KEY_RECVONLY: &str = "recvonly";
pub const ATTR_KEY_INACTIVE: &str = "inactive";
pub const ATTR_KEY_IDENTITY: &str = "identity";
pub const ATTR_KEY_MSID: &str = "msid";
pub const ATTR_KEY_CONNECTION_SETUP: &str = ATTR_KEY_SETUP;

/// Origin describes the `o=<username> <sess-id> <sess-version> <nettype>
/// <addrtype> <unicast-address>` line (RFC8866 5.2).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Origin {
    pub username: String,
    pub session_id: u64,
    pub session_version: u64,
    pub network_type: String,
    pub address_type: String,
    pub unicast_address: String,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            if self.username.is_empty() {
                "-"
            } else {
                self.username.as_str()
            },
            self.session_id,
            self.session_version,
            self.network_type,
            self.address_type,
            self.unicast_address
        )
    }
}

/// Address describes a `c=` connection-address, possibly carrying a TTL or
/// multicast range suffix (`<base>/<ttl>[/<num addrs>]`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub address: String,
    pub ttl: Option<u8>,
    pub range: Option<u8>,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)?;
        if let Some(ttl) = self.ttl {
            write!(f, "/{ttl}")?;
        }
        if let Some(range) = self.range {
            write!(f, "/{range}")?;
        }
        Ok(())
    }
}

/// ConnectionInformation describes the `c=<nettype> <addrtype>
/// <connection-address>` line (RFC8866 5.7).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionInformation {
    pub network_type: String,
    pub address_type: String,
    pub address: Option<Address>,
}

impl fmt::Display for ConnectionInformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.network_type, self.address_type)?;
        if let Some(address) = &self.address {
            write!(f, " {address}")?;
        }
        Ok(())
    }
}

/// Timing describes the `t=<start-time> <stop-time>` line (RFC8866 5.9).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timing {
    pub start_time: u64,
    pub stop_time: u64,
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.start_time, self.stop_time)
    }
}

/// RepeatTime describes a `r=<interval> <duration> <offsets>` line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepeatTime {
    pub interval: i64,
    pub duration: i64,
    pub offsets: Vec<i64>,
}

impl fmt::Display for RepeatTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.interval, self.duration)?;
        for offset in &self.offsets {
            write!(f, " {offset}")?;
        }
        Ok(())
    }
}

/// TimeDescription groups a `t=` line with any `r=` lines that follow it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeDescription {
    pub timing: Timing,
    pub repeat_times: Vec<RepeatTime>,
}

/// TimeZone describes one `<adjustment time> <offset>` pair of a `z=` line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeZone {
    pub adjustment_time: u64,
    pub offset: i64,
}

/// SessionDescription is the top level description carried by SDP offers and
/// answers, as well as (unusually for WebRTC) `a=` trickle-ICE fragments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionDescription {
    pub version: u64,
    pub origin: Origin,
    pub session_name: String,
    pub session_information: Option<String>,
    pub uri: Option<Url>,
    pub email_address: Option<String>,
    pub phone_number: Option<String>,
    pub connection_information: Option<ConnectionInformation>,
    pub bandwidth: Vec<Bandwidth>,
    pub time_descriptions: Vec<TimeDescription>,
    pub time_zones: Vec<TimeZone>,
    pub encryption_key: Option<EncryptionKey>,
    pub attributes: Vec<Attribute>,
    pub media_descriptions: Vec<MediaDescription>,
}

impl SessionDescription {
    pub fn new() -> Self {
        SessionDescription {
            version: 0,
            ..Default::default()
        }
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_session_name(mut self, name: String) -> Self {
        self.session_name = name;
        self
    }

    pub fn with_property_attribute(mut self, key: String) -> Self {
        self.attributes.push(Attribute::new(key, None));
        self
    }

    pub fn with_value_attribute(mut self, key: String, value: String) -> Self {
        self.attributes.push(Attribute::new(key, Some(value)));
        self
    }

    pub fn with_media(mut self, md: MediaDescription) -> Self {
        self.media_descriptions.push(md);
        self
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.time_descriptions.push(TimeDescription {
            timing,
            repeat_times: vec![],
        });
        self
    }

    /// Returns the value of the first session-level attribute matching `key`.
    /// `Some(None)` means the attribute is present but has no value (e.g.
    /// `a=recvonly`); `None` means the attribute was not found at all.
    pub fn attribute(&self, key: &str) -> Option<Option<&str>> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_deref())
    }

    /// Returns every value of session-level attributes matching `key`, in
    /// document order. Used for attributes like `a=group` that may repeat.
    pub fn attributes(&self, key: &str) -> Vec<&Attribute> {
        self.attributes.iter().filter(|a| a.key == key).collect()
    }

    pub fn marshal(&self) -> String {
        let mut s = String::new();
        s += &format!("v={}\r\n", self.version);
        s += &format!("o={}\r\n", self.origin);
        s += &format!(
            "s={}\r\n",
            if self.session_name.is_empty() {
                " "
            } else {
                self.session_name.as_str()
            }
        );

        if let Some(i) = &self.session_information {
            s += &format!("i={i}\r\n");
        }
        if let Some(u) = &self.uri {
            s += &format!("u={u}\r\n");
        }
        if let Some(e) = &self.email_address {
            s += &format!("e={e}\r\n");
        }
        if let Some(p) = &self.phone_number {
            s += &format!("p={p}\r\n");
        }
        if let Some(c) = &self.connection_information {
            s += &format!("c={c}\r\n");
        }
        for b in &self.bandwidth {
            s += &format!("b={b}\r\n");
        }
        if self.time_descriptions.is_empty() {
            s += "t=0 0\r\n";
        }
        for td in &self.time_descriptions {
            s += &format!("t={}\r\n", td.timing);
            for rt in &td.repeat_times {
                s += &format!("r={rt}\r\n");
            }
        }
        if !self.time_zones.is_empty() {
            let zones: Vec<String> = self
                .time_zones
                .iter()
                .map(|z| format!("{} {}", z.adjustment_time, z.offset))
                .collect();
            s += &format!("z={}\r\n", zones.join(" "));
        }
        if let Some(k) = &self.encryption_key {
            s += &format!("k={k}\r\n");
        }
        for a in &self.attributes {
            s += &format!("a={a}\r\n");
        }
        for md in &self.media_descriptions {
            s += &md.marshal();
        }
        s
    }

    pub fn unmarshal(raw: &str) -> shared::error::Result<Self> {
        crate::lexer::unmarshal(raw)
    }
}
