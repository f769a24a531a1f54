use std::fmt;

use shared::error::{Error, Result};

use crate::direction::Direction;

/// `urn:ietf:params:rtp-hdrext:ssrc-audio-level` — RFC6464
pub const AUDIO_LEVEL_URI: &str = "urn:ietf:params:rtp-hdrext:ssrc-audio-level";
/// `http://www.webrtc.org/experiments/rtp-hdrext/abs-send-time`
pub const ABS_SEND_TIME_URI: &str = "http://www.webrtc.org/experiments/rtp-hdrext/abs-send-time";
/// transport-wide congestion control sequence number
pub const TRANSPORT_CC_URI: &str =
    "http://www.ietf.org/id/draft-holmer-rmcat-transport-wide-cc-extensions-01";
/// `urn:ietf:params:rtp-hdrext:sdes:mid` — RFC8843
pub const SDES_MID_URI: &str = "urn:ietf:params:rtp-hdrext:sdes:mid";
/// `urn:ietf:params:rtp-hdrext:sdes:rtp-stream-id` — simulcast RID
pub const SDES_RTP_STREAM_ID_URI: &str = "urn:ietf:params:rtp-hdrext:sdes:rtp-stream-id";
/// `urn:ietf:params:rtp-hdrext:sdes:repaired-rtp-stream-id` — simulcast RTX RID
pub const SDES_REPAIR_RTP_STREAM_ID_URI: &str =
    "urn:ietf:params:rtp-hdrext:sdes:repaired-rtp-stream-id";
/// `urn:3gpp:video-orientation`
pub const VIDEO_ORIENTATION_URI: &str = "urn:3gpp:video-orientation";

/// ExtMap represents the `a=extmap` attribute described in RFC8285.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtMap {
    pub value: isize,
    pub direction: Direction,
    pub uri: Option<String>,
    pub ext_attr: Option<String>,
}

impl fmt::Display for ExtMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut output = format!("{}", self.value);
        if self.direction != Direction::Unspecified {
            output += &format!("/{}", self.direction);
        }
        if let Some(uri) = &self.uri {
            output += &format!(" {uri}");
        }
        if let Some(ext_attr) = &self.ext_attr {
            output += &format!(" {ext_attr}");
        }
        write!(f, "{output}")
    }
}

impl ExtMap {
    /// Parses the value of an `a=extmap` line, i.e. everything after `extmap:`.
    pub fn unmarshal(raw: &str) -> Result<Self> {
        let fields: Vec<&str> = raw.split_whitespace().collect();
        if fields.len() < 2 {
            return Err(Error::SdpInvalidSyntax(format!(
                "extmap has too few fields: {raw}"
            )));
        }

        let (value_dir, uri) = (fields[0], fields[1]);
        let (value_raw, dir_raw) = match value_dir.split_once('/') {
            Some((v, d)) => (v, Direction::from(d)),
            None => (value_dir, Direction::Unspecified),
        };
        let value = value_raw
            .parse::<isize>()
            .map_err(|_| Error::SdpInvalidValue(format!("extmap value: {value_raw}")))?;
        if !(1..=246).contains(&value) {
            return Err(Error::SdpInvalidValue(format!(
                "extmap value must be in [1, 246]: {value}"
            )));
        }

        let ext_attr = if fields.len() > 2 {
            Some(fields[2..].join(" "))
        } else {
            None
        };

        Ok(ExtMap {
            value,
            direction: dir_raw,
            uri: Some(uri.to_owned()),
            ext_attr,
        })
    }

    pub fn marshal(&self) -> String {
        format!("extmap:{self}")
    }
}
