pub mod session_description;
pub mod sdp_type;

use std::collections::HashMap;

use sdp::description::media::MediaDescription;
use sdp::description::session::{ATTR_KEY_EXTMAP, ATTR_KEY_FMTP, ATTR_KEY_RTCPFB, ATTR_KEY_RTPMAP};
use sdp::extmap::ExtMap;
use shared::error::Result;

use crate::rtp_transceiver::PayloadType;
use crate::rtp_transceiver::rtp_sender::rtcp_parameters::RTCPFeedback;
use crate::rtp_transceiver::rtp_sender::rtp_codec::RTCRtpCodec;
use crate::rtp_transceiver::rtp_sender::rtp_codec_parameters::RTCRtpCodecParameters;

/// Parses the `a=rtpmap:<pt> <name>/<clockrate>[/<channels>]` line for `payload_type`,
/// returning the codec name, clock rate and channel count.
fn parse_rtpmap(media: &MediaDescription, payload_type: PayloadType) -> Option<(String, u32, u16)> {
    let prefix = format!("{payload_type} ");
    for attr in media.attributes(ATTR_KEY_RTPMAP) {
        let value = attr.value.as_deref()?;
        let rest = value.strip_prefix(&prefix)?;
        let mut parts = rest.splitn(2, '/');
        let name = parts.next()?.to_string();
        let mut clock_and_channels = parts.next()?.splitn(2, '/');
        let clock_rate = clock_and_channels.next()?.parse::<u32>().ok()?;
        let channels = clock_and_channels
            .next()
            .and_then(|c| c.parse::<u16>().ok())
            .unwrap_or(0);
        return Some((name, clock_rate, channels));
    }
    None
}

fn parse_fmtp(media: &MediaDescription, payload_type: PayloadType) -> String {
    let prefix = format!("{payload_type} ");
    for attr in media.attributes(ATTR_KEY_FMTP) {
        if let Some(value) = attr.value.as_deref() {
            if let Some(rest) = value.strip_prefix(&prefix) {
                return rest.to_string();
            }
        }
    }
    String::new()
}

fn parse_rtcp_feedback(media: &MediaDescription, payload_type: PayloadType) -> Vec<RTCPFeedback> {
    let prefix = format!("{payload_type} ");
    let mut out = vec![];
    for attr in media.attributes(ATTR_KEY_RTCPFB) {
        let Some(value) = attr.value.as_deref() else {
            continue;
        };
        let Some(rest) = value.strip_prefix(&prefix) else {
            continue;
        };

        let split: Vec<&str> = rest.splitn(2, ' ').collect();
        let entry = if split.len() == 2 {
            RTCPFeedback {
                typ: split[0].to_string(),
                parameter: split[1].to_string(),
            }
        } else {
            RTCPFeedback {
                typ: split[0].to_string(),
                parameter: String::new(),
            }
        };
        out.push(entry);
    }
    out
}

/// Builds the list of RTP codec parameters negotiated in a single `m=` section,
/// by matching each payload type in the format list against its `rtpmap`/`fmtp`/`rtcp-fb`
/// attributes.
pub(crate) fn codecs_from_media_description(
    m: &MediaDescription,
) -> Result<Vec<RTCRtpCodecParameters>> {
    let mut out = vec![];

    for payload_str in &m.media_name.formats {
        let payload_type: PayloadType = match payload_str.parse::<u8>() {
            Ok(pt) => pt,
            Err(_) => continue,
        };

        let Some((name, clock_rate, channels)) = parse_rtpmap(m, payload_type) else {
            continue;
        };

        out.push(RTCRtpCodecParameters {
            rtp_codec: RTCRtpCodec {
                mime_type: format!("{}/{}", m.media_name.media, name),
                clock_rate,
                channels,
                sdp_fmtp_line: parse_fmtp(m, payload_type),
                rtcp_feedback: parse_rtcp_feedback(m, payload_type),
            },
            payload_type,
        })
    }

    Ok(out)
}

/// Collects the `a=extmap` header extension URIs declared in a single `m=` section,
/// keyed by URI with their negotiated extension id.
pub(crate) fn rtp_extensions_from_media_description(
    m: &MediaDescription,
) -> Result<HashMap<String, isize>> {
    let mut out = HashMap::new();

    for attr in m.attributes(ATTR_KEY_EXTMAP) {
        let Some(value) = attr.value.as_deref() else {
            continue;
        };
        let e = ExtMap::unmarshal(value)?;
        if let Some(uri) = e.uri {
            out.insert(uri, e.value);
        }
    }

    Ok(out)
}
