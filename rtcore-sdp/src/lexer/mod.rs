//! Line-oriented unmarshaling of the SDP grammar (RFC8866 section 5).
//!
//! SDP is a strictly ordered sequence of `<type>=<value>` lines. Session-level
//! fields must appear before the first `m=` line; once an `m=` line is seen,
//! every subsequent `c=`/`b=`/`k=`/`a=` line belongs to that media section
//! until the next `m=` line starts a new one.

use shared::error::{Error, Result};
use url::Url;

use crate::description::common::{Attribute, Bandwidth, EncryptionKey};
use crate::description::media::{MediaDescription, MediaName, RangedPort};
use crate::description::session::{
    Address, ConnectionInformation, Origin, RepeatTime, SessionDescription, TimeDescription,
    Timing, TimeZone,
};

struct Line<'a> {
    key: char,
    value: &'a str,
}

fn parse_line(raw: &str) -> Result<Line<'_>> {
    let raw = raw.trim_end_matches(['\r', '\n']);
    let mut chars = raw.chars();
    let key = chars
        .next()
        .ok_or_else(|| Error::SdpInvalidSyntax("empty line".to_owned()))?;
    let rest = &raw[key.len_utf8()..];
    let value = rest
        .strip_prefix('=')
        .ok_or_else(|| Error::SdpInvalidSyntax(format!("missing '=' in line: {raw}")))?;
    Ok(Line { key, value })
}

fn parse_attribute(raw: &str) -> Attribute {
    match raw.split_once(':') {
        Some((key, value)) => Attribute::new(key.to_owned(), Some(value.to_owned())),
        None => Attribute::new(raw.to_owned(), None),
    }
}

fn parse_bandwidth(raw: &str) -> Result<Bandwidth> {
    let (bwtype, bandwidth) = raw
        .split_once(':')
        .ok_or_else(|| Error::SdpInvalidSyntax(format!("malformed bandwidth line: {raw}")))?;
    let (experimental, bandwidth_type) = match bwtype.strip_prefix("X-") {
        Some(rest) => (true, rest.to_owned()),
        None => (false, bwtype.to_owned()),
    };
    let bandwidth = bandwidth
        .parse::<u64>()
        .map_err(|_| Error::SdpInvalidValue(format!("bandwidth value: {bandwidth}")))?;
    Ok(Bandwidth {
        experimental,
        bandwidth_type,
        bandwidth,
    })
}

fn parse_origin(raw: &str) -> Result<Origin> {
    let fields: Vec<&str> = raw.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(Error::SdpInvalidSyntax(format!("malformed origin: {raw}")));
    }
    Ok(Origin {
        username: fields[0].to_owned(),
        session_id: fields[1]
            .parse()
            .map_err(|_| Error::SdpInvalidValue(format!("session_id: {}", fields[1])))?,
        session_version: fields[2]
            .parse()
            .map_err(|_| Error::SdpInvalidValue(format!("session_version: {}", fields[2])))?,
        network_type: fields[3].to_owned(),
        address_type: fields[4].to_owned(),
        unicast_address: fields[5].to_owned(),
    })
}

fn parse_connection_information(raw: &str) -> Result<ConnectionInformation> {
    let fields: Vec<&str> = raw.split_whitespace().collect();
    if fields.len() < 2 {
        return Err(Error::SdpInvalidSyntax(format!(
            "malformed connection line: {raw}"
        )));
    }
    let address = if fields.len() > 2 {
        let parts: Vec<&str> = fields[2].split('/').collect();
        Some(Address {
            address: parts[0].to_owned(),
            ttl: parts.get(1).and_then(|v| v.parse().ok()),
            range: parts.get(2).and_then(|v| v.parse().ok()),
        })
    } else {
        None
    };
    Ok(ConnectionInformation {
        network_type: fields[0].to_owned(),
        address_type: fields[1].to_owned(),
        address,
    })
}

fn parse_timing(raw: &str) -> Result<Timing> {
    let fields: Vec<&str> = raw.split_whitespace().collect();
    if fields.len() != 2 {
        return Err(Error::SdpInvalidSyntax(format!("malformed timing: {raw}")));
    }
    Ok(Timing {
        start_time: fields[0]
            .parse()
            .map_err(|_| Error::SdpInvalidValue(format!("start_time: {}", fields[0])))?,
        stop_time: fields[1]
            .parse()
            .map_err(|_| Error::SdpInvalidValue(format!("stop_time: {}", fields[1])))?,
    })
}

fn parse_repeat_time(raw: &str) -> Result<RepeatTime> {
    let fields: Vec<&str> = raw.split_whitespace().collect();
    if fields.len() < 2 {
        return Err(Error::SdpInvalidSyntax(format!("malformed repeat: {raw}")));
    }
    let parse_num = |s: &str| {
        s.parse::<i64>()
            .map_err(|_| Error::SdpInvalidValue(format!("repeat field: {s}")))
    };
    let mut offsets = Vec::with_capacity(fields.len().saturating_sub(2));
    for f in &fields[2..] {
        offsets.push(parse_num(f)?);
    }
    Ok(RepeatTime {
        interval: parse_num(fields[0])?,
        duration: parse_num(fields[1])?,
        offsets,
    })
}

fn parse_time_zones(raw: &str) -> Result<Vec<TimeZone>> {
    let fields: Vec<&str> = raw.split_whitespace().collect();
    if fields.len() % 2 != 0 {
        return Err(Error::SdpInvalidSyntax(format!(
            "malformed time zone line: {raw}"
        )));
    }
    let mut zones = Vec::with_capacity(fields.len() / 2);
    for pair in fields.chunks_exact(2) {
        zones.push(TimeZone {
            adjustment_time: pair[0]
                .parse()
                .map_err(|_| Error::SdpInvalidValue(format!("adjustment_time: {}", pair[0])))?,
            offset: pair[1]
                .parse()
                .map_err(|_| Error::SdpInvalidValue(format!("zone offset: {}", pair[1])))?,
        });
    }
    Ok(zones)
}

fn parse_encryption_key(raw: &str) -> EncryptionKey {
    match raw.split_once(':') {
        Some((method, value)) => EncryptionKey {
            method: method.to_owned(),
            value: Some(value.to_owned()),
        },
        None => EncryptionKey {
            method: raw.to_owned(),
            value: None,
        },
    }
}

fn parse_media_name(raw: &str) -> Result<MediaName> {
    let fields: Vec<&str> = raw.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(Error::SdpInvalidSyntax(format!(
            "malformed media line: {raw}"
        )));
    }
    let port = match fields[1].split_once('/') {
        Some((value, range)) => RangedPort {
            value: value
                .parse()
                .map_err(|_| Error::SdpInvalidValue(format!("media port: {value}")))?,
            range: Some(
                range
                    .parse()
                    .map_err(|_| Error::SdpInvalidValue(format!("media port range: {range}")))?,
            ),
        },
        None => RangedPort {
            value: fields[1]
                .parse()
                .map_err(|_| Error::SdpInvalidValue(format!("media port: {}", fields[1])))?,
            range: None,
        },
    };
    Ok(MediaName {
        media: fields[0].to_owned(),
        port,
        protos: fields[2].split('/').map(str::to_owned).collect(),
        formats: fields[3..].iter().map(|s| s.to_string()).collect(),
    })
}

/// Parses a full SDP message into a [`SessionDescription`].
pub(crate) fn unmarshal(raw: &str) -> Result<SessionDescription> {
    let mut sd = SessionDescription::new();
    let mut current_media: Option<MediaDescription> = None;
    let mut current_time: Option<TimeDescription> = None;

    let flush_media = |sd: &mut SessionDescription, media: &mut Option<MediaDescription>| {
        if let Some(md) = media.take() {
            sd.media_descriptions.push(md);
        }
    };
    let flush_time = |sd: &mut SessionDescription, time: &mut Option<TimeDescription>| {
        if let Some(td) = time.take() {
            sd.time_descriptions.push(td);
        }
    };

    for raw_line in raw.split('\n') {
        let raw_line = raw_line.trim_end_matches('\r');
        if raw_line.is_empty() {
            continue;
        }
        let line = parse_line(raw_line)?;

        if line.key == 'm' {
            flush_time(&mut sd, &mut current_time);
            flush_media(&mut sd, &mut current_media);
            current_media = Some(MediaDescription {
                media_name: parse_media_name(line.value)?,
                ..Default::default()
            });
            continue;
        }

        if let Some(md) = current_media.as_mut() {
            match line.key {
                'i' => md.media_title = Some(line.value.to_owned()),
                'c' => md.connection_information = Some(parse_connection_information(line.value)?),
                'b' => md.bandwidth.push(parse_bandwidth(line.value)?),
                'k' => md.encryption_key = Some(parse_encryption_key(line.value)),
                'a' => md.attributes.push(parse_attribute(line.value)),
                _ => {
                    return Err(Error::SdpInvalidSyntax(format!(
                        "unexpected line in media section: {raw_line}"
                    )));
                }
            }
            continue;
        }

        match line.key {
            'v' => {
                sd.version = line
                    .value
                    .parse()
                    .map_err(|_| Error::SdpInvalidValue(format!("version: {}", line.value)))?;
            }
            'o' => sd.origin = parse_origin(line.value)?,
            's' => sd.session_name = line.value.to_owned(),
            'i' => sd.session_information = Some(line.value.to_owned()),
            'u' => {
                sd.uri = Some(
                    Url::parse(line.value)
                        .map_err(|_| Error::SdpInvalidValue(format!("uri: {}", line.value)))?,
                )
            }
            'e' => sd.email_address = Some(line.value.to_owned()),
            'p' => sd.phone_number = Some(line.value.to_owned()),
            'c' => sd.connection_information = Some(parse_connection_information(line.value)?),
            'b' => sd.bandwidth.push(parse_bandwidth(line.value)?),
            't' => {
                flush_time(&mut sd, &mut current_time);
                current_time = Some(TimeDescription {
                    timing: parse_timing(line.value)?,
                    repeat_times: vec![],
                });
            }
            'r' => {
                let rt = parse_repeat_time(line.value)?;
                match current_time.as_mut() {
                    Some(td) => td.repeat_times.push(rt),
                    None => {
                        return Err(Error::SdpInvalidSyntax(
                            "r= line without preceding t= line".to_owned(),
                        ));
                    }
                }
            }
            'z' => sd.time_zones = parse_time_zones(line.value)?,
            'k' => sd.encryption_key = Some(parse_encryption_key(line.value)),
            'a' => sd.attributes.push(parse_attribute(line.value)),
            _ => {
                return Err(Error::SdpInvalidSyntax(format!(
                    "unexpected session-level line: {raw_line}"
                )));
            }
        }
    }

    flush_time(&mut sd, &mut current_time);
    flush_media(&mut sd, &mut current_media);

    if sd.time_descriptions.is_empty() {
        return Err(Error::SdpEmptyTimeDescription);
    }

    Ok(sd)
}

#[cfg(test)]
mod test {
    use super::*;

    const SAMPLE: &str = "v=0\r\n\
o=- 4611731400430051336 2 IN IP4 127.0.0.1\r\n\
s=-\r\n\
t=0 0\r\n\
a=group:BUNDLE 0\r\n\
m=audio 9 UDP/TLS/RTP/SAVPF 111\r\n\
c=IN IP4 0.0.0.0\r\n\
a=mid:0\r\n\
a=ice-ufrag:abcd\r\n\
a=ice-pwd:efghijklmnopqrstuvwxyz01\r\n\
a=fingerprint:sha-256 AA:BB:CC\r\n\
a=sendrecv\r\n\
a=rtpmap:111 opus/48000/2\r\n";

    #[test]
    fn unmarshal_parses_session_and_media_sections() {
        let sd = unmarshal(SAMPLE).unwrap();
        assert_eq!(sd.version, 0);
        assert_eq!(sd.origin.session_id, 4611731400430051336);
        assert_eq!(sd.session_name, "-");
        assert_eq!(sd.attribute("group"), Some(Some("BUNDLE 0")));
        assert_eq!(sd.media_descriptions.len(), 1);

        let media = &sd.media_descriptions[0];
        assert_eq!(media.media_name.media, "audio");
        assert_eq!(media.media_name.port.value, 9);
        assert_eq!(media.media_name.formats, vec!["111"]);
        assert_eq!(media.attribute("mid"), Some(Some("0")));
        assert_eq!(media.attribute("sendrecv"), Some(None));
        assert_eq!(
            media.attribute("ice-ufrag"),
            Some(Some("abcd"))
        );
    }

    #[test]
    fn unmarshal_then_marshal_round_trips_key_fields() {
        let sd = unmarshal(SAMPLE).unwrap();
        let remarshaled = sd.marshal();
        let reparsed = unmarshal(&remarshaled).unwrap();
        assert_eq!(sd.origin, reparsed.origin);
        assert_eq!(sd.media_descriptions, reparsed.media_descriptions);
    }

    #[test]
    fn unmarshal_rejects_missing_time_description() {
        let no_timing = "v=0\r\no=- 1 1 IN IP4 127.0.0.1\r\ns=-\r\n";
        assert!(unmarshal(no_timing).is_err());
    }
}
