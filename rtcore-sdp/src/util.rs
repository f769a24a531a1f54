use std::fmt;

use shared::error::{Error, Result};

/// ConnectionRole indicates which of the end points should initiate the DTLS
/// connection establishment, as described in RFC4145 and RFC5763.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionRole {
    #[default]
    Unspecified = 0,
    Active = 1,
    Passive = 2,
    Actpass = 3,
    Holdconn = 4,
}

impl fmt::Display for ConnectionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionRole::Active => "active",
            ConnectionRole::Passive => "passive",
            ConnectionRole::Actpass => "actpass",
            ConnectionRole::Holdconn => "holdconn",
            ConnectionRole::Unspecified => "unspecified",
        };
        write!(f, "{s}")
    }
}

impl From<&str> for ConnectionRole {
    fn from(raw: &str) -> Self {
        match raw {
            "active" => ConnectionRole::Active,
            "passive" => ConnectionRole::Passive,
            "actpass" => ConnectionRole::Actpass,
            "holdconn" => ConnectionRole::Holdconn,
            _ => ConnectionRole::Unspecified,
        }
    }
}

/// Parses a ranged port of the form "<port>" or "<port>/<count>".
pub(crate) fn parse_port(raw: &str) -> Result<u16> {
    raw.parse::<u16>()
        .map_err(|_| Error::SdpInvalidValue(format!("invalid port: {raw}")))
}

/// Splits the first whitespace-delimited field from the remainder of a line,
/// mirroring the relaxed tokenizing the SDP grammar uses for most attributes.
pub(crate) fn split_field(raw: &str) -> (&str, &str) {
    match raw.find(char::is_whitespace) {
        Some(idx) => {
            let (head, tail) = raw.split_at(idx);
            (head, tail.trim_start())
        }
        None => (raw, ""),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn connection_role_round_trips() {
        for (s, role) in [
            ("active", ConnectionRole::Active),
            ("passive", ConnectionRole::Passive),
            ("actpass", ConnectionRole::Actpass),
            ("holdconn", ConnectionRole::Holdconn),
        ] {
            assert_eq!(ConnectionRole::from(s), role);
            assert_eq!(role.to_string(), s);
        }
    }

    #[test]
    fn split_field_splits_on_first_whitespace() {
        assert_eq!(split_field("audio 9 UDP/TLS/RTP/SAVPF 111"), ("audio", "9 UDP/TLS/RTP/SAVPF 111"));
        assert_eq!(split_field("novalue"), ("novalue", ""));
    }
}
