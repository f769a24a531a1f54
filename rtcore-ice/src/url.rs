use std::fmt;

use shared::error::Result;
pub use stun::uri::{ProtoType, SchemeType};

/// A STUN/TURN server URL, as accepted in `AgentConfig::urls`. Parsing is
/// delegated to the shared STUN URI grammar (RFC7064/RFC7065); `username`
/// and `password` carry TURN long-term credentials when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    pub scheme: SchemeType,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub proto: ProtoType,
}

impl Default for Url {
    fn default() -> Self {
        let u = stun::uri::Uri::default();
        Url {
            scheme: u.scheme,
            host: u.host,
            port: u.port,
            username: u.username,
            password: u.password,
            proto: u.proto,
        }
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.scheme, self.host, self.port)
    }
}

impl Url {
    /// Parses a STUN/TURN URI of the form
    /// `scheme:host[:port][?transport=udp|tcp]`.
    pub fn parse_url(raw: &str) -> Result<Self> {
        let u = stun::uri::Uri::parse_url(raw)?;
        Ok(Url {
            scheme: u.scheme,
            host: u.host,
            port: u.port,
            username: u.username,
            password: u.password,
            proto: u.proto,
        })
    }

    pub fn is_secure(&self) -> bool {
        matches!(self.scheme, SchemeType::Stuns | SchemeType::Turns)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_stun_url() {
        let u = Url::parse_url("stun:stun.example.com:3478").unwrap();
        assert_eq!(u.scheme, SchemeType::Stun);
        assert_eq!(u.host, "stun.example.com");
        assert_eq!(u.port, 3478);
        assert!(!u.is_secure());
    }

    #[test]
    fn parses_turns_url_as_secure() {
        let u = Url::parse_url("turns:turn.example.com:5349?transport=tcp").unwrap();
        assert!(u.is_secure());
        assert_eq!(u.proto, ProtoType::Tcp);
    }
}
