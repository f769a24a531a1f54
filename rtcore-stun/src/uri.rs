use std::fmt;

use shared::error::{Error, Result};

use crate::{DEFAULT_PORT, DEFAULT_TLS_PORT};

/// `SchemeType` is the scheme portion of a STUN/TURN URI, as defined by
/// RFC7064 (`stun`/`stuns`) and RFC7065 (`turn`/`turns`).
#[derive(PartialEq, Eq, Debug, Copy, Clone, Default)]
pub enum SchemeType {
    #[default]
    Stun,
    Stuns,
    Turn,
    Turns,
}

impl fmt::Display for SchemeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SchemeType::Stun => "stun",
            SchemeType::Stuns => "stuns",
            SchemeType::Turn => "turn",
            SchemeType::Turns => "turns",
        };
        write!(f, "{s}")
    }
}

impl SchemeType {
    pub fn from_str(raw: &str) -> Result<Self> {
        match raw {
            "stun" => Ok(SchemeType::Stun),
            "stuns" => Ok(SchemeType::Stuns),
            "turn" => Ok(SchemeType::Turn),
            "turns" => Ok(SchemeType::Turns),
            _ => Err(Error::ErrSchemeType),
        }
    }
}

/// `ProtoType` is the `?transport=` query parameter of a STUN/TURN URI.
#[derive(PartialEq, Eq, Debug, Copy, Clone, Default)]
pub enum ProtoType {
    #[default]
    Udp,
    Tcp,
}

impl fmt::Display for ProtoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProtoType::Udp => "udp",
            ProtoType::Tcp => "tcp",
        };
        write!(f, "{s}")
    }
}

impl ProtoType {
    pub fn from_str(raw: &str) -> Result<Self> {
        match raw {
            "udp" => Ok(ProtoType::Udp),
            "tcp" => Ok(ProtoType::Tcp),
            _ => Err(Error::ErrUnsupportedNetwork),
        }
    }
}

/// `Uri` is a parsed STUN/TURN URI, as accepted in `RTCIceServer::urls`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uri {
    pub scheme: SchemeType,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub proto: ProtoType,
}

impl Default for Uri {
    fn default() -> Self {
        Uri {
            scheme: SchemeType::default(),
            host: String::new(),
            port: DEFAULT_PORT,
            username: String::new(),
            password: String::new(),
            proto: ProtoType::default(),
        }
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.scheme, self.host, self.port)
    }
}

impl Uri {
    /// Parses a STUN/TURN URI of the form
    /// `scheme:host[:port][?transport=udp|tcp]` (RFC7064/RFC7065). Query
    /// arguments other than `transport` are rejected, matching the
    /// restriction that these URIs never carry query strings beyond that.
    pub fn parse_url(raw: &str) -> Result<Self> {
        let (scheme_str, rest) = raw.split_once(':').ok_or(Error::ErrInvalidUrl)?;
        let scheme = SchemeType::from_str(scheme_str)?;

        let (host_port, query) = match rest.split_once('?') {
            Some((hp, q)) => (hp, Some(q)),
            None => (rest, None),
        };

        if host_port.is_empty() {
            return Err(Error::ErrHost);
        }

        let (host, port) = if let Some(idx) = host_port.rfind(':') {
            let (h, p) = host_port.split_at(idx);
            let p = &p[1..];
            let port: u16 = p.parse().map_err(|_| Error::ErrInvalidUrl)?;
            (h.to_owned(), port)
        } else {
            let default_port = match scheme {
                SchemeType::Stun | SchemeType::Turn => DEFAULT_PORT,
                SchemeType::Stuns | SchemeType::Turns => DEFAULT_TLS_PORT,
            };
            (host_port.to_owned(), default_port)
        };

        let mut proto = ProtoType::default();
        if let Some(q) = query {
            if scheme == SchemeType::Stun || scheme == SchemeType::Stuns {
                return Err(Error::ErrStunQuery);
            }
            for kv in q.split('&') {
                if let Some((k, v)) = kv.split_once('=') {
                    if k == "transport" {
                        proto = ProtoType::from_str(v)?;
                    }
                }
            }
        }

        Ok(Uri {
            scheme,
            host,
            port,
            username: String::new(),
            password: String::new(),
            proto,
        })
    }
}
