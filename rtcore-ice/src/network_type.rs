use std::fmt;
use std::net::IpAddr;

use shared::error::{Error, Result};
use shared::TransportProtocol;

/// NetworkType represents the type of network (address family + transport)
/// a candidate was gathered on.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NetworkType {
    #[default]
    Unspecified,
    Udp4,
    Udp6,
    Tcp4,
    Tcp6,
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NetworkType::Unspecified => "unspecified",
            NetworkType::Udp4 => "udp4",
            NetworkType::Udp6 => "udp6",
            NetworkType::Tcp4 => "tcp4",
            NetworkType::Tcp6 => "tcp6",
        };
        write!(f, "{s}")
    }
}

impl NetworkType {
    /// Returns true for the two UDP variants.
    pub fn is_udp(&self) -> bool {
        matches!(self, NetworkType::Udp4 | NetworkType::Udp6)
    }

    /// Returns true for the two TCP variants.
    pub fn is_tcp(&self) -> bool {
        matches!(self, NetworkType::Tcp4 | NetworkType::Tcp6)
    }

    /// Returns true for the two IPv4 variants.
    pub fn is_ipv4(&self) -> bool {
        matches!(self, NetworkType::Udp4 | NetworkType::Tcp4)
    }

    /// Returns true for the two IPv6 variants.
    pub fn is_ipv6(&self) -> bool {
        matches!(self, NetworkType::Udp6 | NetworkType::Tcp6)
    }

    /// Returns "udp" or "tcp", dropping the address family suffix; used when
    /// building SDP candidate lines.
    pub fn network_short(&self) -> &'static str {
        if self.is_tcp() {
            "tcp"
        } else {
            "udp"
        }
    }

    pub fn to_protocol(self) -> TransportProtocol {
        if self.is_tcp() {
            TransportProtocol::TCP
        } else {
            TransportProtocol::UDP
        }
    }
}

/// Determines the `NetworkType` for a given network name (`"udp"`/`"tcp"`)
/// and IP address, matching the family of the address to the requested
/// transport.
pub fn determine_network_type(network: &str, ip: &IpAddr) -> Result<NetworkType> {
    let network = network.to_lowercase();
    let is_tcp = match network.as_str() {
        "udp" | "udp4" | "udp6" => false,
        "tcp" | "tcp4" | "tcp6" => true,
        _ => return Err(Error::ErrUnsupportedNetwork),
    };

    Ok(match (is_tcp, ip.is_ipv4()) {
        (false, true) => NetworkType::Udp4,
        (false, false) => NetworkType::Udp6,
        (true, true) => NetworkType::Tcp4,
        (true, false) => NetworkType::Tcp6,
    })
}
