use std::fmt;

/// TcpType is the type of ICE TCP candidate, as carried on the `tcptype`
/// SDP extension (RFC6544 section 4.5).
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TcpType {
    #[default]
    Unspecified,
    Active,
    Passive,
    SimultaneousOpen,
}

impl From<&str> for TcpType {
    fn from(raw: &str) -> Self {
        match raw {
            "active" => TcpType::Active,
            "passive" => TcpType::Passive,
            "so" => TcpType::SimultaneousOpen,
            _ => TcpType::Unspecified,
        }
    }
}

impl fmt::Display for TcpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TcpType::Active => "active",
            TcpType::Passive => "passive",
            TcpType::SimultaneousOpen => "so",
            TcpType::Unspecified => "unspecified",
        };
        write!(f, "{s}")
    }
}
