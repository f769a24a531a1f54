use std::fmt;

/// Direction is a marker for "a=sendrecv", "a=sendonly", "a=recvonly" and
/// "a=inactive", as well as the equivalent direction carried by an `a=extmap`
/// attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Unspecified,
    SendRecv,
    SendOnly,
    RecvOnly,
    Inactive,
}

const DIR_SEND_RECV: &str = "sendrecv";
const DIR_SEND_ONLY: &str = "sendonly";
const DIR_RECV_ONLY: &str = "recvonly";
const DIR_INACTIVE: &str = "inactive";

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::SendRecv => DIR_SEND_RECV,
            Direction::SendOnly => DIR_SEND_ONLY,
            Direction::RecvOnly => DIR_RECV_ONLY,
            Direction::Inactive => DIR_INACTIVE,
            Direction::Unspecified => "unspecified",
        };
        write!(f, "{s}")
    }
}

impl From<&str> for Direction {
    fn from(raw: &str) -> Self {
        match raw {
            DIR_SEND_RECV => Direction::SendRecv,
            DIR_SEND_ONLY => Direction::SendOnly,
            DIR_RECV_ONLY => Direction::RecvOnly,
            DIR_INACTIVE => Direction::Inactive,
            _ => Direction::Unspecified,
        }
    }
}

impl Direction {
    /// Returns the direction as seen from the other side of the connection,
    /// e.g. `SendOnly` becomes `RecvOnly`.
    pub fn reverse(&self) -> Direction {
        match self {
            Direction::SendOnly => Direction::RecvOnly,
            Direction::RecvOnly => Direction::SendOnly,
            d => *d,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reverse_flips_only_asymmetric_directions() {
        assert_eq!(Direction::SendOnly.reverse(), Direction::RecvOnly);
        assert_eq!(Direction::RecvOnly.reverse(), Direction::SendOnly);
        assert_eq!(Direction::SendRecv.reverse(), Direction::SendRecv);
        assert_eq!(Direction::Inactive.reverse(), Direction::Inactive);
    }

    #[test]
    fn from_str_round_trips() {
        for d in [
            Direction::SendRecv,
            Direction::SendOnly,
            Direction::RecvOnly,
            Direction::Inactive,
        ] {
            assert_eq!(Direction::from(d.to_string().as_str()), d);
        }
    }
}
