use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use shared::error::{Error, Result};

use crate::attributes::{AttrType, ATTR_ALTERNATE_SERVER, ATTR_MAPPED_ADDRESS};
use crate::message::{Getter, Message, Setter};

const FAMILY_IPV4: u16 = 0x01;
const FAMILY_IPV6: u16 = 0x02;

/// `MappedAddress` is the (non-XOR) MAPPED-ADDRESS attribute (RFC5389
/// section 15.1), also reused for ALTERNATE-SERVER (section 15.11).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedAddress {
    pub ip: IpAddr,
    pub port: u16,
}

impl Default for MappedAddress {
    fn default() -> Self {
        MappedAddress {
            ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 0,
        }
    }
}

impl MappedAddress {
    fn encode(&self) -> Vec<u8> {
        let mut value = vec![0u8, 0u8, 0u8, 0u8];
        value[2..4].copy_from_slice(&self.port.to_be_bytes());
        match self.ip {
            IpAddr::V4(v4) => {
                value[1] = FAMILY_IPV4 as u8;
                value.extend_from_slice(&v4.octets());
            }
            IpAddr::V6(v6) => {
                value[1] = FAMILY_IPV6 as u8;
                value.extend_from_slice(&v6.octets());
            }
        }
        value
    }

    fn decode(value: &[u8]) -> Result<Self> {
        if value.len() < 4 {
            return Err(Error::ErrAttributeSizeInvalid);
        }
        let family = value[1] as u16;
        let port = u16::from_be_bytes([value[2], value[3]]);
        let ip = match family {
            FAMILY_IPV4 => {
                if value.len() < 8 {
                    return Err(Error::ErrBadIpLength);
                }
                IpAddr::V4(Ipv4Addr::new(value[4], value[5], value[6], value[7]))
            }
            FAMILY_IPV6 => {
                if value.len() < 20 {
                    return Err(Error::ErrBadIpLength);
                }
                let mut octets = [0u8; 16];
                octets.copy_from_slice(&value[4..20]);
                IpAddr::V6(Ipv6Addr::from(octets))
            }
            _ => return Err(Error::ErrBadIpLength),
        };
        Ok(MappedAddress { ip, port })
    }

    fn add_as(&self, m: &mut Message, t: AttrType) -> Result<()> {
        m.add(t, &self.encode());
        Ok(())
    }

    fn get_as(&mut self, m: &Message, t: AttrType) -> Result<()> {
        let a = m.get(t)?;
        *self = MappedAddress::decode(&a.value)?;
        Ok(())
    }
}

impl Setter for MappedAddress {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        self.add_as(m, ATTR_MAPPED_ADDRESS)
    }
}

impl Getter for MappedAddress {
    fn get_from(&mut self, m: &Message) -> Result<()> {
        self.get_as(m, ATTR_MAPPED_ADDRESS)
    }
}

/// `AlternateServer` wraps `MappedAddress` under the ALTERNATE-SERVER
/// attribute type (RFC5389 section 15.11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlternateServer(pub MappedAddress);

impl Setter for AlternateServer {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        self.0.add_as(m, ATTR_ALTERNATE_SERVER)
    }
}

impl Getter for AlternateServer {
    fn get_from(&mut self, m: &Message) -> Result<()> {
        self.0.get_as(m, ATTR_ALTERNATE_SERVER)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::message::BINDING_SUCCESS;
    use std::net::Ipv4Addr;

    #[test]
    fn mapped_address_round_trips_ipv4() {
        let mut m = Message::new();
        m.typ = BINDING_SUCCESS;
        let addr = MappedAddress {
            ip: IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)),
            port: 54321,
        };
        addr.add_to(&mut m).unwrap();
        m.write_header();

        let mut decoded = Message::new();
        decoded.unmarshal_binary(&m.raw).unwrap();

        let mut got = MappedAddress::default();
        got.get_from(&decoded).unwrap();
        assert_eq!(got, addr);
    }
}
