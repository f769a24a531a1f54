use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use shared::error::{Error, Result};

use crate::attributes::{AttrType, ATTR_XORMAPPED_ADDRESS, ATTR_XOR_PEER_ADDRESS, ATTR_XOR_RELAYED_ADDRESS};
use crate::message::{Getter, Message, Setter, MAGIC_COOKIE};

const FAMILY_IPV4: u8 = 0x01;
const FAMILY_IPV6: u8 = 0x02;

/// `XorMappedAddress` is the XOR-MAPPED-ADDRESS attribute (RFC5389 section
/// 15.2): an address whose port and (for IPv4) whole address, or (for
/// IPv6) first four octets, are XORed against the magic cookie so that NATs
/// performing naive address rewriting on SDP/media payloads don't also
/// rewrite it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XorMappedAddress {
    pub ip: IpAddr,
    pub port: u16,
}

impl Default for XorMappedAddress {
    fn default() -> Self {
        XorMappedAddress {
            ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 0,
        }
    }
}

impl XorMappedAddress {
    fn encode(&self, transaction_id: &[u8; 12]) -> Vec<u8> {
        let xport = self.port ^ (MAGIC_COOKIE >> 16) as u16;
        let mut value = vec![0u8, 0u8, 0u8, 0u8];
        value[2..4].copy_from_slice(&xport.to_be_bytes());

        match self.ip {
            IpAddr::V4(v4) => {
                value[1] = FAMILY_IPV4;
                let cookie = MAGIC_COOKIE.to_be_bytes();
                for (i, b) in v4.octets().iter().enumerate() {
                    value.push(b ^ cookie[i]);
                }
            }
            IpAddr::V6(v6) => {
                value[1] = FAMILY_IPV6;
                let mut pad = Vec::with_capacity(16);
                pad.extend_from_slice(&MAGIC_COOKIE.to_be_bytes());
                pad.extend_from_slice(transaction_id);
                for (i, b) in v6.octets().iter().enumerate() {
                    value.push(b ^ pad[i]);
                }
            }
        }
        value
    }

    fn decode(value: &[u8], transaction_id: &[u8; 12]) -> Result<Self> {
        if value.len() < 4 {
            return Err(Error::ErrAttributeSizeInvalid);
        }
        let family = value[1];
        let xport = u16::from_be_bytes([value[2], value[3]]);
        let port = xport ^ (MAGIC_COOKIE >> 16) as u16;

        let ip = match family {
            FAMILY_IPV4 => {
                if value.len() < 8 {
                    return Err(Error::ErrBadIpLength);
                }
                let cookie = MAGIC_COOKIE.to_be_bytes();
                let mut octets = [0u8; 4];
                for i in 0..4 {
                    octets[i] = value[4 + i] ^ cookie[i];
                }
                IpAddr::V4(Ipv4Addr::from(octets))
            }
            FAMILY_IPV6 => {
                if value.len() < 20 {
                    return Err(Error::ErrBadIpLength);
                }
                let mut pad = Vec::with_capacity(16);
                pad.extend_from_slice(&MAGIC_COOKIE.to_be_bytes());
                pad.extend_from_slice(transaction_id);
                let mut octets = [0u8; 16];
                for i in 0..16 {
                    octets[i] = value[4 + i] ^ pad[i];
                }
                IpAddr::V6(Ipv6Addr::from(octets))
            }
            _ => return Err(Error::ErrBadIpLength),
        };
        Ok(XorMappedAddress { ip, port })
    }

    fn add_as(&self, m: &mut Message, t: AttrType) -> Result<()> {
        let value = self.encode(&m.transaction_id.0);
        m.add(t, &value);
        Ok(())
    }

    fn get_as(&mut self, m: &Message, t: AttrType) -> Result<()> {
        let a = m.get(t)?;
        *self = XorMappedAddress::decode(&a.value, &m.transaction_id.0)?;
        Ok(())
    }
}

impl Setter for XorMappedAddress {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        self.add_as(m, ATTR_XORMAPPED_ADDRESS)
    }
}

impl Getter for XorMappedAddress {
    fn get_from(&mut self, m: &Message) -> Result<()> {
        self.get_as(m, ATTR_XORMAPPED_ADDRESS)
    }
}

/// `XorPeerAddress` is TURN's XOR-PEER-ADDRESS attribute (RFC8656 section
/// 14.3), sharing `XorMappedAddress`'s wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XorPeerAddress(pub XorMappedAddress);

impl Setter for XorPeerAddress {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        self.0.add_as(m, ATTR_XOR_PEER_ADDRESS)
    }
}

impl Getter for XorPeerAddress {
    fn get_from(&mut self, m: &Message) -> Result<()> {
        self.0.get_as(m, ATTR_XOR_PEER_ADDRESS)
    }
}

/// `XorRelayedAddress` is TURN's XOR-RELAYED-ADDRESS attribute (RFC8656
/// section 14.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XorRelayedAddress(pub XorMappedAddress);

impl Setter for XorRelayedAddress {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        self.0.add_as(m, ATTR_XOR_RELAYED_ADDRESS)
    }
}

impl Getter for XorRelayedAddress {
    fn get_from(&mut self, m: &Message) -> Result<()> {
        self.0.get_as(m, ATTR_XOR_RELAYED_ADDRESS)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::message::{TransactionId, BINDING_SUCCESS};
    use std::net::Ipv4Addr;

    #[test]
    fn xor_mapped_address_round_trips_ipv4() {
        let mut m = Message::new();
        m.typ = BINDING_SUCCESS;
        m.transaction_id = TransactionId::new();
        let addr = XorMappedAddress {
            ip: IpAddr::V4(Ipv4Addr::new(203, 0, 113, 5)),
            port: 12345,
        };
        addr.add_to(&mut m).unwrap();
        m.write_header();

        let mut decoded = Message::new();
        decoded.unmarshal_binary(&m.raw).unwrap();

        let mut got = XorMappedAddress::default();
        got.get_from(&decoded).unwrap();
        assert_eq!(got, addr);
    }

    #[test]
    fn xor_mapped_address_round_trips_ipv6() {
        let mut m = Message::new();
        m.typ = BINDING_SUCCESS;
        m.transaction_id = TransactionId::new();
        let addr = XorMappedAddress {
            ip: "2001:db8::1".parse().unwrap(),
            port: 443,
        };
        addr.add_to(&mut m).unwrap();
        m.write_header();

        let mut decoded = Message::new();
        decoded.unmarshal_binary(&m.raw).unwrap();

        let mut got = XorMappedAddress::default();
        got.get_from(&decoded).unwrap();
        assert_eq!(got, addr);
    }
}
