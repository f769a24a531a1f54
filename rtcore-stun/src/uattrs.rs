use shared::error::{Error, Result};

use crate::attributes::{AttrType, ATTR_UNKNOWN_ATTRIBUTES};
use crate::message::{Getter, Message, Setter};

/// `UnknownAttributes` is the UNKNOWN-ATTRIBUTES attribute (RFC5389 section
/// 15.9): a list of attribute types the responder didn't understand,
/// returned alongside a 420 (Unknown Attribute) error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnknownAttributes(pub Vec<AttrType>);

impl Setter for UnknownAttributes {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        let mut value = Vec::with_capacity(self.0.len() * 2);
        for t in &self.0 {
            value.extend_from_slice(&t.value().to_be_bytes());
        }
        m.add(ATTR_UNKNOWN_ATTRIBUTES, &value);
        Ok(())
    }
}

impl Getter for UnknownAttributes {
    fn get_from(&mut self, m: &Message) -> Result<()> {
        let a = m.get(ATTR_UNKNOWN_ATTRIBUTES)?;
        if a.value.len() % 2 != 0 {
            return Err(Error::ErrBadUnknownAttrsSize);
        }
        self.0 = a
            .value
            .chunks_exact(2)
            .map(|c| AttrType(u16::from_be_bytes([c[0], c[1]])))
            .collect();
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::attributes::ATTR_SOFTWARE;
    use crate::message::BINDING_ERROR;

    #[test]
    fn unknown_attributes_round_trip() {
        let mut m = Message::new();
        m.typ = BINDING_ERROR;
        let ua = UnknownAttributes(vec![ATTR_SOFTWARE, AttrType(0x9999)]);
        ua.add_to(&mut m).unwrap();
        m.write_header();

        let mut decoded = Message::new();
        decoded.unmarshal_binary(&m.raw).unwrap();

        let mut got = UnknownAttributes::default();
        got.get_from(&decoded).unwrap();
        assert_eq!(got.0, ua.0);
    }
}
