use shared::error::{Error, Result};
use stun::attributes::ATTR_PRIORITY;
use stun::message::{Getter, Message, Setter};

/// PRIORITY attribute (RFC8445 section 7.1.1), the candidate priority
/// carried on connectivity check Binding requests.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct PriorityAttr(pub u32);

impl Setter for PriorityAttr {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        m.add(ATTR_PRIORITY, &self.0.to_be_bytes());
        Ok(())
    }
}

impl Getter for PriorityAttr {
    fn get_from(&mut self, m: &Message) -> Result<()> {
        let a = m.get(ATTR_PRIORITY)?;
        if a.value.len() != 4 {
            return Err(Error::ErrAttributeSizeInvalid);
        }
        let mut buf = [0u8; 4];
        buf.copy_from_slice(&a.value);
        self.0 = u32::from_be_bytes(buf);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use stun::message::BINDING_REQUEST;

    #[test]
    fn priority_round_trips() {
        let mut m = Message::new();
        m.typ = BINDING_REQUEST;
        let attr = PriorityAttr(1_234_567);
        attr.add_to(&mut m).unwrap();
        m.write_header();

        let mut decoded = Message::new();
        decoded.unmarshal_binary(&m.raw).unwrap();

        let mut got = PriorityAttr::default();
        got.get_from(&decoded).unwrap();
        assert_eq!(got, attr);
    }
}
