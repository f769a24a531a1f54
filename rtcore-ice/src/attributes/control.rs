use shared::error::{Error, Result};
use stun::attributes::{ATTR_ICE_CONTROLLED, ATTR_ICE_CONTROLLING};
use stun::message::{Getter, Message, Setter};

/// ICE-CONTROLLING attribute (RFC8445 section 7.1.2): the tie-breaker value
/// the controlling agent includes in its connectivity check requests.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct AttrControlling(pub u64);

impl Setter for AttrControlling {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        m.add(ATTR_ICE_CONTROLLING, &self.0.to_be_bytes());
        Ok(())
    }
}

impl Getter for AttrControlling {
    fn get_from(&mut self, m: &Message) -> Result<()> {
        let a = m.get(ATTR_ICE_CONTROLLING)?;
        if a.value.len() != 8 {
            return Err(Error::ErrAttributeSizeInvalid);
        }
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&a.value);
        self.0 = u64::from_be_bytes(buf);
        Ok(())
    }
}

/// ICE-CONTROLLED attribute (RFC8445 section 7.1.3), the controlled agent's
/// counterpart to [`AttrControlling`].
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct AttrControlled(pub u64);

impl Setter for AttrControlled {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        m.add(ATTR_ICE_CONTROLLED, &self.0.to_be_bytes());
        Ok(())
    }
}

impl Getter for AttrControlled {
    fn get_from(&mut self, m: &Message) -> Result<()> {
        let a = m.get(ATTR_ICE_CONTROLLED)?;
        if a.value.len() != 8 {
            return Err(Error::ErrAttributeSizeInvalid);
        }
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&a.value);
        self.0 = u64::from_be_bytes(buf);
        Ok(())
    }
}
