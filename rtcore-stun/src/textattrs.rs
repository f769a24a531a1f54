use shared::error::{Error, Result};

use crate::attributes::AttrType;
use crate::message::{Getter, Message, Setter};

const MAX_USERNAME_B: usize = 513;
const MAX_REALM_B: usize = 763;
const MAX_NONCE_B: usize = 763;
const MAX_SOFTWARE_B: usize = 763;

/// `TextAttribute` is a generic UTF-8 STUN attribute shared by USERNAME,
/// REALM, NONCE and SOFTWARE (RFC5389 sections 15.3, 15.7, 15.8, 15.10).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextAttribute {
    pub attr: AttrType,
    pub text: String,
}

impl TextAttribute {
    pub fn new(attr: AttrType, text: String) -> Self {
        TextAttribute { attr, text }
    }

    fn max_len(&self) -> usize {
        match self.attr {
            crate::attributes::ATTR_USERNAME => MAX_USERNAME_B,
            crate::attributes::ATTR_REALM => MAX_REALM_B,
            crate::attributes::ATTR_NONCE => MAX_NONCE_B,
            crate::attributes::ATTR_SOFTWARE => MAX_SOFTWARE_B,
            _ => MAX_SOFTWARE_B,
        }
    }
}

impl Setter for TextAttribute {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        let value = self.text.as_bytes();
        if value.len() > self.max_len() {
            return Err(Error::ErrAttributeSizeOverflow);
        }
        m.add(self.attr, value);
        Ok(())
    }
}

impl Getter for TextAttribute {
    fn get_from(&mut self, m: &Message) -> Result<()> {
        let a = m.get(self.attr)?;
        self.text = String::from_utf8(a.value.clone()).map_err(|_| Error::ErrAttributeSizeInvalid)?;
        Ok(())
    }
}

/// `Username` is the USERNAME attribute (RFC5389 section 15.3).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Username(pub String);

impl Setter for Username {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        TextAttribute::new(crate::attributes::ATTR_USERNAME, self.0.clone()).add_to(m)
    }
}

impl Getter for Username {
    fn get_from(&mut self, m: &Message) -> Result<()> {
        let mut t = TextAttribute::new(crate::attributes::ATTR_USERNAME, String::new());
        t.get_from(m)?;
        self.0 = t.text;
        Ok(())
    }
}

/// `Realm` is the REALM attribute (RFC5389 section 15.7).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Realm(pub String);

impl Setter for Realm {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        TextAttribute::new(crate::attributes::ATTR_REALM, self.0.clone()).add_to(m)
    }
}

impl Getter for Realm {
    fn get_from(&mut self, m: &Message) -> Result<()> {
        let mut t = TextAttribute::new(crate::attributes::ATTR_REALM, String::new());
        t.get_from(m)?;
        self.0 = t.text;
        Ok(())
    }
}

/// `Nonce` is the NONCE attribute (RFC5389 section 15.8).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Nonce(pub String);

impl Setter for Nonce {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        TextAttribute::new(crate::attributes::ATTR_NONCE, self.0.clone()).add_to(m)
    }
}

impl Getter for Nonce {
    fn get_from(&mut self, m: &Message) -> Result<()> {
        let mut t = TextAttribute::new(crate::attributes::ATTR_NONCE, String::new());
        t.get_from(m)?;
        self.0 = t.text;
        Ok(())
    }
}

/// `Software` is the SOFTWARE attribute (RFC5389 section 15.10).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Software(pub String);

impl Setter for Software {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        TextAttribute::new(crate::attributes::ATTR_SOFTWARE, self.0.clone()).add_to(m)
    }
}

impl Getter for Software {
    fn get_from(&mut self, m: &Message) -> Result<()> {
        let mut t = TextAttribute::new(crate::attributes::ATTR_SOFTWARE, String::new());
        t.get_from(m)?;
        self.0 = t.text;
        Ok(())
    }
}
