use ring::hmac;
use shared::error::{Error, Result};

use crate::attributes::{ATTR_MESSAGE_INTEGRITY, ATTR_MESSAGE_INTEGRITY_SHA256};
use crate::message::{nearest_padded_value_length, Message, Setter, ATTRIBUTE_HEADER_SIZE, MESSAGE_HEADER_SIZE};

/// `MessageIntegrity` is a `Setter`/checker for the MESSAGE-INTEGRITY
/// attribute (RFC5389 section 15.4): HMAC-SHA1 over everything preceding it,
/// keyed by a credential-derived key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageIntegrity(pub Vec<u8>);

impl MessageIntegrity {
    /// Builds the long-term credential key `MD5(username ":" realm ":"
    /// password)` as defined by RFC5389 section 15.4.
    pub fn new_long_term_integrity(username: String, realm: String, password: String) -> Self {
        use md5::{Digest, Md5};
        let s = format!("{username}:{realm}:{password}");
        let digest = Md5::digest(s.as_bytes());
        MessageIntegrity(digest.to_vec())
    }

    pub fn new_short_term_integrity(password: String) -> Self {
        MessageIntegrity(password.into_bytes())
    }

    fn mac(&self, data: &[u8]) -> Vec<u8> {
        let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, &self.0);
        hmac::sign(&key, data).as_ref().to_vec()
    }
}

impl Setter for MessageIntegrity {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        m.write_header();
        // Account for the MESSAGE-INTEGRITY attribute's own TLV header in
        // the length field covered by the HMAC, per RFC5389 section 15.4.
        let length = m.length as usize + ATTRIBUTE_HEADER_SIZE + 20;
        let mut with_len = m.clone();
        with_len.length = (length - MESSAGE_HEADER_SIZE) as u32;
        with_len.write_length();

        let value = self.mac(&with_len.raw);
        m.add(ATTR_MESSAGE_INTEGRITY, &value);
        Ok(())
    }
}

pub fn message_integrity_check(m: &Message, mi: &MessageIntegrity) -> Result<()> {
    let attr = m.get(ATTR_MESSAGE_INTEGRITY)?;
    let offset = attribute_offset(m, ATTR_MESSAGE_INTEGRITY);
    let mut up_to = m.clone();
    up_to.raw.truncate(offset);
    up_to.length = (offset - MESSAGE_HEADER_SIZE) as u32;
    up_to.write_length();

    let expected = mi.mac(&up_to.raw);
    if expected != attr.value {
        return Err(Error::ErrIntegrityMismatch);
    }
    Ok(())
}

/// `MessageIntegritySha256` is the RFC8489 replacement attribute, using
/// HMAC-SHA256 and permitting a truncated (but >= 16 byte) value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageIntegritySha256(pub Vec<u8>);

impl MessageIntegritySha256 {
    fn mac(&self, data: &[u8]) -> Vec<u8> {
        let key = hmac::Key::new(hmac::HMAC_SHA256, &self.0);
        hmac::sign(&key, data).as_ref().to_vec()
    }
}

impl Setter for MessageIntegritySha256 {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        m.write_header();
        let length = m.length as usize + ATTRIBUTE_HEADER_SIZE + 32;
        let mut with_len = m.clone();
        with_len.length = (length - MESSAGE_HEADER_SIZE) as u32;
        with_len.write_length();

        let value = self.mac(&with_len.raw);
        m.add(ATTR_MESSAGE_INTEGRITY_SHA256, &value);
        Ok(())
    }
}

fn attribute_offset(m: &Message, t: crate::attributes::AttrType) -> usize {
    let mut offset = MESSAGE_HEADER_SIZE;
    for a in &m.attributes {
        if a.typ == t {
            return offset;
        }
        offset += ATTRIBUTE_HEADER_SIZE + nearest_padded_value_length(a.value.len());
    }
    m.raw.len()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::message::{TransactionId, BINDING_REQUEST};

    #[test]
    fn message_integrity_round_trips() {
        let mi = MessageIntegrity::new_short_term_integrity("password".to_owned());

        let mut m = Message::new();
        m.typ = BINDING_REQUEST;
        m.transaction_id = TransactionId::new();
        mi.add_to(&mut m).unwrap();
        m.write_header();

        let mut decoded = Message::new();
        decoded.unmarshal_binary(&m.raw).unwrap();
        assert!(message_integrity_check(&decoded, &mi).is_ok());
    }

    #[test]
    fn message_integrity_rejects_wrong_key() {
        let mi = MessageIntegrity::new_short_term_integrity("password".to_owned());
        let wrong = MessageIntegrity::new_short_term_integrity("different".to_owned());

        let mut m = Message::new();
        m.typ = BINDING_REQUEST;
        m.transaction_id = TransactionId::new();
        mi.add_to(&mut m).unwrap();
        m.write_header();

        let mut decoded = Message::new();
        decoded.unmarshal_binary(&m.raw).unwrap();
        assert!(message_integrity_check(&decoded, &wrong).is_err());
    }

    #[test]
    fn long_term_integrity_key_is_md5_of_credentials() {
        let mi = MessageIntegrity::new_long_term_integrity(
            "user".to_owned(),
            "realm".to_owned(),
            "pass".to_owned(),
        );
        assert_eq!(mi.0.len(), 16);
    }
}
