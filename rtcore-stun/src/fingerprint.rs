use shared::error::{Error, Result};

use crate::attributes::ATTR_FINGERPRINT;
use crate::message::{Message, Setter, ATTRIBUTE_HEADER_SIZE};

/// `FINGERPRINT_XOR_VALUE` is XORed onto the CRC32 checksum per RFC5389
/// section 15.5, so that the result doesn't look like the MESSAGE-INTEGRITY
/// attribute to software that doesn't distinguish the two.
const FINGERPRINT_XOR_VALUE: u32 = 0x5354_554e;

static CASTAGNOLI: crc::Crc<u32> = crc::Crc::<u32>::new(&crc::CRC_32_ISCSI);

/// Computes the FINGERPRINT value over the message as it currently stands
/// (with the length header reflecting everything up to, but not including,
/// the FINGERPRINT attribute itself).
pub fn fingerprint(m: &Message) -> u32 {
    CASTAGNOLI.checksum(&m.raw) ^ FINGERPRINT_XOR_VALUE
}

/// `FingerprintAttr` is a `Setter` that appends a FINGERPRINT attribute
/// covering every byte of the message written so far.
pub struct FingerprintAttr;

pub const FINGERPRINT: FingerprintAttr = FingerprintAttr;

impl Setter for FingerprintAttr {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        m.write_header();
        let val = fingerprint(m);
        m.add(ATTR_FINGERPRINT, &val.to_be_bytes());
        Ok(())
    }
}

/// Validates the FINGERPRINT attribute, recomputing the checksum over the
/// message bytes preceding it.
pub fn fingerprint_check(m: &Message) -> Result<()> {
    let attr = m.get(ATTR_FINGERPRINT)?;
    if attr.value.len() != 4 {
        return Err(Error::ErrAttributeSizeInvalid);
    }

    let attr_start_pos = fingerprint_before_offset(m);
    let mut without_fingerprint = m.clone();
    without_fingerprint.raw.truncate(attr_start_pos);
    without_fingerprint.length = (attr_start_pos - crate::message::MESSAGE_HEADER_SIZE) as u32;
    without_fingerprint.write_length();

    let expected = fingerprint(&without_fingerprint);
    let got = u32::from_be_bytes([attr.value[0], attr.value[1], attr.value[2], attr.value[3]]);
    if got != expected {
        return Err(Error::ErrFingerprintMismatch);
    }
    Ok(())
}

fn fingerprint_before_offset(m: &Message) -> usize {
    let mut offset = crate::message::MESSAGE_HEADER_SIZE;
    for a in &m.attributes {
        if a.typ == ATTR_FINGERPRINT {
            return offset;
        }
        offset += ATTRIBUTE_HEADER_SIZE + crate::message::nearest_padded_value_length(a.value.len());
    }
    m.raw.len()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::message::{BINDING_REQUEST, TransactionId};

    #[test]
    fn fingerprint_round_trips() {
        let mut m = Message::new();
        m.typ = BINDING_REQUEST;
        m.transaction_id = TransactionId::new();
        FINGERPRINT.add_to(&mut m).unwrap();
        m.write_header();

        let mut decoded = Message::new();
        decoded.unmarshal_binary(&m.raw).unwrap();
        assert!(fingerprint_check(&decoded).is_ok());
    }

    #[test]
    fn fingerprint_check_rejects_tampered_message() {
        let mut m = Message::new();
        m.typ = BINDING_REQUEST;
        m.transaction_id = TransactionId::new();
        FINGERPRINT.add_to(&mut m).unwrap();
        m.write_header();

        let mut decoded = Message::new();
        decoded.unmarshal_binary(&m.raw).unwrap();
        let last = decoded.raw.len() - 1;
        decoded.raw[last] ^= 0xff;
        decoded.decode().unwrap();
        assert!(fingerprint_check(&decoded).is_err());
    }
}
