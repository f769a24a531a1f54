use shared::error::{Error, Result};

use crate::message::Message;

/// Returns the maximum padded attribute value length permitted for a STUN
/// attribute, given the remaining bytes of the message.
pub fn check_overflow(attr_size: usize, available: usize) -> Result<()> {
    if attr_size > available {
        return Err(Error::ErrAttributeSizeOverflow);
    }
    Ok(())
}

/// Checks that `v`'s size matches exactly one of `sizes`, as used by fixed-
/// width attributes like FINGERPRINT (4 bytes) or ERROR-CODE's numeric head
/// (4 bytes).
pub fn check_size(at: crate::attributes::AttrType, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(Error::ErrAttributeSizeInvalid);
    }
    let _ = at;
    Ok(())
}

/// Checks that message `m`'s length header field matches the length of its
/// already-decoded `raw` buffer tail.
pub fn check_hmac(got: &[u8], expected: &[u8]) -> Result<()> {
    use subtle::ConstantTimeEq;
    if got.ct_eq(expected).unwrap_u8() == 0 {
        return Err(Error::ErrIntegrityMismatch);
    }
    Ok(())
}

pub fn is_message(buf: &[u8]) -> bool {
    use crate::message::{MAGIC_COOKIE, MESSAGE_HEADER_SIZE};
    if buf.len() < MESSAGE_HEADER_SIZE {
        return false;
    }
    let cookie = u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]);
    cookie == MAGIC_COOKIE
}

pub fn message_class_is_response(m: &Message) -> bool {
    use crate::message::{CLASS_ERROR_RESPONSE, CLASS_SUCCESS_RESPONSE};
    m.typ.class == CLASS_SUCCESS_RESPONSE || m.typ.class == CLASS_ERROR_RESPONSE
}
