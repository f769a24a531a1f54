use std::fmt;

use shared::error::{Error, Result};

use crate::attributes::ATTR_ERROR_CODE;
use crate::message::{Getter, Message, Setter};

const ERROR_CODE_MODULO: u16 = 100;
const ERROR_CODE_CLASS_SHIFT: u16 = 8;

/// `ErrorCodeAttribute` is the ERROR-CODE attribute (RFC5389 section 15.6):
/// a numeric code in `[300, 699]` plus a human-readable reason phrase.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorCodeAttribute {
    pub code: ErrorCode,
    pub reason: Vec<u8>,
}

impl fmt::Display for ErrorCodeAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.code.0,
            String::from_utf8_lossy(&self.reason)
        )
    }
}

impl Setter for ErrorCodeAttribute {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        let class = (self.code.0 / ERROR_CODE_MODULO) as u8;
        let number = (self.code.0 % ERROR_CODE_MODULO) as u8;

        let mut value = vec![0u8, 0u8, class, number];
        value.extend_from_slice(&self.reason);
        m.add(ATTR_ERROR_CODE, &value);
        Ok(())
    }
}

impl Getter for ErrorCodeAttribute {
    fn get_from(&mut self, m: &Message) -> Result<()> {
        let a = m.get(ATTR_ERROR_CODE)?;
        if a.value.len() < 4 {
            return Err(Error::ErrAttributeSizeInvalid);
        }
        let class = a.value[2] as u16;
        let number = a.value[3] as u16;
        self.code = ErrorCode(class * ERROR_CODE_MODULO + number);
        self.reason = a.value[4..].to_vec();
        Ok(())
    }
}

/// `ErrorCode` is the numeric STUN error code, e.g. `400` (Bad Request).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ErrorCode(pub u16);

pub const CODE_TRY_ALTERNATE: ErrorCode = ErrorCode(300);
pub const CODE_BAD_REQUEST: ErrorCode = ErrorCode(400);
pub const CODE_UNAUTHORIZED: ErrorCode = ErrorCode(401);
pub const CODE_UNKNOWN_ATTRIBUTE: ErrorCode = ErrorCode(420);
pub const CODE_STALE_NONCE: ErrorCode = ErrorCode(438);
pub const CODE_ROLE_CONFLICT: ErrorCode = ErrorCode(487);
pub const CODE_SERVER_ERROR: ErrorCode = ErrorCode(500);

impl ErrorCode {
    pub fn reason_phrase(&self) -> &'static str {
        match *self {
            CODE_TRY_ALTERNATE => "Try Alternate",
            CODE_BAD_REQUEST => "Bad Request",
            CODE_UNAUTHORIZED => "Unauthorized",
            CODE_UNKNOWN_ATTRIBUTE => "Unknown Attribute",
            CODE_STALE_NONCE => "Stale Nonce",
            CODE_ROLE_CONFLICT => "Role Conflict",
            CODE_SERVER_ERROR => "Server Error",
            _ => "Unknown Error",
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::message::BINDING_ERROR;

    #[test]
    fn error_code_round_trips() {
        let mut m = Message::new();
        m.typ = BINDING_ERROR;
        let attr = ErrorCodeAttribute {
            code: CODE_BAD_REQUEST,
            reason: CODE_BAD_REQUEST.reason_phrase().as_bytes().to_vec(),
        };
        attr.add_to(&mut m).unwrap();
        m.write_header();

        let mut decoded = Message::new();
        decoded.unmarshal_binary(&m.raw).unwrap();

        let mut got = ErrorCodeAttribute::default();
        got.get_from(&decoded).unwrap();
        assert_eq!(got.code, CODE_BAD_REQUEST);
        assert_eq!(got.reason, attr.reason);
    }
}
