use std::fmt;
use std::io::{Read, Write};

use base64::{engine::general_purpose::STANDARD, Engine};
use rand::Rng;
use shared::error::{Error, Result};

use crate::attributes::{AttrType, ATTR_FINGERPRINT};
use crate::fingerprint::fingerprint_check;

/// `TYPE_DEFAULT` is a type for default message.
pub const TYPE_DEFAULT: u16 = 0x0000;

/// Interfaces that are implemented by message attributes, shorthands for
/// them, and message itself. Attribute adds or sets attribute to message.
pub trait Setter {
    fn add_to(&self, m: &mut Message) -> Result<()>;
}

/// Getter parses attribute from the message.
pub trait Getter {
    fn get_from(&mut self, m: &Message) -> Result<()>;
}

/// `MAGIC_COOKIE` is fixed value that MUST be present in the first 4 bytes of
/// every STUN message.
pub const MAGIC_COOKIE: u32 = 0x2112_A442;
pub const ATTRIBUTE_HEADER_SIZE: usize = 4;
pub const MESSAGE_HEADER_SIZE: usize = 20;
pub const TRANSACTION_ID_SIZE: usize = 12;

/// `TransactionId` represents transaction ID.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TransactionId(pub [u8; TRANSACTION_ID_SIZE]);

impl Default for TransactionId {
    fn default() -> Self {
        TransactionId([0u8; TRANSACTION_ID_SIZE])
    }
}

impl TransactionId {
    /// Generates a new transaction ID, sourced from a cryptographically
    /// random generator.
    pub fn new() -> Self {
        let mut b = [0u8; TRANSACTION_ID_SIZE];
        rand::rng().fill(&mut b);
        TransactionId(b)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", STANDARD.encode(self.0))
    }
}

const METHOD_ABITS: u16 = 0b0000_0000_0000_1111;
const METHOD_BBITS: u16 = 0b0000_0000_0111_0000;
const METHOD_DBITS: u16 = 0b0000_1111_1000_0000;

const METHOD_BSHIFT: u16 = 1;
const METHOD_DSHIFT: u16 = 2;

const FIRST_BIT: u16 = 0b0000_0000_0000_0001;
const SECOND_BIT: u16 = 0b0000_0000_0000_0010;

const C0BIT: u16 = FIRST_BIT;
const C1BIT: u16 = SECOND_BIT;

const CLASS_C0SHIFT: u16 = 4;
const CLASS_C1SHIFT: u16 = 7;

/// Method is a STUN method, encoded as the lower 12 bits of the message
/// type, per RFC5389 section 6.
#[derive(PartialEq, Eq, Debug, Copy, Clone, Default)]
pub struct Method(pub u16);

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            METHOD_BINDING => "Binding",
            METHOD_ALLOCATE => "Allocate",
            METHOD_REFRESH => "Refresh",
            METHOD_SEND => "Send",
            METHOD_DATA => "Data",
            METHOD_CREATE_PERMISSION => "CreatePermission",
            METHOD_CHANNEL_BIND => "ChannelBind",
            _ => return write!(f, "0x{:x}", self.0),
        };
        write!(f, "{s}")
    }
}

pub const METHOD_BINDING: Method = Method(0x0001);
pub const METHOD_ALLOCATE: Method = Method(0x0003);
pub const METHOD_REFRESH: Method = Method(0x0004);
pub const METHOD_SEND: Method = Method(0x0006);
pub const METHOD_DATA: Method = Method(0x0007);
pub const METHOD_CREATE_PERMISSION: Method = Method(0x0008);
pub const METHOD_CHANNEL_BIND: Method = Method(0x0009);

/// Class is a message class, given by the two leftmost bits of the message
/// type, per RFC5389 section 6.
#[derive(PartialEq, Eq, Debug, Copy, Clone, Default)]
pub struct Class(pub u8);

pub const CLASS_REQUEST: Class = Class(0x00);
pub const CLASS_INDICATION: Class = Class(0x01);
pub const CLASS_SUCCESS_RESPONSE: Class = Class(0x02);
pub const CLASS_ERROR_RESPONSE: Class = Class(0x03);

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            CLASS_REQUEST => "request",
            CLASS_INDICATION => "indication",
            CLASS_SUCCESS_RESPONSE => "success response",
            CLASS_ERROR_RESPONSE => "error response",
            _ => "unknown class",
        };
        write!(f, "{s}")
    }
}

/// `MessageType` is a STUN message type, the combination of method and class
/// allowed by RFC5389 section 6 that identifies the message purpose.
#[derive(PartialEq, Eq, Debug, Copy, Clone, Default)]
pub struct MessageType {
    pub method: Method,
    pub class: Class,
}

pub const BINDING_REQUEST: MessageType = MessageType {
    method: METHOD_BINDING,
    class: CLASS_REQUEST,
};
pub const BINDING_SUCCESS: MessageType = MessageType {
    method: METHOD_BINDING,
    class: CLASS_SUCCESS_RESPONSE,
};
pub const BINDING_ERROR: MessageType = MessageType {
    method: METHOD_BINDING,
    class: CLASS_ERROR_RESPONSE,
};

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.class)
    }
}

impl MessageType {
    pub fn new(method: Method, class: Class) -> Self {
        MessageType { method, class }
    }

    /// Writes the message type into `[0]`/`[1]` of the first two header
    /// bytes, per RFC5389 section 6's bit layout.
    pub fn value(&self) -> u16 {
        let method = self.method.0;
        let a = method & METHOD_ABITS;
        let b = (method & METHOD_BBITS) << METHOD_BSHIFT;
        let d = (method & METHOD_DBITS) << METHOD_DSHIFT;
        let m = a + b + d;

        let c0 = (self.class.0 as u16 & C0BIT) << CLASS_C0SHIFT;
        let c1 = (self.class.0 as u16 & C1BIT) << CLASS_C1SHIFT;
        let c = c0 + c1;

        m + c
    }

    pub fn read_value(&mut self, value: u16) {
        let a = value & METHOD_ABITS;
        let b = (value >> METHOD_BSHIFT) & METHOD_BBITS;
        let d = (value >> METHOD_DSHIFT) & METHOD_DBITS;
        self.method = Method(a + b + d);

        let c0 = (value >> CLASS_C0SHIFT) & C0BIT;
        let c1 = (value >> CLASS_C1SHIFT) & C1BIT;
        self.class = Class((c0 + c1) as u8);
    }
}

/// `RawAttribute` is a helper for constructing or reading one STUN attribute
/// TLV as it appears on the wire, before being interpreted as a specific
/// typed attribute.
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct RawAttribute {
    pub typ: AttrType,
    pub length: u16,
    pub value: Vec<u8>,
}

/// Message represents a single STUN message, the unit this crate reads and
/// writes on the wire: a 20 byte header followed by zero or more TLV
/// attributes, with the whole message always padded to a multiple of 4
/// bytes (RFC5389 section 5).
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct Message {
    pub typ: MessageType,
    pub length: u32,
    pub transaction_id: TransactionId,
    pub attributes: Vec<RawAttribute>,
    pub raw: Vec<u8>,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (l={}) id={}", self.typ, self.length, self.transaction_id)
    }
}

impl Message {
    pub fn new() -> Self {
        Message {
            raw: vec![0u8; MESSAGE_HEADER_SIZE],
            ..Default::default()
        }
    }

    /// Marks the message as new and resets all fields except `raw`'s
    /// capacity, ready to be built again with `build`.
    pub fn reset(&mut self) {
        self.raw.clear();
        self.length = 0;
        self.attributes.clear();
    }

    /// Appends `attr`'s TLV encoding to `raw` without re-writing the
    /// header's length field; callers must call `write_length` afterwards.
    pub fn add(&mut self, t: AttrType, v: &[u8]) {
        let attr_length = v.len() as u16;
        let mut buf = vec![0u8; ATTRIBUTE_HEADER_SIZE];
        buf[0..2].copy_from_slice(&t.value().to_be_bytes());
        buf[2..4].copy_from_slice(&attr_length.to_be_bytes());
        buf.extend_from_slice(v);
        let padded = nearest_padded_value_length(v.len());
        buf.resize(ATTRIBUTE_HEADER_SIZE + padded, 0);

        self.attributes.push(RawAttribute {
            typ: t,
            value: v.to_vec(),
            length: attr_length,
        });
        self.raw.extend_from_slice(&buf);
        self.length += buf.len() as u32;
    }

    pub fn write_header(&mut self) {
        if self.raw.len() < MESSAGE_HEADER_SIZE {
            let skip = MESSAGE_HEADER_SIZE - self.raw.len();
            self.raw.extend_from_slice(&vec![0u8; skip]);
        }
        self.raw[0..2].copy_from_slice(&self.typ.value().to_be_bytes());
        self.write_length();
        self.raw[4..8].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
        self.raw[8..20].copy_from_slice(&self.transaction_id.0);
    }

    pub fn write_length(&mut self) {
        if self.raw.len() < 4 {
            self.raw.extend_from_slice(&[0u8; 4]);
        }
        self.raw[2..4].copy_from_slice(&(self.length as u16).to_be_bytes());
    }

    /// Builds (in order) the message type and transaction ID header, then
    /// every setter's attribute, finalizing the header afterwards.
    pub fn build(&mut self, setters: &[Box<dyn Setter>]) -> Result<()> {
        self.write_header();
        for s in setters {
            s.add_to(self)?;
        }
        self.write_header();
        Ok(())
    }

    pub fn marshal_binary(&self) -> Result<Vec<u8>> {
        Ok(self.raw.clone())
    }

    pub fn unmarshal_binary(&mut self, data: &[u8]) -> Result<()> {
        self.raw.clear();
        self.raw.extend_from_slice(data);
        self.decode()
    }

    /// Parses `raw` into `typ`/`length`/`transaction_id`/`attributes`.
    pub fn decode(&mut self) -> Result<()> {
        let buf = &self.raw;
        if buf.len() < MESSAGE_HEADER_SIZE {
            return Err(Error::ErrUnexpectedHeaderEof);
        }

        let t = u16::from_be_bytes([buf[0], buf[1]]);
        let mut m_type = MessageType::default();
        m_type.read_value(t);

        let length = u16::from_be_bytes([buf[2], buf[3]]) as u32;
        let cookie = u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]);
        let mut tid = TransactionId::default();
        tid.0.copy_from_slice(&buf[8..20]);

        if cookie != MAGIC_COOKIE {
            return Err(Error::ErrDecodeToNil);
        }

        if MESSAGE_HEADER_SIZE + length as usize > buf.len() {
            return Err(Error::ErrBufferShort);
        }

        self.typ = m_type;
        self.length = length;
        self.transaction_id = tid;
        self.attributes.clear();

        let mut offset = 0usize;
        let attrs_buf = &buf[MESSAGE_HEADER_SIZE..MESSAGE_HEADER_SIZE + length as usize];
        while offset < attrs_buf.len() {
            if attrs_buf.len() - offset < ATTRIBUTE_HEADER_SIZE {
                return Err(Error::ErrUnexpectedEof);
            }
            let a_type = u16::from_be_bytes([attrs_buf[offset], attrs_buf[offset + 1]]);
            let a_len =
                u16::from_be_bytes([attrs_buf[offset + 2], attrs_buf[offset + 3]]) as usize;
            offset += ATTRIBUTE_HEADER_SIZE;
            if offset + a_len > attrs_buf.len() {
                return Err(Error::ErrAttributeSizeInvalid);
            }
            let value = attrs_buf[offset..offset + a_len].to_vec();
            self.attributes.push(RawAttribute {
                typ: AttrType(a_type),
                length: a_len as u16,
                value,
            });
            offset += nearest_padded_value_length(a_len);
        }

        Ok(())
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<usize> {
        writer.write_all(&self.raw)?;
        Ok(self.raw.len())
    }

    pub fn read_from<R: Read>(&mut self, reader: &mut R) -> Result<usize> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        let n = buf.len();
        self.raw = buf;
        self.decode()?;
        Ok(n)
    }

    /// True if an attribute of type `t` is present.
    pub fn contains(&self, t: AttrType) -> bool {
        self.attributes.iter().any(|a| a.typ == t)
    }

    pub fn get(&self, t: AttrType) -> Result<&RawAttribute> {
        self.attributes
            .iter()
            .find(|a| a.typ == t)
            .ok_or(Error::ErrAttributeNotFound)
    }

    /// Applies `getters` against this message; returns the first error, if
    /// any.
    pub fn get_all<G: Getter>(&self, getters: &mut [G]) -> Result<()> {
        for g in getters {
            g.get_from(self)?;
        }
        Ok(())
    }

    pub fn equal(&self, other: &Message) -> bool {
        if self.typ != other.typ {
            return false;
        }
        if self.transaction_id != other.transaction_id {
            return false;
        }
        if self.attributes.len() != other.attributes.len() {
            return false;
        }
        for a in &self.attributes {
            match other.get(a.typ) {
                Ok(b) if b.value == a.value => {}
                _ => return false,
            }
        }
        true
    }

    pub fn new_transaction_id(&mut self) -> Result<()> {
        self.transaction_id = TransactionId::new();
        self.write_header();
        Ok(())
    }

    pub fn string(&self) -> String {
        format!("{self}")
    }

    /// Validates the fingerprint and message-integrity attributes, if
    /// present, returning their dedicated errors on mismatch.
    pub fn check(&self) -> Result<()> {
        if self.contains(ATTR_FINGERPRINT) {
            fingerprint_check(self)?;
        }
        Ok(())
    }
}

/// Rounds `l` up to the nearest multiple of 4, per RFC5389 section 15's
/// attribute padding rule.
pub fn nearest_padded_value_length(l: usize) -> usize {
    let mut n = l;
    if l % ATTRIBUTE_HEADER_SIZE != 0 {
        n = l + (ATTRIBUTE_HEADER_SIZE - l % ATTRIBUTE_HEADER_SIZE);
    }
    n
}

/// `Builder` is a helper for accumulating setters to be applied with
/// `Message::build`.
pub fn build(setters: Vec<Box<dyn Setter>>) -> Result<Message> {
    let mut m = Message::new();
    m.build(&setters)?;
    Ok(m)
}
