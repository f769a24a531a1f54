use bytes::Buf;
use shared::error::{Error, Result};
use shared::marshal::{Marshal, MarshalSize, Unmarshal};

/// Size of a fixed RTCP header (RFC3550 section 6.1).
pub const HEADER_LENGTH: usize = 4;
pub const VERSION: u8 = 2;

/// PacketType specifies the type of an RTCP packet (RFC3550 section 12.1,
/// plus the feedback types added by RFC4585).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PacketType {
    #[default]
    Unsupported = 0,
    SenderReport = 200,
    ReceiverReport = 201,
    SourceDescription = 202,
    Goodbye = 203,
    ApplicationDefined = 204,
    TransportSpecificFeedback = 205,
    PayloadSpecificFeedback = 206,
    ExtendedReport = 207,
}

impl From<u8> for PacketType {
    fn from(b: u8) -> Self {
        match b {
            200 => PacketType::SenderReport,
            201 => PacketType::ReceiverReport,
            202 => PacketType::SourceDescription,
            203 => PacketType::Goodbye,
            204 => PacketType::ApplicationDefined,
            205 => PacketType::TransportSpecificFeedback,
            206 => PacketType::PayloadSpecificFeedback,
            207 => PacketType::ExtendedReport,
            _ => PacketType::Unsupported,
        }
    }
}

/// Format values carried in the 5-bit "count" field when the packet type is
/// a transport-layer feedback message (RFC4585 section 6.2).
pub mod format {
    pub const TRANSPORT_LAYER_NACK: u8 = 1;
    pub const TRANSPORT_LAYER_CC: u8 = 15;
    pub const PICTURE_LOSS_INDICATION: u8 = 1;
    pub const FULL_INTRA_REQUEST: u8 = 4;
}

/// Header is the common 4-byte RTCP header shared by every packet type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    pub padding: bool,
    pub count: u8,
    pub packet_type: PacketType,
    pub length: u16,
}

impl MarshalSize for Header {
    fn marshal_size(&self) -> usize {
        HEADER_LENGTH
    }
}

impl Marshal for Header {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        if buf.len() < HEADER_LENGTH {
            return Err(Error::PacketTooShort);
        }
        if self.count > 0x1f {
            return Err(Error::InvalidHeader);
        }
        let mut b0 = (VERSION << 6) | self.count;
        if self.padding {
            b0 |= 1 << 5;
        }
        buf[0] = b0;
        buf[1] = self.packet_type as u8;
        buf[2..4].copy_from_slice(&self.length.to_be_bytes());
        Ok(HEADER_LENGTH)
    }
}

impl Unmarshal for Header {
    fn unmarshal<B>(buf: &mut B) -> Result<Self>
    where
        B: Buf,
    {
        if buf.remaining() < HEADER_LENGTH {
            return Err(Error::PacketTooShort);
        }
        let b0 = buf.get_u8();
        let version = b0 >> 6;
        if version != VERSION {
            return Err(Error::BadVersion);
        }
        let padding = (b0 >> 5) & 1 == 1;
        let count = b0 & 0x1f;
        let packet_type = PacketType::from(buf.get_u8());
        let length = buf.get_u16();
        Ok(Header {
            padding,
            count,
            packet_type,
            length,
        })
    }
}

/// Marshals any payload extra bytes and padding so `length` is the payload
/// length in 32-bit words minus one, as mandated by RFC3550 section 6.4.1.
pub fn length_in_words(payload_bytes: usize) -> Result<u16> {
    let words = (HEADER_LENGTH + payload_bytes) / 4;
    if words == 0 {
        return Err(Error::InvalidHeader);
    }
    u16::try_from(words - 1).map_err(|_| Error::InvalidHeader)
}
