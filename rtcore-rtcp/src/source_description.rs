use std::any::Any;

use bytes::Buf;
use shared::error::{Error, Result};
use shared::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::header::{Header, PacketType, HEADER_LENGTH};
use crate::packet::Packet;
use crate::util::get_padding_size;

const SDES_SOURCE_LEN: usize = 4;
const SDES_TYPE_LEN: usize = 1;
const SDES_OCTET_COUNT_LEN: usize = 1;
const SDES_MAX_OCTET_COUNT: usize = 0xff;

/// SdesType is the type of an SDES item (RFC3550 section 6.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SdesType {
    #[default]
    SdesEnd = 0,
    SdesCname = 1,
    SdesName = 2,
    SdesEmail = 3,
    SdesPhone = 4,
    SdesLoc = 5,
    SdesTool = 6,
    SdesNote = 7,
    SdesPriv = 8,
}

impl From<u8> for SdesType {
    fn from(b: u8) -> Self {
        match b {
            1 => SdesType::SdesCname,
            2 => SdesType::SdesName,
            3 => SdesType::SdesEmail,
            4 => SdesType::SdesPhone,
            5 => SdesType::SdesLoc,
            6 => SdesType::SdesTool,
            7 => SdesType::SdesNote,
            8 => SdesType::SdesPriv,
            _ => SdesType::SdesEnd,
        }
    }
}

/// SourceDescriptionItem is a single CNAME/NAME/etc. carried in a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceDescriptionItem {
    pub sdes_type: SdesType,
    pub text: bytes::Bytes,
}

impl SourceDescriptionItem {
    fn len(&self) -> usize {
        SDES_TYPE_LEN + SDES_OCTET_COUNT_LEN + self.text.len()
    }

    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        if self.text.len() > SDES_MAX_OCTET_COUNT {
            return Err(Error::SdesTextTooLong);
        }
        if buf.len() < self.len() {
            return Err(Error::PacketTooShort);
        }
        buf[0] = self.sdes_type as u8;
        buf[1] = self.text.len() as u8;
        buf[2..2 + self.text.len()].copy_from_slice(&self.text);
        Ok(self.len())
    }

    fn unmarshal<B: Buf>(buf: &mut B) -> Result<Self> {
        if buf.remaining() < SDES_TYPE_LEN {
            return Err(Error::PacketTooShort);
        }
        let sdes_type = SdesType::from(buf.get_u8());
        if buf.remaining() < SDES_OCTET_COUNT_LEN {
            return Err(Error::PacketTooShort);
        }
        let len = buf.get_u8() as usize;
        if buf.remaining() < len {
            return Err(Error::PacketTooShort);
        }
        let mut text = vec![0u8; len];
        buf.copy_to_slice(&mut text);
        Ok(SourceDescriptionItem {
            sdes_type,
            text: bytes::Bytes::from(text),
        })
    }
}

/// SourceDescriptionChunk is the SDES items carried for one SSRC/CSRC.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceDescriptionChunk {
    pub source: u32,
    pub items: Vec<SourceDescriptionItem>,
}

impl SourceDescriptionChunk {
    fn raw_len(&self) -> usize {
        let items_len: usize = self.items.iter().map(|i| i.len()).sum();
        SDES_SOURCE_LEN + items_len + SDES_TYPE_LEN
    }

    fn len(&self) -> usize {
        let l = self.raw_len();
        l + get_padding_size(l)
    }

    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        let size = self.len();
        if buf.len() < size {
            return Err(Error::PacketTooShort);
        }
        buf[0..4].copy_from_slice(&self.source.to_be_bytes());
        let mut idx = 4;
        for item in &self.items {
            idx += item.marshal_to(&mut buf[idx..])?;
        }
        buf[idx] = SdesType::SdesEnd as u8;
        idx += 1;
        for b in &mut buf[idx..size] {
            *b = 0;
        }
        Ok(size)
    }

    fn unmarshal<B: Buf>(buf: &mut B) -> Result<Self> {
        if buf.remaining() < SDES_SOURCE_LEN {
            return Err(Error::PacketTooShort);
        }
        let source = buf.get_u32();
        let mut items = Vec::new();
        let mut consumed = SDES_SOURCE_LEN;
        loop {
            if buf.remaining() < SDES_TYPE_LEN {
                return Err(Error::PacketTooShort);
            }
            if buf.chunk()[0] == SdesType::SdesEnd as u8 {
                buf.advance(1);
                consumed += 1;
                break;
            }
            let before = buf.remaining();
            let item = SourceDescriptionItem::unmarshal(buf)?;
            consumed += before - buf.remaining();
            items.push(item);
        }
        let pad = get_padding_size(consumed);
        if buf.remaining() < pad {
            return Err(Error::PacketTooShort);
        }
        buf.advance(pad);
        Ok(SourceDescriptionChunk { source, items })
    }
}

/// SourceDescription carries canonical names and other source-level
/// information for one or more SSRC/CSRC (RFC3550 section 6.5).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceDescription {
    pub chunks: Vec<SourceDescriptionChunk>,
}

impl MarshalSize for SourceDescription {
    fn marshal_size(&self) -> usize {
        let body: usize = self.chunks.iter().map(|c| c.len()).sum();
        HEADER_LENGTH + body
    }
}

impl Marshal for SourceDescription {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        if self.chunks.len() > 0x1f {
            return Err(Error::TooManyChunks);
        }
        let body: usize = self.chunks.iter().map(|c| c.len()).sum();
        let size = HEADER_LENGTH + body;
        if buf.len() < size {
            return Err(Error::PacketTooShort);
        }
        let header = Header {
            padding: false,
            count: self.chunks.len() as u8,
            packet_type: PacketType::SourceDescription,
            length: crate::header::length_in_words(body)?,
        };
        let n = header.marshal_to(buf)?;
        let mut idx = n;
        for chunk in &self.chunks {
            idx += chunk.marshal_to(&mut buf[idx..])?;
        }
        Ok(idx)
    }
}

impl Unmarshal for SourceDescription {
    fn unmarshal<B>(buf: &mut B) -> Result<Self>
    where
        B: Buf,
    {
        if buf.remaining() < HEADER_LENGTH {
            return Err(Error::PacketTooShort);
        }
        let header = Header::unmarshal(buf)?;
        if header.packet_type != PacketType::SourceDescription {
            return Err(Error::WrongType);
        }
        let body_len = (header.length as usize + 1) * 4 - HEADER_LENGTH;
        if buf.remaining() < body_len {
            return Err(Error::PacketTooShort);
        }
        let mut remaining = body_len;
        let mut chunks = Vec::with_capacity(header.count as usize);
        for _ in 0..header.count {
            let before = buf.remaining();
            chunks.push(SourceDescriptionChunk::unmarshal(buf)?);
            remaining -= before - buf.remaining();
        }
        if remaining > 0 {
            buf.advance(remaining);
        }
        Ok(SourceDescription { chunks })
    }
}

impl Packet for SourceDescription {
    fn destination_ssrc(&self) -> Vec<u32> {
        self.chunks.iter().map(|c| c.source).collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equal(&self, other: &dyn Packet) -> bool {
        other
            .as_any()
            .downcast_ref::<SourceDescription>()
            .is_some_and(|o| o == self)
    }

    fn cloned(&self) -> Box<dyn Packet> {
        Box::new(self.clone())
    }
}
