use std::any::Any;

use bytes::Buf;
use shared::error::{Error, Result};
use shared::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::header::{Header, PacketType, HEADER_LENGTH};
use crate::packet::Packet;
use crate::util::get_padding_size;

/// Goodbye indicates that one or more sources are no longer active
/// (RFC3550 section 6.6).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Goodbye {
    pub sources: Vec<u32>,
    pub reason: bytes::Bytes,
}

impl Goodbye {
    fn body_size(&self) -> usize {
        let reason_len = if self.reason.is_empty() {
            0
        } else {
            1 + self.reason.len()
        };
        self.sources.len() * 4 + reason_len
    }
}

impl MarshalSize for Goodbye {
    fn marshal_size(&self) -> usize {
        let body = self.body_size();
        HEADER_LENGTH + body + get_padding_size(body)
    }
}

impl Marshal for Goodbye {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        if self.sources.len() > 0x1f {
            return Err(Error::TooManySources);
        }
        if self.reason.len() > 0xff {
            return Err(Error::ReasonTooLong);
        }
        let body = self.body_size();
        let padding = get_padding_size(body);
        let size = HEADER_LENGTH + body + padding;
        if buf.len() < size {
            return Err(Error::PacketTooShort);
        }

        let header = Header {
            padding: padding != 0,
            count: self.sources.len() as u8,
            packet_type: PacketType::Goodbye,
            length: crate::header::length_in_words(body + padding)?,
        };
        let n = header.marshal_to(buf)?;
        let mut idx = n;

        for s in &self.sources {
            buf[idx..idx + 4].copy_from_slice(&s.to_be_bytes());
            idx += 4;
        }

        if !self.reason.is_empty() {
            buf[idx] = self.reason.len() as u8;
            idx += 1;
            buf[idx..idx + self.reason.len()].copy_from_slice(&self.reason);
            idx += self.reason.len();
        }

        if padding != 0 {
            for b in &mut buf[idx..idx + padding - 1] {
                *b = 0;
            }
            buf[idx + padding - 1] = padding as u8;
        }
        idx += padding;

        Ok(idx)
    }
}

impl Unmarshal for Goodbye {
    fn unmarshal<B>(buf: &mut B) -> Result<Self>
    where
        B: Buf,
    {
        if buf.remaining() < HEADER_LENGTH {
            return Err(Error::PacketTooShort);
        }
        let header = Header::unmarshal(buf)?;
        if header.packet_type != PacketType::Goodbye {
            return Err(Error::WrongType);
        }
        let body_len = (header.length as usize + 1) * 4 - HEADER_LENGTH;
        if buf.remaining() < body_len {
            return Err(Error::PacketTooShort);
        }
        let sources_len = header.count as usize * 4;
        if body_len < sources_len {
            return Err(Error::PacketTooShort);
        }

        let mut sources = Vec::with_capacity(header.count as usize);
        for _ in 0..header.count {
            sources.push(buf.get_u32());
        }

        let mut rest = vec![0u8; body_len - sources_len];
        buf.copy_to_slice(&mut rest);
        if header.padding {
            let pad = *rest.last().unwrap_or(&0) as usize;
            if pad == 0 || pad > rest.len() {
                return Err(Error::WrongPadding);
            }
            rest.truncate(rest.len() - pad);
        }

        let reason = if rest.is_empty() {
            bytes::Bytes::new()
        } else {
            let reason_len = rest[0] as usize;
            if reason_len > rest.len() - 1 {
                return Err(Error::PacketTooShort);
            }
            bytes::Bytes::copy_from_slice(&rest[1..1 + reason_len])
        };

        Ok(Goodbye { sources, reason })
    }
}

impl Packet for Goodbye {
    fn destination_ssrc(&self) -> Vec<u32> {
        self.sources.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equal(&self, other: &dyn Packet) -> bool {
        other
            .as_any()
            .downcast_ref::<Goodbye>()
            .is_some_and(|o| o == self)
    }

    fn cloned(&self) -> Box<dyn Packet> {
        Box::new(self.clone())
    }
}
