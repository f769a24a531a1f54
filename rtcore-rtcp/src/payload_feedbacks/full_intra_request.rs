use std::any::Any;

use bytes::Buf;
use shared::error::{Error, Result};
use shared::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::header::{Header, PacketType, HEADER_LENGTH};
use crate::packet::Packet;

const FIR_ENTRY_LENGTH: usize = 8;

/// FirEntry is one (ssrc, sequence number) pair inside a FullIntraRequest
/// (RFC5104 section 4.3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FirEntry {
    pub ssrc: u32,
    pub sequence_number: u8,
}

/// FullIntraRequest requests that a decoder's key frame source send a new
/// key frame (RFC5104 section 4.3.1).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FullIntraRequest {
    pub sender_ssrc: u32,
    pub media_ssrc: u32,
    pub fir: Vec<FirEntry>,
}

impl MarshalSize for FullIntraRequest {
    fn marshal_size(&self) -> usize {
        HEADER_LENGTH + 8 + self.fir.len() * FIR_ENTRY_LENGTH
    }
}

impl Marshal for FullIntraRequest {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        let body = 8 + self.fir.len() * FIR_ENTRY_LENGTH;
        let size = HEADER_LENGTH + body;
        if buf.len() < size {
            return Err(Error::PacketTooShort);
        }
        let header = Header {
            padding: false,
            count: crate::header::format::FULL_INTRA_REQUEST,
            packet_type: PacketType::PayloadSpecificFeedback,
            length: crate::header::length_in_words(body)?,
        };
        let n = header.marshal_to(buf)?;
        let mut idx = n;
        buf[idx..idx + 4].copy_from_slice(&self.sender_ssrc.to_be_bytes());
        idx += 4;
        buf[idx..idx + 4].copy_from_slice(&self.media_ssrc.to_be_bytes());
        idx += 4;
        for e in &self.fir {
            buf[idx..idx + 4].copy_from_slice(&e.ssrc.to_be_bytes());
            idx += 4;
            buf[idx] = e.sequence_number;
            buf[idx + 1..idx + 4].copy_from_slice(&[0, 0, 0]);
            idx += 4;
        }
        Ok(idx)
    }
}

impl Unmarshal for FullIntraRequest {
    fn unmarshal<B>(buf: &mut B) -> Result<Self>
    where
        B: Buf,
    {
        if buf.remaining() < HEADER_LENGTH {
            return Err(Error::PacketTooShort);
        }
        let header = Header::unmarshal(buf)?;
        if header.packet_type != PacketType::PayloadSpecificFeedback
            || header.count != crate::header::format::FULL_INTRA_REQUEST
        {
            return Err(Error::WrongFeedbackType);
        }
        let body_len = (header.length as usize + 1) * 4 - HEADER_LENGTH;
        if buf.remaining() < body_len || body_len < 8 {
            return Err(Error::PacketTooShort);
        }
        let sender_ssrc = buf.get_u32();
        let media_ssrc = buf.get_u32();
        let remaining = body_len - 8;
        if remaining % FIR_ENTRY_LENGTH != 0 {
            return Err(Error::PacketTooShort);
        }
        let mut fir = Vec::with_capacity(remaining / FIR_ENTRY_LENGTH);
        for _ in 0..(remaining / FIR_ENTRY_LENGTH) {
            let ssrc = buf.get_u32();
            let sequence_number = buf.get_u8();
            buf.advance(3);
            fir.push(FirEntry {
                ssrc,
                sequence_number,
            });
        }
        Ok(FullIntraRequest {
            sender_ssrc,
            media_ssrc,
            fir,
        })
    }
}

impl Packet for FullIntraRequest {
    fn destination_ssrc(&self) -> Vec<u32> {
        self.fir.iter().map(|e| e.ssrc).collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equal(&self, other: &dyn Packet) -> bool {
        other
            .as_any()
            .downcast_ref::<FullIntraRequest>()
            .is_some_and(|o| o == self)
    }

    fn cloned(&self) -> Box<dyn Packet> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips() {
        let fir = FullIntraRequest {
            sender_ssrc: 1,
            media_ssrc: 2,
            fir: vec![FirEntry {
                ssrc: 3,
                sequence_number: 42,
            }],
        };
        let raw = fir.marshal().unwrap();
        let mut b = raw.clone();
        assert_eq!(fir, FullIntraRequest::unmarshal(&mut b).unwrap());
    }
}
