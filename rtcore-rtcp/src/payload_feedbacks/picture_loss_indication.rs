use std::any::Any;

use bytes::Buf;
use shared::error::{Error, Result};
use shared::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::header::{Header, PacketType, HEADER_LENGTH};
use crate::packet::Packet;

const PLI_LENGTH: usize = 2;

/// PictureLossIndication notifies an encoder that the decoder has lost the
/// association between some frames, prompting a key frame (RFC4585 section
/// 6.3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PictureLossIndication {
    pub sender_ssrc: u32,
    pub media_ssrc: u32,
}

impl MarshalSize for PictureLossIndication {
    fn marshal_size(&self) -> usize {
        HEADER_LENGTH + PLI_LENGTH * 4
    }
}

impl Marshal for PictureLossIndication {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        let size = self.marshal_size();
        if buf.len() < size {
            return Err(Error::PacketTooShort);
        }
        let header = Header {
            padding: false,
            count: crate::header::format::PICTURE_LOSS_INDICATION,
            packet_type: PacketType::PayloadSpecificFeedback,
            length: crate::header::length_in_words(PLI_LENGTH * 4)?,
        };
        let n = header.marshal_to(buf)?;
        buf[n..n + 4].copy_from_slice(&self.sender_ssrc.to_be_bytes());
        buf[n + 4..n + 8].copy_from_slice(&self.media_ssrc.to_be_bytes());
        Ok(size)
    }
}

impl Unmarshal for PictureLossIndication {
    fn unmarshal<B>(buf: &mut B) -> Result<Self>
    where
        B: Buf,
    {
        if buf.remaining() < HEADER_LENGTH {
            return Err(Error::PacketTooShort);
        }
        let header = Header::unmarshal(buf)?;
        if header.packet_type != PacketType::PayloadSpecificFeedback
            || header.count != crate::header::format::PICTURE_LOSS_INDICATION
        {
            return Err(Error::WrongFeedbackType);
        }
        if buf.remaining() < 8 {
            return Err(Error::PacketTooShort);
        }
        let sender_ssrc = buf.get_u32();
        let media_ssrc = buf.get_u32();
        Ok(PictureLossIndication {
            sender_ssrc,
            media_ssrc,
        })
    }
}

impl Packet for PictureLossIndication {
    fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.media_ssrc]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equal(&self, other: &dyn Packet) -> bool {
        other
            .as_any()
            .downcast_ref::<PictureLossIndication>()
            .is_some_and(|o| o == self)
    }

    fn cloned(&self) -> Box<dyn Packet> {
        Box::new(*self)
    }
}
