use bytes::{BufMut, Bytes, BytesMut};
use shared::error::{Error, Result};

use crate::packetizer::Payloader;

/// Vp8Payloader fragments a VP8 frame into RTP payloads, prefixing each
/// fragment with the RFC7741 section 4.2 payload descriptor. When
/// `enable_picture_id` is set, a 15-bit extended picture ID is carried on
/// every fragment and incremented once per input frame.
#[derive(Default, Debug, Clone)]
pub struct Vp8Payloader {
    pub enable_picture_id: bool,
    picture_id: u16,
}

impl Vp8Payloader {
    pub fn new(enable_picture_id: bool) -> Self {
        Self {
            enable_picture_id,
            picture_id: 0,
        }
    }
}

impl Payloader for Vp8Payloader {
    fn payload(&mut self, mtu: usize, payload: &Bytes) -> Result<Vec<Bytes>> {
        if payload.is_empty() || mtu == 0 {
            return Ok(vec![]);
        }

        let using_picture_id = self.enable_picture_id;
        let header_size = if using_picture_id { 1 + 2 } else { 1 };
        let max_fragment_size = mtu.saturating_sub(header_size);
        if max_fragment_size == 0 {
            return Err(Error::ErrShortPacket);
        }

        let mut packets = Vec::new();
        let mut offset = 0usize;
        let total = payload.len();
        let mut first = true;

        while offset < total {
            let current_size = (total - offset).min(max_fragment_size);

            let mut out = BytesMut::with_capacity(header_size + current_size);
            let mut descriptor = 0u8;
            if using_picture_id {
                descriptor |= 0x80;
            }
            if first {
                descriptor |= 0x10;
            }
            out.put_u8(descriptor);

            if using_picture_id {
                out.put_u8(0x80 | ((self.picture_id >> 8) as u8 & 0x7f));
                out.put_u8((self.picture_id & 0xff) as u8);
            }

            out.extend_from_slice(&payload[offset..offset + current_size]);
            packets.push(out.freeze());

            offset += current_size;
            first = false;
        }

        if using_picture_id {
            self.picture_id = self.picture_id.wrapping_add(1) & 0x7fff;
        }

        Ok(packets)
    }
}
