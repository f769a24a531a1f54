use bytes::{BufMut, Bytes, BytesMut};
use shared::error::{Error, Result};

use crate::packetizer::Payloader;

/// Vp9Payloader fragments a VP9 frame into RTP payloads, prefixing each
/// fragment with a payload descriptor (draft-ietf-payload-vp9 section 4.2)
/// carrying the start-of-frame (B) and end-of-frame (E) bits and, when
/// `enable_picture_id` is set, a 15-bit extended picture ID.
#[derive(Default, Debug, Clone)]
pub struct Vp9Payloader {
    pub enable_picture_id: bool,
    picture_id: u16,
}

impl Vp9Payloader {
    pub fn new(enable_picture_id: bool) -> Self {
        Self {
            enable_picture_id,
            picture_id: 0,
        }
    }
}

impl Payloader for Vp9Payloader {
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

        while offset < total {
            let current_size = (total - offset).min(max_fragment_size);
            let is_first = offset == 0;
            let is_last = offset + current_size == total;

            let mut out = BytesMut::with_capacity(header_size + current_size);
            let mut descriptor = 0u8;
            if using_picture_id {
                descriptor |= 0x80;
            }
            if is_first {
                descriptor |= 0x08;
            }
            if is_last {
                descriptor |= 0x04;
            }
            out.put_u8(descriptor);

            if using_picture_id {
                out.put_u8(0x80 | ((self.picture_id >> 8) as u8 & 0x7f));
                out.put_u8((self.picture_id & 0xff) as u8);
            }

            out.extend_from_slice(&payload[offset..offset + current_size]);
            packets.push(out.freeze());
            offset += current_size;
        }

        if using_picture_id {
            self.picture_id = self.picture_id.wrapping_add(1) & 0x7fff;
        }

        Ok(packets)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn marks_start_and_end_of_frame() {
        let mut p = Vp9Payloader::default();
        let frame = Bytes::from(vec![0xaa; 30]);
        let packets = p.payload(10, &frame).unwrap();
        assert!(packets.len() > 1);
        assert_eq!(packets[0][0] & 0x08, 0x08);
        assert_eq!(packets[0][0] & 0x04, 0);
        assert_eq!(packets.last().unwrap()[0] & 0x04, 0x04);
    }
}
