use bytes::Bytes;
use shared::error::{Error, Result};

use crate::packetizer::Depacketizer;

/// Vp8Depacketizer strips the RFC7741 section 4.2 payload descriptor from
/// each RTP payload, exposing the bare VP8 partition data.
#[derive(Default, Debug, Clone)]
pub struct Vp8Depacketizer {
    pub picture_id: u16,
}

impl Depacketizer for Vp8Depacketizer {
    fn depacketize(&mut self, packet: &Bytes) -> Result<Bytes> {
        if packet.is_empty() {
            return Err(Error::ErrShortPacket);
        }

        let mut offset = 1usize;
        let byte0 = packet[0];
        let extended = byte0 & 0x80 != 0;

        if extended {
            if packet.len() <= offset {
                return Err(Error::ErrShortPacket);
            }
            let ext = packet[offset];
            offset += 1;
            let has_picture_id = ext & 0x80 != 0;
            let has_tl0_pic_idx = ext & 0x40 != 0;
            let has_tid_or_key_idx = ext & 0x20 != 0 || ext & 0x10 != 0;

            if has_picture_id {
                if packet.len() <= offset {
                    return Err(Error::ErrShortPacket);
                }
                let is_long = packet[offset] & 0x80 != 0;
                if is_long {
                    if packet.len() <= offset + 1 {
                        return Err(Error::ErrShortPacket);
                    }
                    self.picture_id = (((packet[offset] & 0x7f) as u16) << 8)
                        | packet[offset + 1] as u16;
                    offset += 2;
                } else {
                    self.picture_id = (packet[offset] & 0x7f) as u16;
                    offset += 1;
                }
            }
            if has_tl0_pic_idx {
                offset += 1;
            }
            if has_tid_or_key_idx {
                offset += 1;
            }
        }

        if offset > packet.len() {
            return Err(Error::ErrShortPacket);
        }
        Ok(packet.slice(offset..))
    }

    fn is_partition_head(&self, payload: &Bytes) -> bool {
        if payload.is_empty() {
            return false;
        }
        payload[0] & 0x10 != 0
    }

    fn is_partition_tail(&self, marker: bool, _payload: &Bytes) -> bool {
        marker
    }
}
