use bytes::Bytes;
use shared::error::{Error, Result};

use crate::packetizer::Depacketizer;

/// Vp9Depacketizer strips the payload descriptor from each RTP payload,
/// exposing the bare VP9 frame data.
#[derive(Default, Debug, Clone)]
pub struct Vp9Depacketizer {
    pub picture_id: u16,
}

impl Depacketizer for Vp9Depacketizer {
    fn depacketize(&mut self, packet: &Bytes) -> Result<Bytes> {
        if packet.is_empty() {
            return Err(Error::ErrShortPacket);
        }

        let byte0 = packet[0];
        let has_picture_id = byte0 & 0x80 != 0;
        let mut offset = 1usize;

        if has_picture_id {
            if packet.len() <= offset {
                return Err(Error::ErrShortPacket);
            }
            let is_long = packet[offset] & 0x80 != 0;
            if is_long {
                if packet.len() <= offset + 1 {
                    return Err(Error::ErrShortPacket);
                }
                self.picture_id =
                    (((packet[offset] & 0x7f) as u16) << 8) | packet[offset + 1] as u16;
                offset += 2;
            } else {
                self.picture_id = (packet[offset] & 0x7f) as u16;
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
        payload[0] & 0x08 != 0
    }

    fn is_partition_tail(&self, marker: bool, payload: &Bytes) -> bool {
        marker || (!payload.is_empty() && payload[0] & 0x04 != 0)
    }
}
