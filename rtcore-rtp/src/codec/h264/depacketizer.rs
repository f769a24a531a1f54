use bytes::{Bytes, BytesMut};
use shared::error::{Error, Result};

use crate::codec::h264::{
    FUA_NALU_TYPE, FU_END_BITMASK, FU_START_BITMASK, NALU_REF_IDC_BITMASK, NALU_TYPE_BITMASK,
    STAPA_NALU_TYPE,
};
use crate::packetizer::Depacketizer;

const ANNEXB_NALUSTART_CODE: &[u8] = &[0, 0, 0, 1];

/// H264Depacketizer reassembles RFC6184 single NAL unit, STAP-A, and FU-A
/// payloads back into an Annex B bitstream.
#[derive(Default, Debug, Clone)]
pub struct H264Depacketizer {
    fua_buffer: Option<BytesMut>,
}

impl Depacketizer for H264Depacketizer {
    fn depacketize(&mut self, packet: &Bytes) -> Result<Bytes> {
        if packet.len() < 2 {
            return Err(Error::ErrShortPacket);
        }

        let nalu_type = packet[0] & NALU_TYPE_BITMASK;

        if nalu_type == STAPA_NALU_TYPE {
            let mut out = BytesMut::new();
            let mut offset = 1usize;
            while offset + 2 <= packet.len() {
                let size = u16::from_be_bytes([packet[offset], packet[offset + 1]]) as usize;
                offset += 2;
                if offset + size > packet.len() {
                    return Err(Error::ErrShortPacket);
                }
                out.extend_from_slice(ANNEXB_NALUSTART_CODE);
                out.extend_from_slice(&packet[offset..offset + size]);
                offset += size;
            }
            return Ok(out.freeze());
        }

        if nalu_type == FUA_NALU_TYPE {
            if packet.len() < 2 {
                return Err(Error::ErrShortPacket);
            }
            let fu_indicator = packet[0];
            let fu_header = packet[1];
            let is_start = fu_header & FU_START_BITMASK != 0;
            let is_end = fu_header & FU_END_BITMASK != 0;

            if is_start {
                let mut buf = BytesMut::new();
                buf.extend_from_slice(ANNEXB_NALUSTART_CODE);
                let original_nal_type = fu_header & NALU_TYPE_BITMASK;
                let reconstructed_header =
                    (fu_indicator & NALU_REF_IDC_BITMASK) | original_nal_type;
                buf.extend_from_slice(&[reconstructed_header]);
                buf.extend_from_slice(&packet[2..]);
                self.fua_buffer = Some(buf);
            } else if let Some(buf) = self.fua_buffer.as_mut() {
                buf.extend_from_slice(&packet[2..]);
            } else {
                return Err(Error::ErrShortPacket);
            }

            if is_end {
                if let Some(buf) = self.fua_buffer.take() {
                    return Ok(buf.freeze());
                }
                return Err(Error::ErrShortPacket);
            }
            return Ok(Bytes::new());
        }

        let mut out = BytesMut::new();
        out.extend_from_slice(ANNEXB_NALUSTART_CODE);
        out.extend_from_slice(packet);
        Ok(out.freeze())
    }

    fn is_partition_head(&self, payload: &Bytes) -> bool {
        if payload.len() < 2 {
            return false;
        }
        let nalu_type = payload[0] & NALU_TYPE_BITMASK;
        if nalu_type != FUA_NALU_TYPE {
            return true;
        }
        payload[1] & FU_START_BITMASK != 0
    }

    fn is_partition_tail(&self, marker: bool, _payload: &Bytes) -> bool {
        marker
    }
}
