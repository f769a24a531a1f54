use bytes::{Bytes, BytesMut};
use shared::error::{Error, Result};

use crate::codec::h265::{
    nalu_type, AP_NALU_TYPE, FU_END_BITMASK, FU_NALU_TYPE, FU_NALU_TYPE_MASK, FU_START_BITMASK,
};
use crate::packetizer::Depacketizer;

const ANNEXB_NALUSTART_CODE: &[u8] = &[0, 0, 0, 1];

/// H265Depacketizer reassembles RFC7798 single NAL unit, aggregation packet
/// (AP), and fragmentation unit (FU) payloads back into an Annex B bitstream.
#[derive(Default, Debug, Clone)]
pub struct H265Depacketizer {
    fu_buffer: Option<BytesMut>,
}

impl Depacketizer for H265Depacketizer {
    fn depacketize(&mut self, packet: &Bytes) -> Result<Bytes> {
        if packet.len() < 2 {
            return Err(Error::ErrShortPacket);
        }

        let nt = nalu_type(packet[0]);

        if nt == AP_NALU_TYPE {
            let mut out = BytesMut::new();
            let mut offset = 2usize;
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

        if nt == FU_NALU_TYPE {
            if packet.len() < 3 {
                return Err(Error::ErrShortPacket);
            }
            let payload_hdr = [packet[0], packet[1]];
            let fu_header = packet[2];
            let is_start = fu_header & FU_START_BITMASK != 0;
            let is_end = fu_header & FU_END_BITMASK != 0;
            let original_type = fu_header & FU_NALU_TYPE_MASK;

            if is_start {
                let mut buf = BytesMut::new();
                buf.extend_from_slice(ANNEXB_NALUSTART_CODE);
                let byte0 = (payload_hdr[0] & 0x81) | (original_type << 1);
                buf.extend_from_slice(&[byte0, payload_hdr[1]]);
                buf.extend_from_slice(&packet[3..]);
                self.fu_buffer = Some(buf);
            } else if let Some(buf) = self.fu_buffer.as_mut() {
                buf.extend_from_slice(&packet[3..]);
            } else {
                return Err(Error::ErrShortPacket);
            }

            if is_end {
                if let Some(buf) = self.fu_buffer.take() {
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
        if payload.len() < 3 {
            return true;
        }
        if nalu_type(payload[0]) != FU_NALU_TYPE {
            return true;
        }
        payload[2] & FU_START_BITMASK != 0
    }

    fn is_partition_tail(&self, marker: bool, _payload: &Bytes) -> bool {
        marker
    }
}
