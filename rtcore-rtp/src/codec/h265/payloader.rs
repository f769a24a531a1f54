use bytes::{BufMut, Bytes, BytesMut};
use shared::error::{Error, Result};

use crate::codec::h264::emit_nalus;
use crate::codec::h265::{nalu_type, FU_END_BITMASK, FU_NALU_TYPE, FU_START_BITMASK};
use crate::packetizer::Payloader;

/// H265Payloader fragments an Annex B access unit into RTP payloads per
/// RFC7798, emitting single NAL unit packets when they fit the MTU and
/// fragmentation units (FU) otherwise.
#[derive(Default, Debug, Clone)]
pub struct H265Payloader;

impl H265Payloader {
    fn fragment(nalu: &Bytes, mtu: usize, packets: &mut Vec<Bytes>) {
        let layer_id_and_tid = [nalu[0], nalu[1]];
        let original_type = nalu_type(nalu[0]);
        let payload = nalu.slice(2..);

        let max_fragment_size = mtu.saturating_sub(3);
        let total = payload.len();
        let mut offset = 0usize;

        while offset < total {
            let current_size = (total - offset).min(max_fragment_size.max(1));

            let payload_hdr0 = (layer_id_and_tid[0] & 0x81) | (FU_NALU_TYPE << 1);
            let payload_hdr1 = layer_id_and_tid[1];

            let mut fu_header = original_type;
            if offset == 0 {
                fu_header |= FU_START_BITMASK;
            }
            if offset + current_size == total {
                fu_header |= FU_END_BITMASK;
            }

            let mut out = BytesMut::with_capacity(3 + current_size);
            out.put_u8(payload_hdr0);
            out.put_u8(payload_hdr1);
            out.put_u8(fu_header);
            out.extend_from_slice(&payload[offset..offset + current_size]);
            packets.push(out.freeze());

            offset += current_size;
        }
    }
}

impl Payloader for H265Payloader {
    fn payload(&mut self, mtu: usize, payload: &Bytes) -> Result<Vec<Bytes>> {
        if payload.is_empty() || mtu == 0 {
            return Ok(vec![]);
        }

        let mut packets = Vec::new();
        emit_nalus(payload, |nalu| {
            if nalu.len() < 2 {
                return;
            }
            if nalu.len() <= mtu {
                packets.push(nalu.clone());
            } else {
                H265Payloader::fragment(nalu, mtu, &mut packets);
            }
        });

        if packets.is_empty() {
            return Err(Error::ErrShortPacket);
        }
        Ok(packets)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn passes_through_small_nalu_unfragmented() {
        let mut p = H265Payloader;
        let frame = Bytes::from_static(&[0, 0, 0, 1, 0x02, 0x01, 1, 2, 3]);
        let packets = p.payload(1200, &frame).unwrap();
        assert_eq!(packets.len(), 1);
    }

    #[test]
    fn fragments_large_nalu() {
        let mut p = H265Payloader;
        let mut data = vec![0, 0, 0, 1, 0x02, 0x01];
        data.extend(std::iter::repeat(0xcd).take(50));
        let frame = Bytes::from(data);
        let packets = p.payload(10, &frame).unwrap();
        assert!(packets.len() > 1);
        assert_eq!(packets[0][2] & FU_START_BITMASK, FU_START_BITMASK);
        assert_eq!(
            packets.last().unwrap()[2] & FU_END_BITMASK,
            FU_END_BITMASK
        );
    }
}
