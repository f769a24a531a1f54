use bytes::{BufMut, Bytes, BytesMut};
use shared::error::{Error, Result};

use crate::codec::h264::{
    emit_nalus, AUD_NALU_TYPE, FILLER_NALU_TYPE, FUA_NALU_TYPE, FU_END_BITMASK,
    FU_START_BITMASK, NALU_REF_IDC_BITMASK, NALU_TYPE_BITMASK, SPS_NALU_TYPE,
};
use crate::packetizer::Payloader;

/// H264Payloader fragments an Annex B access unit into RTP payloads per
/// RFC6184, emitting single NAL unit packets when they fit the MTU and
/// FU-A fragments otherwise.
#[derive(Default, Debug, Clone)]
pub struct H264Payloader {
    sps_nalu: Option<Bytes>,
    pps_nalu: Option<Bytes>,
}

impl H264Payloader {
    fn fragment(nalu: &Bytes, mtu: usize, packets: &mut Vec<Bytes>) {
        let nalu_type = nalu[0] & NALU_TYPE_BITMASK;
        let nalu_ref_idc = nalu[0] & NALU_REF_IDC_BITMASK;

        let max_fragment_size = mtu.saturating_sub(2) as isize;
        let payload = nalu.slice(1..);
        let mut offset = 0usize;
        let total = payload.len();

        while offset < total || (total == 0 && offset == 0) {
            let remaining = total - offset;
            let current_size = if max_fragment_size <= 0 {
                remaining
            } else {
                remaining.min(max_fragment_size as usize)
            };

            let mut fu_indicator = nalu_ref_idc;
            fu_indicator |= FUA_NALU_TYPE;

            let mut fu_header = nalu_type;
            if offset == 0 {
                fu_header |= FU_START_BITMASK;
            }
            if offset + current_size == total {
                fu_header |= FU_END_BITMASK;
            }

            let mut out = BytesMut::with_capacity(2 + current_size);
            out.put_u8(fu_indicator);
            out.put_u8(fu_header);
            out.extend_from_slice(&payload[offset..offset + current_size]);
            packets.push(out.freeze());

            offset += current_size;
            if total == 0 {
                break;
            }
        }
    }
}

impl Payloader for H264Payloader {
    fn payload(&mut self, mtu: usize, payload: &Bytes) -> Result<Vec<Bytes>> {
        if payload.is_empty() || mtu == 0 {
            return Ok(vec![]);
        }

        let mut packets = Vec::new();

        emit_nalus(payload, |nalu| {
            if nalu.is_empty() {
                return;
            }
            let nalu_type = nalu[0] & NALU_TYPE_BITMASK;
            if nalu_type == AUD_NALU_TYPE || nalu_type == FILLER_NALU_TYPE {
                return;
            }
            if nalu_type == SPS_NALU_TYPE {
                self.sps_nalu = Some(nalu.clone());
            }

            if nalu.len() <= mtu {
                packets.push(nalu.clone());
            } else {
                H264Payloader::fragment(nalu, mtu, &mut packets);
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
        let mut p = H264Payloader::default();
        let frame = Bytes::from_static(&[0, 0, 0, 1, 0x65, 1, 2, 3]);
        let packets = p.payload(1200, &frame).unwrap();
        assert_eq!(packets.len(), 1);
        assert_eq!(&packets[0][..], &[0x65, 1, 2, 3]);
    }

    #[test]
    fn fragments_large_nalu_into_fua_units() {
        let mut p = H264Payloader::default();
        let mut data = vec![0, 0, 0, 1, 0x65];
        data.extend(std::iter::repeat(0xab).take(50));
        let frame = Bytes::from(data);
        let packets = p.payload(10, &frame).unwrap();
        assert!(packets.len() > 1);
        assert_eq!(packets[0][1] & FU_START_BITMASK, FU_START_BITMASK);
        assert_eq!(
            packets.last().unwrap()[1] & FU_END_BITMASK,
            FU_END_BITMASK
        );
    }
}
