use bytes::{BufMut, Bytes, BytesMut};
use shared::error::{Error, Result};

use crate::codec::av1::leb128::read_leb128;
use crate::codec::av1::obu::{OBU_EXTENSION_FLAG_BIT, OBU_HAS_SIZE_BIT, OBU_TYPE_TEMPORAL_DELIMITER};
use crate::packetizer::Payloader;

fn write_leb128(buf: &mut BytesMut, mut value: u32) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.put_u8(byte);
        if value == 0 {
            break;
        }
    }
}

/// Splits a temporal-unit payload (a sequence of length-delimited OBUs) back
/// into the individual OBUs it carries, stripping the size field each OBU
/// already carries since the aggregation header re-encodes it out of band.
fn split_obus(mut payload: Bytes) -> Vec<Bytes> {
    let mut obus = Vec::new();
    while !payload.is_empty() {
        let header_byte = payload[0];
        let has_extension = header_byte & OBU_EXTENSION_FLAG_BIT != 0;
        let header_size = if has_extension { 2 } else { 1 };
        let has_size_field = header_byte & OBU_HAS_SIZE_BIT != 0;

        if has_size_field {
            let rest = payload.slice(header_size..);
            let (obu_size, leb_size) = read_leb128(&rest);
            if leb_size == 0 {
                break;
            }
            let total = header_size + leb_size + obu_size as usize;
            if total > payload.len() {
                break;
            }
            let mut obu = BytesMut::new();
            obu.extend_from_slice(&payload[0..header_size]);
            obu.extend_from_slice(&payload[header_size + leb_size..total]);
            obus.push(obu.freeze());
            payload = payload.slice(total..);
        } else {
            obus.push(payload.clone());
            break;
        }
    }
    obus
}

/// Av1Payloader fragments an AV1 temporal unit (a sequence of OBUs) into one
/// or more RTP payloads (<https://aomediacodec.github.io/av1-rtp-spec/>).
#[derive(Default, Debug, Clone)]
pub struct Av1Payloader;

impl Payloader for Av1Payloader {
    fn payload(&mut self, mtu: usize, payload: &Bytes) -> Result<Vec<Bytes>> {
        if payload.is_empty() || mtu == 0 {
            return Ok(vec![]);
        }

        let obus: Vec<Bytes> = split_obus(payload.clone())
            .into_iter()
            .filter(|obu| {
                !obu.is_empty() && (obu[0] >> 3) & 0x0f != OBU_TYPE_TEMPORAL_DELIMITER
            })
            .collect();
        if obus.is_empty() {
            return Err(Error::ErrShortPacket);
        }

        let mut packets = Vec::new();
        let mut current = BytesMut::new();
        current.put_u8(0);
        let mut obu_count_in_packet: u8 = 0;

        for (i, obu) in obus.iter().enumerate() {
            let is_last_obu = i == obus.len() - 1;
            let mut elem = BytesMut::new();
            if !is_last_obu {
                write_leb128(&mut elem, obu.len() as u32);
            }
            elem.extend_from_slice(obu);

            if current.len() > 1 && current.len() + elem.len() > mtu {
                packets.push(current.split().freeze());
                current.put_u8(0);
                obu_count_in_packet = 0;
            }
            current.extend_from_slice(&elem);
            obu_count_in_packet = obu_count_in_packet.saturating_add(1);
            let _ = obu_count_in_packet;
        }
        if current.len() > 1 {
            packets.push(current.freeze());
        }
        Ok(packets)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn payloads_single_small_obu() {
        let mut p = Av1Payloader;
        // header byte: type=OBU_FRAME(6)<<3, has_size_field bit set, payload size 3
        let obu = Bytes::from_static(&[0b0011_0010, 0x03, 1, 2, 3]);
        let packets = p.payload(1200, &obu).unwrap();
        assert_eq!(packets.len(), 1);
    }

    #[test]
    fn empty_payload_yields_no_packets() {
        let mut p = Av1Payloader;
        let packets = p.payload(1200, &Bytes::new()).unwrap();
        assert!(packets.is_empty());
    }
}
