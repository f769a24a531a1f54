use std::any::Any;

use bytes::Buf;
use shared::error::{Error, Result};
use shared::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::header::{Header, PacketType, HEADER_LENGTH};
use crate::packet::Packet;
use crate::util::get_padding_size;

/// Bytes of fixed fields following the RTCP header: sender ssrc (4), media
/// ssrc (4), base sequence number (2), packet status count (2), reference
/// time (3) + fb packet count (1).
const FIXED_BODY_LENGTH: usize = 16;

const TYPE_TCC_RUN_LENGTH_CHUNK: u16 = 0;
const TYPE_TCC_STATUS_VECTOR_CHUNK: u16 = 1;

const TYPE_TCC_SYMBOL_SIZE_ONE_BIT: u16 = 0;
const TYPE_TCC_SYMBOL_SIZE_TWO_BIT: u16 = 1;

/// SymbolTypeTcc is the reception status of a single packet inside a
/// transport-wide congestion control feedback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymbolTypeTcc {
    #[default]
    PacketNotReceived = 0,
    PacketReceivedSmallDelta = 1,
    PacketReceivedLargeDelta = 2,
    PacketReceivedWithoutDelta = 3,
}

impl From<u16> for SymbolTypeTcc {
    fn from(v: u16) -> Self {
        match v {
            1 => SymbolTypeTcc::PacketReceivedSmallDelta,
            2 => SymbolTypeTcc::PacketReceivedLargeDelta,
            3 => SymbolTypeTcc::PacketReceivedWithoutDelta,
            _ => SymbolTypeTcc::PacketNotReceived,
        }
    }
}

/// PacketStatusChunk is one 2-byte chunk of packet reception symbols, either
/// run-length or vector encoded (draft-holmer-rmcat-transport-wide-cc-extensions
/// section 3.1.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PacketStatusChunk {
    RunLength {
        symbol: SymbolTypeTcc,
        run_length: u16,
    },
    StatusVector {
        two_bit: bool,
        symbols: Vec<SymbolTypeTcc>,
    },
}

impl PacketStatusChunk {
    fn marshal_u16(&self) -> Result<u16> {
        match self {
            PacketStatusChunk::RunLength { symbol, run_length } => {
                if *run_length > 0x1fff {
                    return Err(Error::PacketTooShort);
                }
                Ok((TYPE_TCC_RUN_LENGTH_CHUNK << 15) | ((*symbol as u16) << 13) | run_length)
            }
            PacketStatusChunk::StatusVector { two_bit, symbols } => {
                let (max_len, width) = if *two_bit { (7usize, 2u16) } else { (14usize, 1u16) };
                if symbols.len() > max_len {
                    return Err(Error::PacketTooShort);
                }
                let mut v: u16 = (TYPE_TCC_STATUS_VECTOR_CHUNK << 15)
                    | ((if *two_bit {
                        TYPE_TCC_SYMBOL_SIZE_TWO_BIT
                    } else {
                        TYPE_TCC_SYMBOL_SIZE_ONE_BIT
                    }) << 14);
                let mut shift: i32 = 14 - width as i32;
                for s in symbols {
                    v |= (*s as u16) << shift;
                    shift -= width as i32;
                }
                Ok(v)
            }
        }
    }

    fn parse(raw: u16) -> Self {
        if raw >> 15 == TYPE_TCC_RUN_LENGTH_CHUNK {
            let symbol = SymbolTypeTcc::from((raw >> 13) & 0x3);
            let run_length = raw & 0x1fff;
            PacketStatusChunk::RunLength { symbol, run_length }
        } else {
            let two_bit = ((raw >> 14) & 0x1) == TYPE_TCC_SYMBOL_SIZE_TWO_BIT;
            let width: i32 = if two_bit { 2 } else { 1 };
            let count = if two_bit { 7 } else { 14 };
            let mut symbols = Vec::with_capacity(count);
            let mut shift: i32 = 14 - width;
            for _ in 0..count {
                let sym = (raw >> shift) & ((1 << width) - 1);
                symbols.push(SymbolTypeTcc::from(sym));
                shift -= width;
            }
            PacketStatusChunk::StatusVector { two_bit, symbols }
        }
    }
}

/// RecvDelta is the arrival-time delta for one received packet, in 250
/// microsecond ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecvDelta {
    pub type_tcc_packet: SymbolTypeTcc,
    pub delta: i64,
}

fn delta_marshal_size(d: &RecvDelta) -> usize {
    match d.type_tcc_packet {
        SymbolTypeTcc::PacketReceivedLargeDelta => 2,
        SymbolTypeTcc::PacketReceivedSmallDelta => 1,
        _ => 0,
    }
}

/// TransportLayerCc reports per-packet arrival times for every packet in a
/// transport-wide sequence number range, used to estimate available
/// bandwidth (draft-holmer-rmcat-transport-wide-cc-extensions).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransportLayerCc {
    pub sender_ssrc: u32,
    pub media_ssrc: u32,
    pub base_sequence_number: u16,
    pub packet_status_count: u16,
    pub reference_time: u32,
    pub fb_pkt_count: u8,
    pub packet_chunks: Vec<PacketStatusChunk>,
    pub recv_deltas: Vec<RecvDelta>,
}

impl MarshalSize for TransportLayerCc {
    fn marshal_size(&self) -> usize {
        let delta_bytes: usize = self.recv_deltas.iter().map(delta_marshal_size).sum();
        let body = FIXED_BODY_LENGTH + self.packet_chunks.len() * 2 + delta_bytes;
        HEADER_LENGTH + body + get_padding_size(body)
    }
}

impl Marshal for TransportLayerCc {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        let size = self.marshal_size();
        if buf.len() < size {
            return Err(Error::PacketTooShort);
        }
        let body = size - HEADER_LENGTH;
        let padding = get_padding_size(body);
        let header = Header {
            padding: padding != 0,
            count: crate::header::format::TRANSPORT_LAYER_CC,
            packet_type: PacketType::TransportSpecificFeedback,
            length: crate::header::length_in_words(body)?,
        };
        let mut idx = header.marshal_to(buf)?;

        buf[idx..idx + 4].copy_from_slice(&self.sender_ssrc.to_be_bytes());
        idx += 4;
        buf[idx..idx + 4].copy_from_slice(&self.media_ssrc.to_be_bytes());
        idx += 4;
        buf[idx..idx + 2].copy_from_slice(&self.base_sequence_number.to_be_bytes());
        idx += 2;
        buf[idx..idx + 2].copy_from_slice(&self.packet_status_count.to_be_bytes());
        idx += 2;
        let ref_bytes = self.reference_time.to_be_bytes();
        buf[idx..idx + 3].copy_from_slice(&ref_bytes[1..4]);
        idx += 3;
        buf[idx] = self.fb_pkt_count;
        idx += 1;

        for chunk in &self.packet_chunks {
            buf[idx..idx + 2].copy_from_slice(&chunk.marshal_u16()?.to_be_bytes());
            idx += 2;
        }
        for d in &self.recv_deltas {
            match d.type_tcc_packet {
                SymbolTypeTcc::PacketReceivedSmallDelta => {
                    buf[idx] = d.delta as u8;
                    idx += 1;
                }
                SymbolTypeTcc::PacketReceivedLargeDelta => {
                    buf[idx..idx + 2].copy_from_slice(&(d.delta as i16).to_be_bytes());
                    idx += 2;
                }
                _ => {}
            }
        }
        if padding != 0 {
            for b in &mut buf[idx..idx + padding - 1] {
                *b = 0;
            }
            buf[idx + padding - 1] = padding as u8;
            idx += padding;
        }
        Ok(idx)
    }
}

impl Unmarshal for TransportLayerCc {
    fn unmarshal<B>(buf: &mut B) -> Result<Self>
    where
        B: Buf,
    {
        if buf.remaining() < HEADER_LENGTH {
            return Err(Error::PacketTooShort);
        }
        let header = Header::unmarshal(buf)?;
        if header.packet_type != PacketType::TransportSpecificFeedback
            || header.count != crate::header::format::TRANSPORT_LAYER_CC
        {
            return Err(Error::WrongFeedbackType);
        }
        let body_len = (header.length as usize + 1) * 4 - HEADER_LENGTH;
        if buf.remaining() < body_len || body_len < FIXED_BODY_LENGTH {
            return Err(Error::PacketTooShort);
        }
        let mut body = vec![0u8; body_len];
        buf.copy_to_slice(&mut body);

        let sender_ssrc = u32::from_be_bytes(body[0..4].try_into().unwrap());
        let media_ssrc = u32::from_be_bytes(body[4..8].try_into().unwrap());
        let base_sequence_number = u16::from_be_bytes(body[8..10].try_into().unwrap());
        let packet_status_count = u16::from_be_bytes(body[10..12].try_into().unwrap());
        let reference_time = u32::from_be_bytes([0, body[12], body[13], body[14]]);
        let fb_pkt_count = body[15];

        let mut idx = FIXED_BODY_LENGTH;
        let mut packet_chunks = Vec::new();
        let mut statuses_parsed = 0usize;
        while statuses_parsed < packet_status_count as usize {
            if idx + 2 > body.len() {
                return Err(Error::PacketTooShort);
            }
            let raw = u16::from_be_bytes(body[idx..idx + 2].try_into().unwrap());
            idx += 2;
            let chunk = PacketStatusChunk::parse(raw);
            statuses_parsed += match &chunk {
                PacketStatusChunk::RunLength { run_length, .. } => *run_length as usize,
                PacketStatusChunk::StatusVector { symbols, .. } => symbols.len(),
            };
            packet_chunks.push(chunk);
        }

        let mut recv_deltas = Vec::new();
        let mut emitted = 0usize;
        'outer: for chunk in &packet_chunks {
            let symbols: Vec<SymbolTypeTcc> = match chunk {
                PacketStatusChunk::RunLength { symbol, run_length } => {
                    vec![*symbol; *run_length as usize]
                }
                PacketStatusChunk::StatusVector { symbols, .. } => symbols.clone(),
            };
            for symbol in symbols {
                if emitted >= packet_status_count as usize {
                    break 'outer;
                }
                match symbol {
                    SymbolTypeTcc::PacketReceivedSmallDelta => {
                        if idx >= body.len() {
                            return Err(Error::PacketTooShort);
                        }
                        recv_deltas.push(RecvDelta {
                            type_tcc_packet: symbol,
                            delta: body[idx] as i64,
                        });
                        idx += 1;
                    }
                    SymbolTypeTcc::PacketReceivedLargeDelta => {
                        if idx + 2 > body.len() {
                            return Err(Error::PacketTooShort);
                        }
                        let v = i16::from_be_bytes(body[idx..idx + 2].try_into().unwrap());
                        recv_deltas.push(RecvDelta {
                            type_tcc_packet: symbol,
                            delta: v as i64,
                        });
                        idx += 2;
                    }
                    _ => {}
                }
                emitted += 1;
            }
        }

        Ok(TransportLayerCc {
            sender_ssrc,
            media_ssrc,
            base_sequence_number,
            packet_status_count,
            reference_time,
            fb_pkt_count,
            packet_chunks,
            recv_deltas,
        })
    }
}

impl Packet for TransportLayerCc {
    fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.media_ssrc]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equal(&self, other: &dyn Packet) -> bool {
        other
            .as_any()
            .downcast_ref::<TransportLayerCc>()
            .is_some_and(|o| o == self)
    }

    fn cloned(&self) -> Box<dyn Packet> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_run_length() {
        let cc = TransportLayerCc {
            sender_ssrc: 1,
            media_ssrc: 2,
            base_sequence_number: 10,
            packet_status_count: 3,
            reference_time: 1234,
            fb_pkt_count: 1,
            packet_chunks: vec![PacketStatusChunk::RunLength {
                symbol: SymbolTypeTcc::PacketReceivedSmallDelta,
                run_length: 3,
            }],
            recv_deltas: vec![
                RecvDelta {
                    type_tcc_packet: SymbolTypeTcc::PacketReceivedSmallDelta,
                    delta: 4,
                },
                RecvDelta {
                    type_tcc_packet: SymbolTypeTcc::PacketReceivedSmallDelta,
                    delta: 8,
                },
                RecvDelta {
                    type_tcc_packet: SymbolTypeTcc::PacketReceivedSmallDelta,
                    delta: 12,
                },
            ],
        };
        let raw = cc.marshal().unwrap();
        let mut b = raw.clone();
        let back = TransportLayerCc::unmarshal(&mut b).unwrap();
        assert_eq!(cc, back);
    }

    #[test]
    fn status_vector_chunk_round_trips() {
        let chunk = PacketStatusChunk::StatusVector {
            two_bit: false,
            symbols: vec![
                SymbolTypeTcc::PacketReceivedSmallDelta,
                SymbolTypeTcc::PacketNotReceived,
            ],
        };
        let raw = chunk.marshal_u16().unwrap();
        let back = PacketStatusChunk::parse(raw);
        match back {
            PacketStatusChunk::StatusVector { symbols, .. } => {
                assert_eq!(symbols[0], SymbolTypeTcc::PacketReceivedSmallDelta);
                assert_eq!(symbols[1], SymbolTypeTcc::PacketNotReceived);
            }
            _ => panic!("expected status vector"),
        }
    }
}
