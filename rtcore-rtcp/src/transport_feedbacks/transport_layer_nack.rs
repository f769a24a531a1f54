use std::any::Any;

use bytes::Buf;
use shared::error::{Error, Result};
use shared::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::header::{Header, PacketType, HEADER_LENGTH};
use crate::packet::Packet;

const NACK_PAIR_LENGTH: usize = 4;
const TLN_LENGTH: usize = 2;

/// NackPair is a packet id plus a bitmask of 16 packets following it that
/// were also lost (RFC4585 section 6.2.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NackPair {
    pub packet_id: u16,
    pub lost_packets: u16,
}

impl NackPair {
    /// Returns every sequence number (packet_id plus any bit set in the
    /// bitmask) this pair reports as lost.
    pub fn packet_list(&self) -> Vec<u16> {
        let mut out = vec![self.packet_id];
        for i in 0..16 {
            if self.lost_packets & (1 << i) != 0 {
                out.push(self.packet_id.wrapping_add(i + 1));
            }
        }
        out
    }
}

/// Builds a minimal set of NackPairs covering exactly `sequence_numbers`.
pub fn nack_pairs_from_sequence_numbers(sequence_numbers: &[u16]) -> Vec<NackPair> {
    if sequence_numbers.is_empty() {
        return Vec::new();
    }
    let mut pairs = Vec::new();
    let mut packet_id = sequence_numbers[0];
    let mut lost_packets: u16 = 0;
    for &seq in &sequence_numbers[1..] {
        let delta = seq.wrapping_sub(packet_id).wrapping_sub(1);
        if seq.wrapping_sub(packet_id) <= 16 {
            lost_packets |= 1 << delta;
        } else {
            pairs.push(NackPair {
                packet_id,
                lost_packets,
            });
            packet_id = seq;
            lost_packets = 0;
        }
    }
    pairs.push(NackPair {
        packet_id,
        lost_packets,
    });
    pairs
}

/// TransportLayerNack signals which RTP packets the receiver is missing
/// (RFC4585 section 6.2.1).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransportLayerNack {
    pub sender_ssrc: u32,
    pub media_ssrc: u32,
    pub nacks: Vec<NackPair>,
}

impl MarshalSize for TransportLayerNack {
    fn marshal_size(&self) -> usize {
        HEADER_LENGTH + TLN_LENGTH * 4 + self.nacks.len() * NACK_PAIR_LENGTH
    }
}

impl Marshal for TransportLayerNack {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        let body = TLN_LENGTH * 4 + self.nacks.len() * NACK_PAIR_LENGTH;
        let size = HEADER_LENGTH + body;
        if buf.len() < size {
            return Err(Error::PacketTooShort);
        }
        let header = Header {
            padding: false,
            count: crate::header::format::TRANSPORT_LAYER_NACK,
            packet_type: PacketType::TransportSpecificFeedback,
            length: crate::header::length_in_words(body)?,
        };
        let n = header.marshal_to(buf)?;
        let mut idx = n;
        buf[idx..idx + 4].copy_from_slice(&self.sender_ssrc.to_be_bytes());
        idx += 4;
        buf[idx..idx + 4].copy_from_slice(&self.media_ssrc.to_be_bytes());
        idx += 4;
        for pair in &self.nacks {
            buf[idx..idx + 2].copy_from_slice(&pair.packet_id.to_be_bytes());
            buf[idx + 2..idx + 4].copy_from_slice(&pair.lost_packets.to_be_bytes());
            idx += 4;
        }
        Ok(idx)
    }
}

impl Unmarshal for TransportLayerNack {
    fn unmarshal<B>(buf: &mut B) -> Result<Self>
    where
        B: Buf,
    {
        if buf.remaining() < HEADER_LENGTH {
            return Err(Error::PacketTooShort);
        }
        let header = Header::unmarshal(buf)?;
        if header.packet_type != PacketType::TransportSpecificFeedback
            || header.count != crate::header::format::TRANSPORT_LAYER_NACK
        {
            return Err(Error::WrongFeedbackType);
        }
        let body_len = (header.length as usize + 1) * 4 - HEADER_LENGTH;
        if buf.remaining() < body_len || body_len < 8 {
            return Err(Error::PacketTooShort);
        }
        let sender_ssrc = buf.get_u32();
        let media_ssrc = buf.get_u32();
        let remaining = body_len - 8;
        if remaining % NACK_PAIR_LENGTH != 0 {
            return Err(Error::PacketTooShort);
        }
        let mut nacks = Vec::with_capacity(remaining / NACK_PAIR_LENGTH);
        for _ in 0..(remaining / NACK_PAIR_LENGTH) {
            nacks.push(NackPair {
                packet_id: buf.get_u16(),
                lost_packets: buf.get_u16(),
            });
        }
        Ok(TransportLayerNack {
            sender_ssrc,
            media_ssrc,
            nacks,
        })
    }
}

impl Packet for TransportLayerNack {
    fn destination_ssrc(&self) -> Vec<u32> {
        vec![self.media_ssrc]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equal(&self, other: &dyn Packet) -> bool {
        other
            .as_any()
            .downcast_ref::<TransportLayerNack>()
            .is_some_and(|o| o == self)
    }

    fn cloned(&self) -> Box<dyn Packet> {
        Box::new(self.clone())
    }
}
