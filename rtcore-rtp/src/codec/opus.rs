use bytes::Bytes;
use shared::error::Result;

use crate::packetizer::{Depacketizer, Payloader};

/// OpusPayloader carries one Opus packet per RTP payload unchanged, as
/// RFC7587 doesn't define any fragmentation or aggregation.
#[derive(Default, Debug, Clone)]
pub struct OpusPayloader;

impl Payloader for OpusPayloader {
    fn payload(&mut self, _mtu: usize, payload: &Bytes) -> Result<Vec<Bytes>> {
        if payload.is_empty() {
            return Ok(vec![]);
        }
        Ok(vec![payload.clone()])
    }
}

/// OpusDepacketizer is the identity transform: each RTP payload already is
/// one decodable Opus packet.
#[derive(Default, Debug, Clone)]
pub struct OpusDepacketizer;

impl Depacketizer for OpusDepacketizer {
    fn depacketize(&mut self, packet: &Bytes) -> Result<Bytes> {
        Ok(packet.clone())
    }

    fn is_partition_head(&self, _payload: &Bytes) -> bool {
        true
    }

    fn is_partition_tail(&self, _marker: bool, _payload: &Bytes) -> bool {
        true
    }
}
