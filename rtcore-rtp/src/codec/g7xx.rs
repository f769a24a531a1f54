use bytes::Bytes;
use shared::error::Result;

use crate::packetizer::{Depacketizer, Payloader};

/// G7xxPayloader carries one RTP payload per media sample unchanged. It
/// backs the narrowband codecs (G722, PCMU, PCMA) and telephone-event, none
/// of which define any RTP-layer fragmentation or aggregation.
#[derive(Default, Debug, Clone)]
pub struct G7xxPayloader;

impl Payloader for G7xxPayloader {
    fn payload(&mut self, _mtu: usize, payload: &Bytes) -> Result<Vec<Bytes>> {
        if payload.is_empty() {
            return Ok(vec![]);
        }
        Ok(vec![payload.clone()])
    }
}

/// G7xxDepacketizer is the identity transform for these codecs.
#[derive(Default, Debug, Clone)]
pub struct G7xxDepacketizer;

impl Depacketizer for G7xxDepacketizer {
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
