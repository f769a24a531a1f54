use bytes::Bytes;
use shared::error::Result;

use crate::header::Header;
use crate::packet::Packet;
use crate::sequence::Sequencer;

/// Payloader fragments one media sample into RTP-payload-sized chunks.
pub trait Payloader {
    fn payload(&mut self, mtu: usize, payload: &Bytes) -> Result<Vec<Bytes>>;
}

/// Depacketizer reassembles RTP payloads belonging to one codec back into
/// decodable media samples.
pub trait Depacketizer {
    fn depacketize(&mut self, payload: &Bytes) -> Result<Bytes>;
    /// True if `payload` starts a new partition (e.g. a new video frame).
    fn is_partition_head(&self, payload: &Bytes) -> bool;
    /// True if `payload` is the last packet of its partition.
    fn is_partition_tail(&self, marker: bool, payload: &Bytes) -> bool;
}

/// Packetizer turns media samples into a sequence of RTP packets, handling
/// header fields (sequence number, timestamp, marker bit) on the caller's
/// behalf.
pub trait Packetizer: Send {
    fn packetize(&mut self, payload: &Bytes, samples: u32) -> Result<Vec<Packet>>;
    fn enable_abs_send_time(&mut self, value: u8);
    fn skip_samples(&mut self, skipped_samples: u32);
}

struct PacketizerImpl {
    mtu: usize,
    payload_type: u8,
    ssrc: u32,
    payloader: Box<dyn Payloader + Send>,
    sequencer: Box<dyn Sequencer>,
    clock_rate: u32,
    timestamp: u32,
    abs_send_time_ext_id: u8,
}

impl Packetizer for PacketizerImpl {
    fn packetize(&mut self, payload: &Bytes, samples: u32) -> Result<Vec<Packet>> {
        let payloads = self.payloader.payload(self.mtu, payload)?;
        let count = payloads.len();
        let mut packets = Vec::with_capacity(count);
        for (i, p) in payloads.into_iter().enumerate() {
            let mut header = Header {
                version: crate::header::VERSION,
                payload_type: self.payload_type,
                sequence_number: self.sequencer.next_sequence_number(),
                timestamp: self.timestamp,
                ssrc: self.ssrc,
                marker: i == count - 1,
                ..Default::default()
            };
            if self.abs_send_time_ext_id != 0 {
                let send_time = crate::extension::abs_send_time_extension::AbsSendTimeExtension::new(
                    std::time::SystemTime::now(),
                );
                if let Ok(data) = send_time.marshal() {
                    let _ = header.set_extension(self.abs_send_time_ext_id, data);
                }
            }
            packets.push(Packet { header, payload: p });
        }
        self.timestamp = self.timestamp.wrapping_add(samples);
        Ok(packets)
    }

    fn enable_abs_send_time(&mut self, value: u8) {
        self.abs_send_time_ext_id = value;
    }

    fn skip_samples(&mut self, skipped_samples: u32) {
        self.timestamp = self.timestamp.wrapping_add(skipped_samples);
    }
}

/// Builds a [`Packetizer`] for packetizing media samples into RTP packets of
/// at most `mtu` bytes, stamped with `payload_type`/`ssrc` and `clock_rate`
/// ticks per second.
pub fn new_packetizer(
    mtu: usize,
    payload_type: u8,
    ssrc: u32,
    payloader: Box<dyn Payloader + Send>,
    sequencer: Box<dyn Sequencer>,
    clock_rate: u32,
) -> impl Packetizer {
    PacketizerImpl {
        mtu,
        payload_type,
        ssrc,
        payloader,
        sequencer,
        clock_rate,
        timestamp: rand::random::<u32>(),
        abs_send_time_ext_id: 0,
    }
}
