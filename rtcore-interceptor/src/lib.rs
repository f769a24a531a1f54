#![warn(rust_2018_idioms)]
#![allow(dead_code)]

pub mod nack;
mod noop;
mod registry;
pub mod report;
pub mod stream_info;
pub mod twcc;

use std::time::Instant;

pub use interceptor_derive::interceptor;
pub use interceptor_derive::Interceptor as InterceptorDerive;
pub use nack::generator::NackGeneratorBuilder;
pub use nack::responder::NackResponderBuilder;
pub use noop::NoopInterceptor;
pub use registry::Registry;
pub use report::receiver::ReceiverReportBuilder;
pub use report::sender::SenderReportBuilder;
pub use stream_info::{RTCPFeedback, RTPHeaderExtension, StreamInfo};
pub use twcc::receiver::TwccReceiverBuilder;
pub use twcc::sender::TwccSenderBuilder;

use shared::TransportContext;

/// A single RTP or (compound) RTCP packet moving through an interceptor chain.
#[derive(Debug, Clone)]
pub enum Packet {
    Rtp(rtp::Packet),
    Rtcp(Vec<Box<dyn rtcp::packet::Packet>>),
}

impl PartialEq for Packet {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Packet::Rtp(a), Packet::Rtp(b)) => a == b,
            (Packet::Rtcp(a), Packet::Rtcp(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equal(y.as_ref()))
            }
            _ => false,
        }
    }
}

/// A packet plus the timestamp and transport it was read from or is being
/// written to. This is the message type every link in an interceptor chain
/// reads and writes.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedPacket {
    pub now: Instant,
    pub transport: TransportContext,
    pub message: Packet,
}

/// A single link in an interceptor chain.
///
/// Every link reads and writes [`TaggedPacket`]s like any other
/// `sansio::Protocol`, and additionally learns about the local/remote media
/// streams flowing through it via `bind_*_stream`/`unbind_*_stream`, so it
/// can set up or tear down per-stream state (NACK receive logs, TWCC
/// recorders, RTCP report generators, ...).
pub trait Interceptor: sansio::Protocol<TaggedPacket, TaggedPacket, ()> {
    /// A local (outgoing) stream was added to the PeerConnection.
    fn bind_local_stream(&mut self, info: &StreamInfo);
    /// A local stream was removed.
    fn unbind_local_stream(&mut self, info: &StreamInfo);
    /// A remote (incoming) stream was negotiated.
    fn bind_remote_stream(&mut self, info: &StreamInfo);
    /// A remote stream was removed.
    fn unbind_remote_stream(&mut self, info: &StreamInfo);
}
