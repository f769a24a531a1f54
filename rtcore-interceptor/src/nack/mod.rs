//! NACK (Negative Acknowledgement) Interceptors
//!
//! This module provides interceptors for handling RTCP NACK feedback:
//!
//! - [`NackGeneratorInterceptor`]: Monitors incoming RTP packets and generates
//!   NACK requests for missing packets.
//! - [`NackResponderInterceptor`]: Buffers outgoing RTP packets and retransmits
//!   them when NACK requests are received.
//!
//! # NACK Support Detection
//!
//! Both interceptors check if a stream supports NACK by looking for an RTCPFeedback
//! entry with `type: "nack"` and empty `parameter`. Streams without NACK support
//! are passed through without modification.
//!
//! # Example
//!
//! ```ignore
//! use rtcore_interceptor::{Registry, NackGeneratorBuilder, NackResponderBuilder};
//! use std::time::Duration;
//!
//! let chain = Registry::new()
//!     .with(NackGeneratorBuilder::new()
//!         .with_size(512)
//!         .with_interval(Duration::from_millis(100))
//!         .build())
//!     .with(NackResponderBuilder::new()
//!         .with_size(1024)
//!         .build())
//!     .build();
//! ```

pub(crate) mod generator;
pub(crate) mod receive_log;
pub(crate) mod responder;
pub(crate) mod send_buffer;

use crate::stream_info::StreamInfo;

/// Check if a stream supports NACK feedback.
///
/// Returns `true` if the stream has an RTCPFeedback entry with `type: "nack"`
/// and empty `parameter`.
pub(crate) fn stream_supports_nack(info: &StreamInfo) -> bool {
    info.rtcp_feedback
        .iter()
        .any(|fb| fb.typ == "nack" && fb.parameter.is_empty())
}
