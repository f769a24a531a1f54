use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Buf;
use shared::error::{Error, Result};

const ABS_SEND_TIME_EXTENSION_SIZE: usize = 3;

/// Offset (in seconds) between the NTP epoch (1900-01-01) and the Unix
/// epoch (1970-01-01).
const NTP_EPOCH_OFFSET_SECS: u64 = 2_208_988_800;

/// Converts a wall-clock time into an NTP 64-bit timestamp (32.32 fixed
/// point seconds since 1900), as used by RTCP sender reports and the
/// abs-send-time header extension.
pub fn unix2ntp(t: SystemTime) -> u64 {
    let dur = t.duration_since(UNIX_EPOCH).unwrap_or_default();
    let secs = dur.as_secs() + NTP_EPOCH_OFFSET_SECS;
    let frac = ((dur.subsec_nanos() as u64) << 32) / 1_000_000_000;
    (secs << 32) | frac
}

/// Converts an NTP 64-bit timestamp back into a wall-clock time.
pub fn ntp2unix(ntp: u64) -> SystemTime {
    let secs = (ntp >> 32).saturating_sub(NTP_EPOCH_OFFSET_SECS);
    let frac = ntp & 0xffff_ffff;
    let nanos = (frac * 1_000_000_000) >> 32;
    UNIX_EPOCH + std::time::Duration::new(secs, nanos as u32)
}

/// AbsSendTimeExtension carries the sender's transmit time as a 24-bit,
/// 6.18 fixed-point number of seconds since the NTP epoch (one-byte header
/// extension, draft-holmer-rmcat-transport-wide-cc-extensions companion
/// `http://www.webrtc.org/experiments/rtp-hdrext/abs-send-time`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AbsSendTimeExtension {
    pub timestamp: u64,
}

impl AbsSendTimeExtension {
    /// Builds an extension carrying `sent_time` truncated to 6.18 fixed
    /// point, the format transmitted over the wire.
    pub fn new(sent_time: SystemTime) -> Self {
        AbsSendTimeExtension {
            timestamp: unix2ntp(sent_time) >> 14,
        }
    }

    pub fn marshal_size(&self) -> usize {
        ABS_SEND_TIME_EXTENSION_SIZE
    }

    pub fn marshal(&self) -> Result<bytes::Bytes> {
        let b = self.timestamp.to_be_bytes();
        Ok(bytes::Bytes::copy_from_slice(&b[5..8]))
    }

    pub fn unmarshal<B: Buf>(buf: &mut B) -> Result<Self> {
        if buf.remaining() < ABS_SEND_TIME_EXTENSION_SIZE {
            return Err(Error::ErrShortPacket);
        }
        let b0 = buf.get_u8();
        let b1 = buf.get_u8();
        let b2 = buf.get_u8();
        let timestamp = ((b0 as u64) << 16) | ((b1 as u64) << 8) | b2 as u64;
        Ok(AbsSendTimeExtension { timestamp })
    }
}
