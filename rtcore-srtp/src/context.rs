//! The SRTP/SRTCP session: per-SSRC read streams with replay protection
//! and rollover tracking, and a single keyed write path, built on top of
//! [`crate::cipher::Cipher`].

use std::collections::{HashMap, VecDeque};

use shared::error::{Error, Result};
use shared::replay_detector::{ReplayDetector, SlidingWindowDetector};

use crate::cipher::Cipher;
use crate::config::Config;

/// Default anti-replay window, in packets, for both SRTP and SRTCP streams.
pub const DEFAULT_REPLAY_WINDOW: u64 = 64;

/// How many packets for a not-yet-opened SSRC are buffered before being
/// dropped, closing the race between a stream's first packet arriving and
/// its `open_read_stream` call.
const PENDING_SSRC_BUFFER: usize = 8;

struct RolloverState {
    roc: u32,
    highest_seq: u16,
    initialized: bool,
}

impl RolloverState {
    fn new() -> Self {
        RolloverState {
            roc: 0,
            highest_seq: 0,
            initialized: false,
        }
    }

    /// Guesses the rollover counter for an arriving 16-bit sequence number
    /// (RFC3711 Appendix A) and, if this packet extends the known window,
    /// commits it as the new high-water mark.
    fn roc_for(&mut self, seq: u16) -> u32 {
        if !self.initialized {
            self.initialized = true;
            self.highest_seq = seq;
            return self.roc;
        }

        let guessed = guess_roc(self.roc, self.highest_seq, seq);
        let current_index = ((self.roc as u64) << 16) | self.highest_seq as u64;
        let candidate_index = ((guessed as u64) << 16) | seq as u64;
        if candidate_index > current_index {
            self.roc = guessed;
            self.highest_seq = seq;
        }
        guessed
    }
}

fn guess_roc(roc: u32, highest_seq: u16, seq: u16) -> u32 {
    let s_l = highest_seq as i64;
    let seq = seq as i64;
    if s_l < 32_768 {
        if seq - s_l > 32_768 {
            roc.wrapping_sub(1)
        } else {
            roc
        }
    } else if s_l - 32_768 > seq {
        roc.wrapping_add(1)
    } else {
        roc
    }
}

struct ReadStreamState {
    rollover: RolloverState,
    replay: SlidingWindowDetector,
}

struct WriteStream {
    rollover: RolloverState,
}

/// A handle returned by [`Context::open_read_stream`]. Carries no state of
/// its own; all decryption happens through [`Context::decrypt_rtp`] once the
/// stream is open.
#[derive(Debug, Clone, Copy)]
pub struct ReadStream {
    pub ssrc: u32,
}

/// A handle returned by [`Context::open_write_stream`]. A single write
/// stream serves every outbound SSRC; packets are encrypted keyed by the
/// SSRC already present in their header.
#[derive(Debug, Clone, Copy)]
pub struct WriteStreamHandle;

pub struct Context {
    read_cipher: Cipher,
    write_cipher: Cipher,
    replay_window: u64,
    read_streams: HashMap<u32, ReadStreamState>,
    write_streams: HashMap<u32, WriteStream>,
    srtcp_read_index: HashMap<u32, SlidingWindowDetector>,
    srtcp_write_index: HashMap<u32, u32>,
    pending: HashMap<u32, VecDeque<Vec<u8>>>,
}

impl Context {
    pub fn new(config: Config) -> Result<Self> {
        Self::with_replay_window(config, DEFAULT_REPLAY_WINDOW)
    }

    pub fn with_replay_window(config: Config, replay_window: u64) -> Result<Self> {
        let read_cipher = Cipher::new(
            config.profile,
            &config.remote.master_key,
            &config.remote.master_salt,
        )?;
        let write_cipher = Cipher::new(
            config.profile,
            &config.local.master_key,
            &config.local.master_salt,
        )?;
        Ok(Context {
            read_cipher,
            write_cipher,
            replay_window,
            read_streams: HashMap::new(),
            write_streams: HashMap::new(),
            srtcp_read_index: HashMap::new(),
            srtcp_write_index: HashMap::new(),
            pending: HashMap::new(),
        })
    }

    /// Opens a read stream for `ssrc`, returning the handle and any packets
    /// that arrived (and were buffered) for this SSRC before it was opened,
    /// decrypted and in arrival order.
    pub fn open_read_stream(&mut self, ssrc: u32) -> (ReadStream, Vec<Result<Vec<u8>>>) {
        self.read_streams
            .entry(ssrc)
            .or_insert_with(|| ReadStreamState {
                rollover: RolloverState::new(),
                replay: SlidingWindowDetector::new(self.replay_window, u32::MAX as u64),
            });

        let backlog = self.pending.remove(&ssrc).unwrap_or_default();
        let drained = backlog
            .into_iter()
            .map(|mut packet| self.decrypt_rtp(&mut packet).map(|_| packet))
            .collect();

        (ReadStream { ssrc }, drained)
    }

    pub fn open_write_stream(&mut self) -> WriteStreamHandle {
        WriteStreamHandle
    }

    /// Decrypts an SRTP packet in place. If `ssrc` has no open read stream
    /// yet, the packet is buffered (bounded) and
    /// [`Error::SsrcMissingFromSrtp`] is returned.
    pub fn decrypt_rtp(&mut self, packet: &mut Vec<u8>) -> Result<u32> {
        let ssrc = rtp_ssrc(packet)?;
        let sequence_number = rtp_sequence_number(packet)?;
        let header_len = rtp_header_len(packet)?;

        let Some(stream) = self.read_streams.get_mut(&ssrc) else {
            let backlog = self.pending.entry(ssrc).or_default();
            if backlog.len() == PENDING_SSRC_BUFFER {
                backlog.pop_front();
            }
            backlog.push_back(packet.clone());
            return Err(Error::SsrcMissingFromSrtp(ssrc));
        };

        let roc = stream.rollover.roc_for(sequence_number);
        let index = ((roc as u64) << 16) | sequence_number as u64;
        if !stream.replay.check(index) {
            return Err(Error::SrtpSsrcDuplicated(ssrc, sequence_number));
        }

        self.read_cipher
            .decrypt_rtp(packet, header_len, ssrc, roc, sequence_number)?;
        Ok(ssrc)
    }

    /// Encrypts an outbound RTP packet in place, keyed by the SSRC already
    /// present in its header.
    pub fn encrypt_rtp(&mut self, _stream: WriteStreamHandle, packet: &mut Vec<u8>) -> Result<()> {
        let ssrc = rtp_ssrc(packet)?;
        let sequence_number = rtp_sequence_number(packet)?;
        let header_len = rtp_header_len(packet)?;

        let stream = self
            .write_streams
            .entry(ssrc)
            .or_insert_with(|| WriteStream {
                rollover: RolloverState::new(),
            });
        let roc = stream.rollover.roc_for(sequence_number);

        self.write_cipher
            .encrypt_rtp(packet, header_len, ssrc, roc, sequence_number)
    }

    pub fn decrypt_rtcp(&mut self, packet: &mut Vec<u8>) -> Result<u32> {
        if packet.len() < 12 {
            return Err(Error::ErrBufferTooSmall);
        }
        let ssrc = u32::from_be_bytes(packet[4..8].try_into().expect("4 bytes"));
        let index_offset = packet.len() - 4;
        let index_and_flag = u32::from_be_bytes(packet[index_offset..].try_into().expect("4 bytes"));
        let encrypted = index_and_flag & 0x8000_0000 != 0;
        let index = index_and_flag & 0x7fff_ffff;

        let detector = self
            .srtcp_read_index
            .entry(ssrc)
            .or_insert_with(|| SlidingWindowDetector::new(self.replay_window, 0x7fff_ffff));
        if !detector.check(index as u64) {
            return Err(Error::SrtpSsrcDuplicated(ssrc, index as u16));
        }

        self.read_cipher
            .decrypt_rtcp(packet, 8, ssrc, index, encrypted)?;
        Ok(ssrc)
    }

    pub fn encrypt_rtcp(&mut self, _stream: WriteStreamHandle, packet: &mut Vec<u8>) -> Result<()> {
        if packet.len() < 8 {
            return Err(Error::ErrBufferTooSmall);
        }
        let ssrc = u32::from_be_bytes(packet[4..8].try_into().expect("4 bytes"));
        let index = self.srtcp_write_index.entry(ssrc).or_insert(0);
        *index = (*index + 1) & 0x7fff_ffff;
        let index = *index;

        self.write_cipher.encrypt_rtcp(packet, 8, ssrc, index)
    }
}

fn rtp_header_len(packet: &[u8]) -> Result<usize> {
    if packet.len() < 12 {
        return Err(Error::ErrTooShortRtp);
    }
    let cc = (packet[0] & 0x0f) as usize;
    let extension = packet[0] & 0x10 != 0;
    let mut len = 12 + cc * 4;
    if extension {
        if packet.len() < len + 4 {
            return Err(Error::ErrTooShortRtp);
        }
        let ext_words = u16::from_be_bytes(packet[len + 2..len + 4].try_into().expect("2 bytes"));
        len += 4 + ext_words as usize * 4;
    }
    if packet.len() < len {
        return Err(Error::ErrTooShortRtp);
    }
    Ok(len)
}

fn rtp_ssrc(packet: &[u8]) -> Result<u32> {
    if packet.len() < 12 {
        return Err(Error::ErrTooShortRtp);
    }
    Ok(u32::from_be_bytes(packet[8..12].try_into().expect("4 bytes")))
}

fn rtp_sequence_number(packet: &[u8]) -> Result<u16> {
    if packet.len() < 4 {
        return Err(Error::ErrTooShortRtp);
    }
    Ok(u16::from_be_bytes(packet[2..4].try_into().expect("2 bytes")))
}
