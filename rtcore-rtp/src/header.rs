use bytes::{Buf, Bytes};
use shared::error::{Error, Result};
use shared::marshal::{Marshal, MarshalSize, Unmarshal};

pub const HEADER_LENGTH: usize = 4;
pub const VERSION: u8 = 2;
const SSRC_LENGTH: usize = 4;
const CSRC_LENGTH: usize = 4;
const EXTENSION_PROFILE_ONE_BYTE: u16 = 0xBEDE;
const EXTENSION_PROFILE_TWO_BYTE: u16 = 0x1000;

/// Extension is a single RTP header extension element (RFC8285).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extension {
    pub id: u8,
    pub payload: Bytes,
}

/// Header is the fixed and extension portion of an RTP packet
/// (RFC3550 section 5.1, extensions per RFC8285).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Header {
    pub version: u8,
    pub padding: bool,
    pub extension: bool,
    pub marker: bool,
    pub payload_type: u8,
    pub sequence_number: u16,
    pub timestamp: u32,
    pub ssrc: u32,
    pub csrc: Vec<u32>,
    pub extension_profile: u16,
    pub extensions: Vec<Extension>,
    pub extensions_padding: usize,
}

impl Header {
    /// Returns the one-byte- or two-byte-extension payload carried under
    /// `id`, if the packet carries header extensions and one matches.
    pub fn get_extension(&self, id: u8) -> Option<Bytes> {
        if !self.extension {
            return None;
        }
        self.extensions
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.payload.clone())
    }

    /// Sets (adding or replacing) the extension element with the given id,
    /// enabling header extensions and picking a one-/two-byte profile as
    /// needed to represent `payload`'s length and `id`'s range.
    pub fn set_extension(&mut self, id: u8, payload: Bytes) -> Result<()> {
        if self.extension_profile != EXTENSION_PROFILE_TWO_BYTE
            && (id < 1 || id > 14 || payload.len() > 16)
        {
            if id < 1 {
                return Err(Error::ErrRfc8285twoByteHeaderIdrange);
            }
            if payload.len() > 255 {
                return Err(Error::ErrRfc8285twoByteHeaderSize);
            }
            self.extension_profile = EXTENSION_PROFILE_TWO_BYTE;
        } else if self.extension_profile != EXTENSION_PROFILE_TWO_BYTE {
            self.extension_profile = EXTENSION_PROFILE_ONE_BYTE;
        }

        self.extension = true;
        if let Some(existing) = self.extensions.iter_mut().find(|e| e.id == id) {
            existing.payload = payload;
        } else {
            self.extensions.push(Extension { id, payload });
        }
        Ok(())
    }

    /// Removes the extension element with the given id, if present.
    pub fn del_extension(&mut self, id: u8) -> Result<()> {
        if !self.extension {
            return Err(Error::ErrHeaderExtensionsNotEnabled);
        }
        let before = self.extensions.len();
        self.extensions.retain(|e| e.id != id);
        if self.extensions.len() == before {
            return Err(Error::ErrHeaderExtensionNotFound);
        }
        Ok(())
    }

    fn extensions_payload_size(&self) -> usize {
        let two_byte = self.extension_profile == EXTENSION_PROFILE_TWO_BYTE;
        self.extensions
            .iter()
            .map(|e| if two_byte { 2 + e.payload.len() } else { 1 + e.payload.len() })
            .sum()
    }

    fn extensions_block_size(&self) -> usize {
        if !self.extension || self.extensions.is_empty() {
            return 0;
        }
        let payload = self.extensions_payload_size();
        let padded = payload.div_ceil(4) * 4;
        4 + padded
    }
}

impl MarshalSize for Header {
    fn marshal_size(&self) -> usize {
        HEADER_LENGTH
            + SSRC_LENGTH
            + self.csrc.len() * CSRC_LENGTH
            + self.extensions_block_size()
    }
}

impl Marshal for Header {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        let size = self.marshal_size();
        if buf.len() < size {
            return Err(Error::ErrBufferTooSmall);
        }
        if self.csrc.len() > 0xf {
            return Err(Error::OtherRtpErr("too many CSRC identifiers".to_string()));
        }

        let mut b0 = (VERSION << 6) | (self.csrc.len() as u8);
        if self.padding {
            b0 |= 1 << 5;
        }
        if self.extension {
            b0 |= 1 << 4;
        }
        buf[0] = b0;

        let mut b1 = self.payload_type & 0x7f;
        if self.marker {
            b1 |= 1 << 7;
        }
        buf[1] = b1;
        buf[2..4].copy_from_slice(&self.sequence_number.to_be_bytes());

        let mut idx = 4;
        buf[idx..idx + 4].copy_from_slice(&self.timestamp.to_be_bytes());
        idx += 4;
        buf[idx..idx + 4].copy_from_slice(&self.ssrc.to_be_bytes());
        idx += 4;

        for c in &self.csrc {
            buf[idx..idx + 4].copy_from_slice(&c.to_be_bytes());
            idx += 4;
        }

        if self.extension && !self.extensions.is_empty() {
            buf[idx..idx + 2].copy_from_slice(&self.extension_profile.to_be_bytes());
            idx += 2;
            let len_idx = idx;
            idx += 2;
            let body_start = idx;
            let two_byte = self.extension_profile == EXTENSION_PROFILE_TWO_BYTE;
            for e in &self.extensions {
                if two_byte {
                    buf[idx] = e.id;
                    buf[idx + 1] = e.payload.len() as u8;
                    idx += 2;
                } else {
                    buf[idx] = (e.id << 4) | ((e.payload.len() as u8 - 1) & 0x0f);
                    idx += 1;
                }
                buf[idx..idx + e.payload.len()].copy_from_slice(&e.payload);
                idx += e.payload.len();
            }
            let payload_len = idx - body_start;
            let padded = payload_len.div_ceil(4) * 4;
            for b in &mut buf[idx..body_start + padded] {
                *b = 0;
            }
            idx = body_start + padded;
            let words = (padded / 4) as u16;
            buf[len_idx..len_idx + 2].copy_from_slice(&words.to_be_bytes());
        }

        Ok(idx)
    }
}

impl Unmarshal for Header {
    fn unmarshal<B>(buf: &mut B) -> Result<Self>
    where
        B: Buf,
    {
        if buf.remaining() < HEADER_LENGTH + SSRC_LENGTH {
            return Err(Error::ErrHeaderSizeInsufficient);
        }
        let b0 = buf.get_u8();
        let version = b0 >> 6;
        let padding = (b0 >> 5) & 1 == 1;
        let extension = (b0 >> 4) & 1 == 1;
        let csrc_count = (b0 & 0x0f) as usize;

        let b1 = buf.get_u8();
        let marker = (b1 >> 7) == 1;
        let payload_type = b1 & 0x7f;

        let sequence_number = buf.get_u16();
        let timestamp = buf.get_u32();
        let ssrc = buf.get_u32();

        if buf.remaining() < csrc_count * CSRC_LENGTH {
            return Err(Error::ErrHeaderSizeInsufficient);
        }
        let mut csrc = Vec::with_capacity(csrc_count);
        for _ in 0..csrc_count {
            csrc.push(buf.get_u32());
        }

        let mut extension_profile = 0u16;
        let mut extensions = Vec::new();
        if extension {
            if buf.remaining() < 4 {
                return Err(Error::ErrHeaderSizeInsufficientForExtension);
            }
            extension_profile = buf.get_u16();
            let ext_len_words = buf.get_u16() as usize;
            let ext_len = ext_len_words * 4;
            if buf.remaining() < ext_len {
                return Err(Error::ErrHeaderSizeInsufficientForExtension);
            }
            let mut ext_buf = vec![0u8; ext_len];
            buf.copy_to_slice(&mut ext_buf);
            let mut i = 0;
            let two_byte = extension_profile == EXTENSION_PROFILE_TWO_BYTE;
            while i < ext_buf.len() {
                if two_byte {
                    if i + 2 > ext_buf.len() {
                        break;
                    }
                    let id = ext_buf[i];
                    let len = ext_buf[i + 1] as usize;
                    i += 2;
                    if id == 0 {
                        continue;
                    }
                    if i + len > ext_buf.len() {
                        break;
                    }
                    extensions.push(Extension {
                        id,
                        payload: Bytes::copy_from_slice(&ext_buf[i..i + len]),
                    });
                    i += len;
                } else {
                    let b = ext_buf[i];
                    if b == 0 {
                        i += 1;
                        continue;
                    }
                    let id = b >> 4;
                    let len = (b & 0x0f) as usize + 1;
                    i += 1;
                    if i + len > ext_buf.len() {
                        break;
                    }
                    extensions.push(Extension {
                        id,
                        payload: Bytes::copy_from_slice(&ext_buf[i..i + len]),
                    });
                    i += len;
                }
            }
        }

        Ok(Header {
            version,
            padding,
            extension,
            marker,
            payload_type,
            sequence_number,
            timestamp,
            ssrc,
            csrc,
            extension_profile,
            extensions,
            extensions_padding: 0,
        })
    }
}
