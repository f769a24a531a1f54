use bytes::{Buf, Bytes};
use shared::error::Result;
use shared::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::header::Header;

/// Packet is a full RTP packet: fixed header, optional extensions, and
/// payload (RFC3550 section 5.1).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Packet {
    pub header: Header,
    pub payload: Bytes,
}

impl MarshalSize for Packet {
    fn marshal_size(&self) -> usize {
        self.header.marshal_size() + self.payload.len()
    }
}

impl Marshal for Packet {
    fn marshal_to(&self, buf: &mut [u8]) -> shared::error::Result<usize> {
        let header_len = self.header.marshal_to(buf)?;
        let total = header_len + self.payload.len();
        if buf.len() < total {
            return Err(shared::error::Error::ErrBufferTooSmall);
        }
        buf[header_len..total].copy_from_slice(&self.payload);
        Ok(total)
    }
}

impl Unmarshal for Packet {
    fn unmarshal<B>(buf: &mut B) -> Result<Self>
    where
        B: Buf,
    {
        let header = Header::unmarshal(buf)?;
        let payload = buf.copy_to_bytes(buf.remaining());
        Ok(Packet { header, payload })
    }
}
