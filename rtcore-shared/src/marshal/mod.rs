//! Binary (de)serialization traits shared by the packetized wire formats
//! (RTP, RTCP, SCTP chunks, DataChannel messages).

use bytes::{Buf, Bytes, BytesMut};

use crate::error::Result;

/// Types whose marshaled length can be computed without writing it out.
pub trait MarshalSize {
    /// The number of bytes [`Marshal::marshal_to`] will write.
    fn marshal_size(&self) -> usize;
}

/// Types that can serialize themselves into a byte buffer.
pub trait Marshal: MarshalSize {
    /// Writes the marshaled form into `buf`, returning the number of bytes
    /// written. `buf` must be at least [`MarshalSize::marshal_size`] long.
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize>;

    /// Convenience wrapper around [`Marshal::marshal_to`] that allocates an
    /// appropriately sized buffer.
    fn marshal(&self) -> Result<Bytes> {
        let capacity = self.marshal_size();
        let mut buf = BytesMut::with_capacity(capacity);
        buf.resize(capacity, 0);
        let n = self.marshal_to(&mut buf)?;
        buf.truncate(n);
        Ok(buf.freeze())
    }
}

/// Types that can parse themselves out of a byte buffer.
pub trait Unmarshal: Sized {
    /// Consumes as many bytes as needed from `buf` to produce `Self`.
    /// Implementations should leave any trailing bytes (e.g. padding) in
    /// `buf` for the caller.
    fn unmarshal<B>(buf: &mut B) -> Result<Self>
    where
        B: Buf;
}
