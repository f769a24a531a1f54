use bytes::{Buf, BufMut, BytesMut};
use shared::error::{Error, Result};
use shared::marshal::Unmarshal;

const VIDEO_ORIENTATION_EXTENSION_SIZE: usize = 1;

/// VideoOrientationExtension carries the camera orientation the frame was
/// captured in, so a receiver can rotate it back upright (3GPP TS 26.114
/// coordination of video orientation extension).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VideoOrientationExtension {
    pub direction: bool,
    pub flip: bool,
    pub rotation: u8,
}

impl VideoOrientationExtension {
    pub fn marshal_size(&self) -> usize {
        VIDEO_ORIENTATION_EXTENSION_SIZE
    }

    pub fn marshal(&self) -> Result<BytesMut> {
        let mut buf = BytesMut::with_capacity(VIDEO_ORIENTATION_EXTENSION_SIZE);
        let mut b = self.rotation & 0x3;
        if self.flip {
            b |= 1 << 2;
        }
        if self.direction {
            b |= 1 << 3;
        }
        buf.put_u8(b);
        Ok(buf)
    }
}

impl Unmarshal for VideoOrientationExtension {
    fn unmarshal<B>(buf: &mut B) -> Result<Self>
    where
        B: Buf,
    {
        if buf.remaining() < VIDEO_ORIENTATION_EXTENSION_SIZE {
            return Err(Error::ErrShortPacket);
        }
        let b = buf.get_u8();
        Ok(VideoOrientationExtension {
            direction: b & (1 << 3) != 0,
            flip: b & (1 << 2) != 0,
            rotation: b & 0x3,
        })
    }
}
