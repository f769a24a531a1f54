use bytes::{Buf, BufMut, BytesMut};
use shared::error::{Error, Result};
use shared::marshal::Unmarshal;

const AUDIO_LEVEL_EXTENSION_SIZE: usize = 1;

/// AudioLevelExtension carries the sending client's estimate of the audio
/// level for the RTP packet it is attached to (RFC6464).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AudioLevelExtension {
    pub level: u8,
    pub voice: bool,
}

impl AudioLevelExtension {
    pub fn marshal_size(&self) -> usize {
        AUDIO_LEVEL_EXTENSION_SIZE
    }

    pub fn marshal(&self) -> Result<BytesMut> {
        if self.level > 127 {
            return Err(Error::AudioLevelOverflow);
        }
        let mut buf = BytesMut::with_capacity(AUDIO_LEVEL_EXTENSION_SIZE);
        let mut b = self.level;
        if self.voice {
            b |= 0x80;
        }
        buf.put_u8(b);
        Ok(buf)
    }
}

impl Unmarshal for AudioLevelExtension {
    fn unmarshal<B>(buf: &mut B) -> Result<Self>
    where
        B: Buf,
    {
        if buf.remaining() < AUDIO_LEVEL_EXTENSION_SIZE {
            return Err(Error::ErrShortPacket);
        }
        let b = buf.get_u8();
        Ok(AudioLevelExtension {
            level: b & 0x7f,
            voice: b & 0x80 != 0,
        })
    }
}
