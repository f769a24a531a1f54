use bytes::{Buf, BufMut, BytesMut};
use shared::error::{Error, Result};
use shared::marshal::Unmarshal;

const TRANSPORT_CC_EXTENSION_SIZE: usize = 2;

/// TransportCcExtension carries a transport-wide sequence number, used by
/// the receiver to build [`crate::rtcp::TransportLayerCc`](../../rtcp/transport_feedbacks/transport_layer_cc/struct.TransportLayerCc.html)
/// feedback (draft-holmer-rmcat-transport-wide-cc-extensions, one-byte
/// header extension URI
/// `http://www.ietf.org/id/draft-holmer-rmcat-transport-wide-cc-extensions-01`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransportCcExtension {
    pub transport_sequence: u16,
}

impl TransportCcExtension {
    pub fn marshal_size(&self) -> usize {
        TRANSPORT_CC_EXTENSION_SIZE
    }

    pub fn marshal(&self) -> Result<BytesMut> {
        let mut buf = BytesMut::with_capacity(TRANSPORT_CC_EXTENSION_SIZE);
        buf.put_u16(self.transport_sequence);
        Ok(buf)
    }
}

impl Unmarshal for TransportCcExtension {
    fn unmarshal<B>(buf: &mut B) -> Result<Self>
    where
        B: Buf,
    {
        if buf.remaining() < TRANSPORT_CC_EXTENSION_SIZE {
            return Err(Error::ErrShortPacket);
        }
        Ok(TransportCcExtension {
            transport_sequence: buf.get_u16(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips() {
        let ext = TransportCcExtension {
            transport_sequence: 42,
        };
        let raw = ext.marshal().unwrap();
        let mut b = raw.freeze();
        assert_eq!(ext, TransportCcExtension::unmarshal(&mut b).unwrap());
    }
}
