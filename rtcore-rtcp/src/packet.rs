use std::any::Any;
use std::fmt::Debug;

use bytes::Buf;
use shared::error::{Error, Result};
use shared::marshal::{Marshal, MarshalSize};

use crate::goodbye::Goodbye;
use crate::header::PacketType;
use crate::payload_feedbacks::full_intra_request::FullIntraRequest;
use crate::payload_feedbacks::picture_loss_indication::PictureLossIndication;
use crate::receiver_report::ReceiverReport;
use crate::sender_report::SenderReport;
use crate::source_description::SourceDescription;
use crate::transport_feedbacks::transport_layer_cc::TransportLayerCc;
use crate::transport_feedbacks::transport_layer_nack::TransportLayerNack;

/// Packet is implemented by every concrete RTCP packet type, letting a
/// compound packet be processed as a heterogeneous list.
pub trait Packet: Debug + Marshal + Any {
    /// The SSRCs this packet concerns, used to route it to the right stream.
    fn destination_ssrc(&self) -> Vec<u32>;
    fn as_any(&self) -> &dyn Any;
    fn equal(&self, other: &dyn Packet) -> bool;
    fn cloned(&self) -> Box<dyn Packet>;
}

/// Parses a single RTCP packet (header plus body) from `buf`, dispatching on
/// the header's packet type / count (format) fields.
pub fn unmarshal(buf: &mut impl Buf) -> Result<Box<dyn Packet>> {
    let peek = buf.chunk();
    if peek.len() < crate::header::HEADER_LENGTH {
        return Err(Error::PacketTooShort);
    }
    let packet_type = PacketType::from(peek[1]);
    let fmt = peek[0] & 0x1f;

    match packet_type {
        PacketType::SenderReport => Ok(Box::new(SenderReport::unmarshal(buf)?)),
        PacketType::ReceiverReport => Ok(Box::new(ReceiverReport::unmarshal(buf)?)),
        PacketType::SourceDescription => Ok(Box::new(SourceDescription::unmarshal(buf)?)),
        PacketType::Goodbye => Ok(Box::new(Goodbye::unmarshal(buf)?)),
        PacketType::TransportSpecificFeedback => match fmt {
            crate::header::format::TRANSPORT_LAYER_NACK => {
                Ok(Box::new(TransportLayerNack::unmarshal(buf)?))
            }
            crate::header::format::TRANSPORT_LAYER_CC => {
                Ok(Box::new(TransportLayerCc::unmarshal(buf)?))
            }
            _ => Err(Error::WrongFeedbackType),
        },
        PacketType::PayloadSpecificFeedback => match fmt {
            crate::header::format::PICTURE_LOSS_INDICATION => {
                Ok(Box::new(PictureLossIndication::unmarshal(buf)?))
            }
            crate::header::format::FULL_INTRA_REQUEST => {
                Ok(Box::new(FullIntraRequest::unmarshal(buf)?))
            }
            _ => Err(Error::WrongFeedbackType),
        },
        _ => Err(Error::WrongType),
    }
}

/// Parses every packet in a compound RTCP datagram (RFC3550 section 6.1: the
/// first packet must be a sender or receiver report).
pub fn unmarshal_all(buf: &mut impl Buf) -> Result<Vec<Box<dyn Packet>>> {
    let mut packets = Vec::new();
    while buf.has_remaining() {
        packets.push(unmarshal(buf)?);
    }
    if packets.is_empty() {
        return Err(Error::EmptyCompound);
    }
    let first_is_report = packets[0].as_any().is::<SenderReport>()
        || packets[0].as_any().is::<ReceiverReport>();
    if !first_is_report {
        return Err(Error::BadFirstPacket);
    }
    Ok(packets)
}

/// Marshals a compound packet, writing each sub-packet back to back.
pub fn marshal(packets: &[Box<dyn Packet>]) -> Result<bytes::Bytes> {
    let total: usize = packets.iter().map(|p| p.marshal_size()).sum();
    let mut out = bytes::BytesMut::with_capacity(total);
    for p in packets {
        out.extend_from_slice(&p.marshal()?);
    }
    Ok(out.freeze())
}

impl PartialEq for Box<dyn Packet> {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other.as_ref())
    }
}

impl Clone for Box<dyn Packet> {
    fn clone(&self) -> Self {
        self.cloned()
    }
}
