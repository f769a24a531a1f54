use std::any::Any;

use bytes::Buf;
use shared::error::{Error, Result};
use shared::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::header::{Header, PacketType, HEADER_LENGTH};
use crate::packet::Packet;
use crate::reception_report::{ReceptionReport, RECEPTION_REPORT_LENGTH};
use crate::util::get_padding_size;

const SSRC_LENGTH: usize = 4;

/// ReceiverReport is sent periodically by participants that are not active
/// senders, giving reception quality feedback for streams they receive
/// (RFC3550 section 6.4.2).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReceiverReport {
    pub ssrc: u32,
    pub reports: Vec<ReceptionReport>,
    pub profile_extensions: bytes::Bytes,
}

impl ReceiverReport {
    fn body_size(&self) -> usize {
        SSRC_LENGTH + self.reports.len() * RECEPTION_REPORT_LENGTH + self.profile_extensions.len()
    }
}

impl MarshalSize for ReceiverReport {
    fn marshal_size(&self) -> usize {
        let body = self.body_size();
        HEADER_LENGTH + body + get_padding_size(body)
    }
}

impl Marshal for ReceiverReport {
    fn marshal_to(&self, buf: &mut [u8]) -> Result<usize> {
        if self.reports.len() > 0x1f {
            return Err(Error::TooManyReports);
        }
        let body = self.body_size();
        let padding = get_padding_size(body);
        let size = HEADER_LENGTH + body + padding;
        if buf.len() < size {
            return Err(Error::PacketTooShort);
        }

        let header = Header {
            padding: padding != 0,
            count: self.reports.len() as u8,
            packet_type: PacketType::ReceiverReport,
            length: crate::header::length_in_words(body + padding)?,
        };
        let n = header.marshal_to(buf)?;
        let mut idx = n;

        buf[idx..idx + 4].copy_from_slice(&self.ssrc.to_be_bytes());
        idx += 4;

        for r in &self.reports {
            idx += r.marshal_to(&mut buf[idx..])?;
        }

        buf[idx..idx + self.profile_extensions.len()].copy_from_slice(&self.profile_extensions);
        idx += self.profile_extensions.len();

        if padding != 0 {
            for b in &mut buf[idx..idx + padding - 1] {
                *b = 0;
            }
            buf[idx + padding - 1] = padding as u8;
        }
        idx += padding;

        Ok(idx)
    }
}

impl Unmarshal for ReceiverReport {
    fn unmarshal<B>(buf: &mut B) -> Result<Self>
    where
        B: Buf,
    {
        if buf.remaining() < HEADER_LENGTH {
            return Err(Error::PacketTooShort);
        }
        let header = Header::unmarshal(buf)?;
        if header.packet_type != PacketType::ReceiverReport {
            return Err(Error::WrongType);
        }
        let body_len = (header.length as usize + 1) * 4 - HEADER_LENGTH;
        if buf.remaining() < body_len || body_len < SSRC_LENGTH {
            return Err(Error::PacketTooShort);
        }

        let ssrc = buf.get_u32();
        let mut reports = Vec::with_capacity(header.count as usize);
        for _ in 0..header.count {
            reports.push(ReceptionReport::unmarshal(buf)?);
        }

        let consumed = SSRC_LENGTH + reports.len() * RECEPTION_REPORT_LENGTH;
        let remaining_in_body = body_len - consumed;
        let mut rest = vec![0u8; remaining_in_body];
        buf.copy_to_slice(&mut rest);
        if header.padding {
            let pad = *rest.last().unwrap_or(&0) as usize;
            if pad == 0 || pad > rest.len() {
                return Err(Error::WrongPadding);
            }
            rest.truncate(rest.len() - pad);
        }

        Ok(ReceiverReport {
            ssrc,
            reports,
            profile_extensions: bytes::Bytes::from(rest),
        })
    }
}

impl Packet for ReceiverReport {
    fn destination_ssrc(&self) -> Vec<u32> {
        self.reports.iter().map(|r| r.ssrc).collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equal(&self, other: &dyn Packet) -> bool {
        other
            .as_any()
            .downcast_ref::<ReceiverReport>()
            .is_some_and(|o| o == self)
    }

    fn cloned(&self) -> Box<dyn Packet> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips() {
        let rr = ReceiverReport {
            ssrc: 1,
            reports: vec![ReceptionReport {
                ssrc: 2,
                fraction_lost: 2,
                total_lost: 3,
                last_sequence_number: 4,
                jitter: 5,
                last_sender_report: 6,
                delay: 7,
            }],
            profile_extensions: bytes::Bytes::new(),
        };
        let raw = rr.marshal().unwrap();
        let mut b = raw.clone();
        assert_eq!(rr, ReceiverReport::unmarshal(&mut b).unwrap());
    }

    #[test]
    fn rejects_wrong_packet_type() {
        let sr_header = Header {
            padding: false,
            count: 0,
            packet_type: PacketType::SenderReport,
            length: 1,
        };
        let raw = sr_header.marshal().unwrap();
        let mut b = raw.clone();
        assert!(ReceiverReport::unmarshal(&mut b).is_err());
    }
}
