use std::any::Any;

use bytes::Buf;
use shared::error::{Error, Result};
use shared::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::header::{Header, PacketType, HEADER_LENGTH};
use crate::packet::Packet;
use crate::reception_report::{ReceptionReport, RECEPTION_REPORT_LENGTH};
use crate::util::get_padding_size;

const SSRC_LENGTH: usize = 4;
const SENDER_INFO_LENGTH: usize = 20;

/// SenderReport is sent by active senders every RTP interval, giving
/// transmission/reception statistics for packets sent in that interval
/// (RFC3550 section 6.4.1).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SenderReport {
    pub ssrc: u32,
    pub ntp_time: u64,
    pub rtp_time: u32,
    pub packet_count: u32,
    pub octet_count: u32,
    pub reports: Vec<ReceptionReport>,
    pub profile_extensions: bytes::Bytes,
}

impl SenderReport {
    fn body_size(&self) -> usize {
        SSRC_LENGTH
            + SENDER_INFO_LENGTH
            + self.reports.len() * RECEPTION_REPORT_LENGTH
            + self.profile_extensions.len()
    }
}

impl MarshalSize for SenderReport {
    fn marshal_size(&self) -> usize {
        let body = self.body_size();
        HEADER_LENGTH + body + get_padding_size(body)
    }
}

impl Marshal for SenderReport {
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
            packet_type: PacketType::SenderReport,
            length: crate::header::length_in_words(body + padding)?,
        };
        let n = header.marshal_to(buf)?;
        let mut idx = n;

        buf[idx..idx + 4].copy_from_slice(&self.ssrc.to_be_bytes());
        idx += 4;
        buf[idx..idx + 8].copy_from_slice(&self.ntp_time.to_be_bytes());
        idx += 8;
        buf[idx..idx + 4].copy_from_slice(&self.rtp_time.to_be_bytes());
        idx += 4;
        buf[idx..idx + 4].copy_from_slice(&self.packet_count.to_be_bytes());
        idx += 4;
        buf[idx..idx + 4].copy_from_slice(&self.octet_count.to_be_bytes());
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

impl Unmarshal for SenderReport {
    fn unmarshal<B>(buf: &mut B) -> Result<Self>
    where
        B: Buf,
    {
        if buf.remaining() < HEADER_LENGTH {
            return Err(Error::PacketTooShort);
        }
        let header = Header::unmarshal(buf)?;
        if header.packet_type != PacketType::SenderReport {
            return Err(Error::WrongType);
        }
        let body_len = (header.length as usize + 1) * 4 - HEADER_LENGTH;
        if buf.remaining() < body_len {
            return Err(Error::PacketTooShort);
        }
        if body_len < SSRC_LENGTH + SENDER_INFO_LENGTH {
            return Err(Error::PacketTooShort);
        }

        let ssrc = buf.get_u32();
        let ntp_time = buf.get_u64();
        let rtp_time = buf.get_u32();
        let packet_count = buf.get_u32();
        let octet_count = buf.get_u32();

        let mut reports = Vec::with_capacity(header.count as usize);
        for _ in 0..header.count {
            reports.push(ReceptionReport::unmarshal(buf)?);
        }

        let consumed = SSRC_LENGTH + SENDER_INFO_LENGTH + reports.len() * RECEPTION_REPORT_LENGTH;
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

        Ok(SenderReport {
            ssrc,
            ntp_time,
            rtp_time,
            packet_count,
            octet_count,
            reports,
            profile_extensions: bytes::Bytes::from(rest),
        })
    }
}

impl Packet for SenderReport {
    fn destination_ssrc(&self) -> Vec<u32> {
        self.reports.iter().map(|r| r.ssrc).collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equal(&self, other: &dyn Packet) -> bool {
        other
            .as_any()
            .downcast_ref::<SenderReport>()
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
    fn round_trips_with_reports() {
        let sr = SenderReport {
            ssrc: 1,
            ntp_time: 2,
            rtp_time: 3,
            packet_count: 4,
            octet_count: 5,
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
        let raw = sr.marshal().unwrap();
        let mut b = raw.clone();
        let back = SenderReport::unmarshal(&mut b).unwrap();
        assert_eq!(sr, back);
    }

    #[test]
    fn round_trips_empty() {
        let sr = SenderReport {
            ssrc: 0x9023_7842,
            ntp_time: 0xda8b0884_db69a144,
            rtp_time: 0x21993a97,
            packet_count: 0x10,
            octet_count: 0x20,
            reports: vec![],
            profile_extensions: bytes::Bytes::new(),
        };
        let raw = sr.marshal().unwrap();
        let mut b = raw.clone();
        assert_eq!(sr, SenderReport::unmarshal(&mut b).unwrap());
    }
}
