//! RTCP (RFC3550, RFC4585) packet types: sender/receiver reports, source
//! descriptions, goodbyes, and the payload- and transport-specific feedback
//! messages used for NACK and transport-wide congestion control.

pub mod goodbye;
pub mod header;
pub mod packet;
pub mod payload_feedbacks;
pub mod receiver_report;
pub mod reception_report;
pub mod sender_report;
pub mod source_description;
pub mod transport_feedbacks;
pub mod util;

pub use goodbye::Goodbye;
pub use header::{Header, PacketType};
pub use packet::{marshal, unmarshal, unmarshal_all, Packet};
pub use receiver_report::ReceiverReport;
pub use reception_report::ReceptionReport;
pub use sender_report::SenderReport;
pub use source_description::{SdesType, SourceDescription, SourceDescriptionChunk, SourceDescriptionItem};
