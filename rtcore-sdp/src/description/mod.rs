pub mod common;
pub mod media;
pub mod session;

pub use common::{Attribute, Bandwidth, EncryptionKey};
pub use media::{MediaDescription, MediaName, RangedPort};
pub use session::{ConnectionInformation, Origin, SessionDescription, TimeDescription, Timing};
