pub mod depacketizer;
pub mod leb128;
pub mod obu;
pub mod payloader;

pub use depacketizer::Av1Depacketizer;
pub use payloader::Av1Payloader;
