//! OBU (Open Bitstream Unit) header constants (AV1 bitstream spec section 5.3.2).

/// Masks the 4-bit obu_type field out of the first OBU header byte (bits 3-6).
pub const OBU_TYPE_MASK: u8 = 0b0111_1000;
/// obu_has_size_field bit.
pub const OBU_HAS_SIZE_BIT: u8 = 0b0000_0010;
/// obu_extension_flag bit.
pub const OBU_EXTENSION_FLAG_BIT: u8 = 0b0000_0100;

pub const OBU_TYPE_SEQUENCE_HEADER: u8 = 1;
pub const OBU_TYPE_TEMPORAL_DELIMITER: u8 = 2;
pub const OBU_TYPE_FRAME_HEADER: u8 = 3;
pub const OBU_TYPE_TILE_GROUP: u8 = 4;
pub const OBU_TYPE_METADATA: u8 = 5;
pub const OBU_TYPE_FRAME: u8 = 6;
pub const OBU_TYPE_REDUNDANT_FRAME_HEADER: u8 = 7;
pub const OBU_TYPE_TILE_LIST: u8 = 8;
pub const OBU_TYPE_PADDING: u8 = 15;
