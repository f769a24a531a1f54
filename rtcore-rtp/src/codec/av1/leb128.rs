use bytes::Bytes;

/// Reads an AV1 `leb128`-encoded unsigned integer, returning the value and
/// the number of bytes consumed (AV1 bitstream spec section 4.10.5). Returns
/// `(0, 0)` if `buf` doesn't contain a complete, in-range encoding.
pub fn read_leb128(buf: &Bytes) -> (u32, usize) {
    let mut value: u64 = 0;
    for (i, &b) in buf.iter().enumerate().take(8) {
        value |= ((b & 0x7f) as u64) << (i * 7);
        if b & 0x80 == 0 {
            if value > u32::MAX as u64 {
                return (0, 0);
            }
            return (value as u32, i + 1);
        }
    }
    (0, 0)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reads_single_byte_value() {
        assert_eq!(read_leb128(&Bytes::from_static(&[0x05])), (5, 1));
    }

    #[test]
    fn reads_multi_byte_value() {
        assert_eq!(read_leb128(&Bytes::from_static(&[0xac, 0x02])), (300, 2));
    }

    #[test]
    fn reports_truncated_input_as_zero_length() {
        assert_eq!(read_leb128(&Bytes::from_static(&[0x80])), (0, 0));
    }
}
