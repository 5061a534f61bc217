//! Bit-field codec for frame payloads
//!
//! A layout is a static table of [`FieldSpec`] entries. The packed form is a
//! big-endian bit stream: the first declared field occupies the most
//! significant bits of the first byte it touches. 16-bit integer fields are
//! little-endian at the byte level and must fall on a byte boundary, which
//! every HVC layout guarantees by construction.

use std::fmt;

/// Wire representation of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Signed 16-bit integer, two's complement, little-endian byte order
    IntLe16,
    /// Unsigned integer of the given bit width (1..=8)
    Uint(u8),
    /// Reserved bits: encoded as zero, discarded on decode
    Pad(u8),
}

impl FieldKind {
    fn bit_width(&self) -> usize {
        match self {
            FieldKind::IntLe16 => 16,
            FieldKind::Uint(bits) | FieldKind::Pad(bits) => *bits as usize,
        }
    }

    fn carries_value(&self) -> bool {
        !matches!(self, FieldKind::Pad(_))
    }
}

/// One entry of a frame layout table
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// Errors raised while packing field values into bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A required field was never assigned a value
    UnsetField { field: &'static str },
    /// A value does not fit its declared bit width
    OutOfRange { field: &'static str, value: i64 },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::UnsetField { field } => {
                write!(f, "Field '{}' is unset", field)
            }
            EncodeError::OutOfRange { field, value } => {
                write!(f, "Value {} does not fit field '{}'", value, field)
            }
        }
    }
}

impl std::error::Error for EncodeError {}

/// Errors raised while unpacking bytes into field values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Input length differs from the layout's packed length
    LengthMismatch { expected: usize, actual: usize },
    /// A decoded bit pattern has no corresponding enum variant
    InvalidEnum { field: &'static str, value: u8 },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::LengthMismatch { expected, actual } => {
                write!(f, "Expected {} bytes, got {}", expected, actual)
            }
            DecodeError::InvalidEnum { field, value } => {
                write!(f, "Value {} is not valid for field '{}'", value, field)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Total packed length of a layout in bytes
///
/// Layouts are byte-aligned by construction; a trailing partial byte would
/// be a malformed layout table and is caught in debug builds.
pub fn packed_len(layout: &[FieldSpec]) -> usize {
    let bits: usize = layout.iter().map(|f| f.kind.bit_width()).sum();
    debug_assert_eq!(bits % 8, 0, "layout is not byte-aligned");
    bits / 8
}

/// Number of value-carrying (non-pad) fields in a layout
pub fn value_count(layout: &[FieldSpec]) -> usize {
    layout.iter().filter(|f| f.kind.carries_value()).count()
}

/// Pack field values into bytes according to `layout`
///
/// `values` holds one entry per value-carrying field, in declaration order.
/// An unset entry or a value outside its declared width is rejected; nothing
/// is ever silently truncated.
pub fn encode(layout: &[FieldSpec], values: &[Option<i64>]) -> Result<Vec<u8>, EncodeError> {
    debug_assert_eq!(values.len(), value_count(layout));

    let mut writer = BitWriter::new(packed_len(layout));
    let mut slot = 0;

    for field in layout {
        match field.kind {
            FieldKind::Pad(bits) => writer.put(0, bits as usize),
            FieldKind::IntLe16 => {
                let value = take_value(field, values, &mut slot)?;
                if value < i16::MIN as i64 || value > i16::MAX as i64 {
                    return Err(EncodeError::OutOfRange {
                        field: field.name,
                        value,
                    });
                }
                let [lo, hi] = (value as i16).to_le_bytes();
                writer.put(lo as u64, 8);
                writer.put(hi as u64, 8);
            }
            FieldKind::Uint(bits) => {
                let value = take_value(field, values, &mut slot)?;
                if value < 0 || value >= 1 << bits {
                    return Err(EncodeError::OutOfRange {
                        field: field.name,
                        value,
                    });
                }
                writer.put(value as u64, bits as usize);
            }
        }
    }

    Ok(writer.into_bytes())
}

/// Unpack bytes into field values according to `layout`
///
/// Returns one entry per value-carrying field, in declaration order.
pub fn decode(layout: &[FieldSpec], bytes: &[u8]) -> Result<Vec<i64>, DecodeError> {
    let expected = packed_len(layout);
    if bytes.len() != expected {
        return Err(DecodeError::LengthMismatch {
            expected,
            actual: bytes.len(),
        });
    }

    let mut reader = BitReader::new(bytes);
    let mut values = Vec::with_capacity(value_count(layout));

    for field in layout {
        match field.kind {
            FieldKind::Pad(bits) => {
                reader.take(bits as usize);
            }
            FieldKind::IntLe16 => {
                let lo = reader.take(8) as u8;
                let hi = reader.take(8) as u8;
                values.push(i16::from_le_bytes([lo, hi]) as i64);
            }
            FieldKind::Uint(bits) => {
                values.push(reader.take(bits as usize) as i64);
            }
        }
    }

    Ok(values)
}

fn take_value(
    field: &FieldSpec,
    values: &[Option<i64>],
    slot: &mut usize,
) -> Result<i64, EncodeError> {
    let value = values
        .get(*slot)
        .copied()
        .flatten()
        .ok_or(EncodeError::UnsetField { field: field.name })?;
    *slot += 1;
    Ok(value)
}

/// MSB-first bit accumulator
struct BitWriter {
    bytes: Vec<u8>,
    bit_pos: usize,
}

impl BitWriter {
    fn new(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity],
            bit_pos: 0,
        }
    }

    fn put(&mut self, value: u64, width: usize) {
        for i in (0..width).rev() {
            if value >> i & 1 != 0 {
                let byte = self.bit_pos / 8;
                let shift = 7 - self.bit_pos % 8;
                self.bytes[byte] |= 1 << shift;
            }
            self.bit_pos += 1;
        }
    }

    fn into_bytes(self) -> Vec<u8> {
        debug_assert_eq!(self.bit_pos, self.bytes.len() * 8);
        self.bytes
    }
}

/// MSB-first bit cursor over a byte slice
struct BitReader<'a> {
    bytes: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, bit_pos: 0 }
    }

    fn take(&mut self, width: usize) -> u64 {
        let mut value = 0u64;
        for _ in 0..width {
            let byte = self.bit_pos / 8;
            let shift = 7 - self.bit_pos % 8;
            value = value << 1 | (self.bytes[byte] >> shift & 1) as u64;
            self.bit_pos += 1;
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_LAYOUT: &[FieldSpec] = &[
        FieldSpec::new("position", FieldKind::IntLe16),
        FieldSpec::new("pad", FieldKind::Pad(3)),
        FieldSpec::new("mode", FieldKind::Uint(1)),
        FieldSpec::new("enable", FieldKind::Uint(1)),
        FieldSpec::new("stall", FieldKind::Uint(1)),
        FieldSpec::new("direction", FieldKind::Uint(2)),
        FieldSpec::new("level", FieldKind::Uint(8)),
    ];

    #[test]
    fn test_packed_len() {
        assert_eq!(packed_len(TEST_LAYOUT), 4);
        assert_eq!(value_count(TEST_LAYOUT), 6);
    }

    #[test]
    fn test_encode_sub_byte_fields_msb_first() {
        // pad(3)=000, mode=0, enable=1, stall=1, direction=00 -> 0b0000_1100
        let bytes = encode(
            TEST_LAYOUT,
            &[Some(16000), Some(0), Some(1), Some(1), Some(0), Some(255)],
        )
        .unwrap();
        assert_eq!(bytes, vec![128, 62, 0b0000_1100, 255]);
    }

    #[test]
    fn test_signed_little_endian() {
        let bytes = encode(
            TEST_LAYOUT,
            &[Some(-2), Some(0), Some(0), Some(0), Some(0), Some(0)],
        )
        .unwrap();
        assert_eq!(&bytes[0..2], &[0xFE, 0xFF]);
    }

    #[test]
    fn test_round_trip() {
        let values = [Some(-12345), Some(1), Some(0), Some(1), Some(3), Some(142)];
        let bytes = encode(TEST_LAYOUT, &values).unwrap();
        let decoded = decode(TEST_LAYOUT, &bytes).unwrap();
        let expected: Vec<i64> = values.iter().map(|v| v.unwrap()).collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_unset_field_rejected() {
        let result = encode(
            TEST_LAYOUT,
            &[Some(0), None, Some(0), Some(0), Some(0), Some(0)],
        );
        assert_eq!(result, Err(EncodeError::UnsetField { field: "mode" }));
    }

    #[test]
    fn test_out_of_range_rejected_not_truncated() {
        // direction is 2 bits wide; 4 must be rejected, not masked to 0
        let result = encode(
            TEST_LAYOUT,
            &[Some(0), Some(0), Some(0), Some(0), Some(4), Some(0)],
        );
        assert_eq!(
            result,
            Err(EncodeError::OutOfRange {
                field: "direction",
                value: 4
            })
        );

        let result = encode(
            TEST_LAYOUT,
            &[Some(40000), Some(0), Some(0), Some(0), Some(0), Some(0)],
        );
        assert!(matches!(
            result,
            Err(EncodeError::OutOfRange {
                field: "position",
                ..
            })
        ));
    }

    #[test]
    fn test_negative_unsigned_rejected() {
        let result = encode(
            TEST_LAYOUT,
            &[Some(0), Some(0), Some(0), Some(0), Some(0), Some(-1)],
        );
        assert_eq!(
            result,
            Err(EncodeError::OutOfRange {
                field: "level",
                value: -1
            })
        );
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let short = decode(TEST_LAYOUT, &[0, 0, 0]);
        assert_eq!(
            short,
            Err(DecodeError::LengthMismatch {
                expected: 4,
                actual: 3
            })
        );

        let long = decode(TEST_LAYOUT, &[0; 5]);
        assert_eq!(
            long,
            Err(DecodeError::LengthMismatch {
                expected: 4,
                actual: 5
            })
        );
    }
}
