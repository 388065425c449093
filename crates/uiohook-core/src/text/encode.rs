//! UTF-8 to UTF-16 conversion for key lookup results.
//!
//! An X11 lookup yields at most one character as a handful of UTF-8 bytes.
//! The hook reports text as UTF-16 units, so that one codepoint is decoded
//! and re-encoded, as a surrogate pair when it lies above the BMP.

use thiserror::Error;

/// Highest valid Unicode scalar value.
pub const MAX_CODEPOINT: u32 = 0x10FFFF;

/// Masks applied to the leading byte (index = sequence length) and, at index 0,
/// to every continuation byte.
const UTF8_BITMASK: [u8; 5] = [0x3F, 0x7F, 0x1F, 0x0F, 0x07];

/// Errors raised while converting lookup bytes to UTF-16.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// The output buffer has room for no units at all.
    #[error("output buffer is empty")]
    EmptyBuffer,

    /// A supplementary-plane codepoint needs two units but only one fits.
    #[error("surrogate buffer overflow: U+{0:04X} needs 2 units")]
    SurrogateOverflow(u32),

    /// The leading byte is not a valid UTF-8 sequence start.
    #[error("invalid UTF-8 leading byte {0:#04X}")]
    InvalidLead(u8),

    /// The codepoint lies beyond U+10FFFF.
    #[error("codepoint {0:#X} is outside the Unicode range")]
    OutOfRange(u32),

    /// Fewer bytes were supplied than the leading byte announces.
    #[error("truncated UTF-8 sequence: need {needed} bytes, got {available}")]
    Truncated { needed: usize, available: usize },
}

/// Length of the UTF-8 sequence announced by `lead`.
pub fn sequence_len(lead: u8) -> Result<usize, EncodeError> {
    match lead {
        0x00..=0x7F => Ok(1),
        0xC0..=0xDF => Ok(2),
        0xE0..=0xEF => Ok(3),
        0xF0..=0xF4 => Ok(4),
        other => Err(EncodeError::InvalidLead(other)),
    }
}

/// Decodes the first codepoint of `bytes`.
///
/// Returns the codepoint and the number of bytes it used.
pub fn decode_codepoint(bytes: &[u8]) -> Result<(u32, usize), EncodeError> {
    let lead = *bytes.first().ok_or(EncodeError::Truncated {
        needed: 1,
        available: 0,
    })?;
    let len = sequence_len(lead)?;
    if bytes.len() < len {
        return Err(EncodeError::Truncated {
            needed: len,
            available: bytes.len(),
        });
    }

    let mut codepoint = u32::from(UTF8_BITMASK[len] & lead);
    for &byte in &bytes[1..len] {
        codepoint = (codepoint << 6) | u32::from(UTF8_BITMASK[0] & byte);
    }
    if codepoint > MAX_CODEPOINT {
        return Err(EncodeError::OutOfRange(codepoint));
    }
    Ok((codepoint, len))
}

/// Writes `codepoint` to `out` as UTF-16 and returns the unit count.
pub fn encode_utf16(codepoint: u32, out: &mut [u16]) -> Result<usize, EncodeError> {
    if out.is_empty() {
        return Err(EncodeError::EmptyBuffer);
    }
    if codepoint > MAX_CODEPOINT {
        return Err(EncodeError::OutOfRange(codepoint));
    }

    if codepoint <= 0xFFFF {
        out[0] = codepoint as u16;
        return Ok(1);
    }

    if out.len() < 2 {
        return Err(EncodeError::SurrogateOverflow(codepoint));
    }

    const LEAD_OFFSET: u32 = 0xD800 - (0x10000 >> 10);
    out[0] = (LEAD_OFFSET + (codepoint >> 10)) as u16;
    out[1] = (0xDC00 + (codepoint & 0x3FF)) as u16;
    Ok(2)
}

/// Converts the first UTF-8 character of `bytes` into UTF-16 units.
pub fn utf8_to_utf16(bytes: &[u8], out: &mut [u16]) -> Result<usize, EncodeError> {
    let (codepoint, _) = decode_codepoint(bytes)?;
    encode_utf16(codepoint, out)
}

/// Converts the first Latin-1 byte of `bytes` into one UTF-16 unit.
///
/// The plain `XLookupString` path yields ISO-8859-1 rather than UTF-8.
pub fn latin1_to_utf16(bytes: &[u8], out: &mut [u16]) -> Result<usize, EncodeError> {
    let byte = *bytes.first().ok_or(EncodeError::Truncated {
        needed: 1,
        available: 0,
    })?;
    encode_utf16(u32::from(byte), out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_encodes_to_one_unit() {
        let mut out = [0u16; 2];
        assert_eq!(utf8_to_utf16(b"A", &mut out), Ok(1));
        assert_eq!(out[0], 0x0041);
    }

    #[test]
    fn test_two_and_three_byte_sequences() {
        let mut out = [0u16; 2];
        assert_eq!(utf8_to_utf16("é".as_bytes(), &mut out), Ok(1));
        assert_eq!(out[0], 0x00E9);
        assert_eq!(utf8_to_utf16("€".as_bytes(), &mut out), Ok(1));
        assert_eq!(out[0], 0x20AC);
    }

    #[test]
    fn test_supplementary_codepoint_becomes_surrogate_pair() {
        // Arrange
        let mut out = [0u16; 2];

        // Act
        let written = utf8_to_utf16("😀".as_bytes(), &mut out);

        // Assert
        assert_eq!(written, Ok(2));
        assert_eq!(out, [0xD83D, 0xDE00]);
    }

    #[test]
    fn test_two_unit_buffer_fits_every_codepoint() {
        let mut out = [0u16; 2];
        for cp in [0x10000, 0x1F600, 0x10FFFF] {
            let written = encode_utf16(cp, &mut out).expect("fits");
            assert_eq!(written, 2);
            let decoded = char::decode_utf16(out.iter().copied())
                .next()
                .and_then(Result::ok)
                .map(u32::from);
            assert_eq!(decoded, Some(cp));
        }
    }

    #[test]
    fn test_one_unit_buffer_overflows_above_bmp() {
        let mut out = [0u16; 1];
        assert_eq!(
            encode_utf16(0x1F600, &mut out),
            Err(EncodeError::SurrogateOverflow(0x1F600))
        );
        assert_eq!(encode_utf16(0xFFFF, &mut out), Ok(1));
    }

    #[test]
    fn test_empty_buffer_is_rejected() {
        assert_eq!(encode_utf16(0x41, &mut []), Err(EncodeError::EmptyBuffer));
    }

    #[test]
    fn test_truncated_and_invalid_input() {
        let mut out = [0u16; 2];
        assert_eq!(
            utf8_to_utf16(&[0xE2, 0x82], &mut out),
            Err(EncodeError::Truncated {
                needed: 3,
                available: 2
            })
        );
        assert_eq!(utf8_to_utf16(&[0x80], &mut out), Err(EncodeError::InvalidLead(0x80)));
    }

    #[test]
    fn test_codepoints_beyond_unicode_range_are_rejected() {
        let mut out = [0u16; 2];

        // U+10FFFF is the last valid scalar: F4 8F BF BF
        assert_eq!(utf8_to_utf16(&[0xF4, 0x8F, 0xBF, 0xBF], &mut out), Ok(2));
        assert_eq!(out, [0xDBFF, 0xDFFF]);
        // U+110000: F4 90 80 80
        assert_eq!(
            utf8_to_utf16(&[0xF4, 0x90, 0x80, 0x80], &mut out),
            Err(EncodeError::OutOfRange(0x11_0000))
        );
        assert_eq!(utf8_to_utf16(&[0xF5, 0x80, 0x80, 0x80], &mut out), Err(EncodeError::InvalidLead(0xF5)));
        assert_eq!(encode_utf16(0x11_0000, &mut out), Err(EncodeError::OutOfRange(0x11_0000)));
    }

    #[test]
    fn test_latin1_byte_maps_directly() {
        let mut out = [0u16; 1];
        assert_eq!(latin1_to_utf16(&[0xE9], &mut out), Ok(1));
        assert_eq!(out[0], 0x00E9);
    }
}
