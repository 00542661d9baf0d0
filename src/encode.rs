//! String encoders.
//!
//! The `*_str` operations of [`CuckooFilter`](crate::CuckooFilter) turn a
//! string into bytes before hashing. The encoder is part of the filter's
//! identity: the same string under two encoders hashes differently, so a
//! filter must be queried with the encoder it was filled with.
//!
//! | Encoder | Output | Allocates |
//! |---------|--------|-----------|
//! | [`Utf8Encoder`] | UTF-8 bytes | no |
//! | [`Utf16LeEncoder`] | UTF-16 code units, little-endian | yes |
//! | [`AsciiEncoder`] | one byte per char, low 7 bits | yes |
//! | [`HexEncoder`] | one byte per hex digit pair | yes |

use std::borrow::Cow;

/// Conversion of a string to the bytes that get hashed.
pub trait StringEncoder: Send + Sync {
    /// Encode `data`.
    fn encode<'a>(&self, data: &'a str) -> Cow<'a, [u8]>;
}

/// UTF-8, the string's own bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Encoder;

impl StringEncoder for Utf8Encoder {
    #[inline]
    fn encode<'a>(&self, data: &'a str) -> Cow<'a, [u8]> {
        Cow::Borrowed(data.as_bytes())
    }
}

/// UTF-16 little-endian.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf16LeEncoder;

impl StringEncoder for Utf16LeEncoder {
    fn encode<'a>(&self, data: &'a str) -> Cow<'a, [u8]> {
        Cow::Owned(data.encode_utf16().flat_map(u16::to_le_bytes).collect())
    }
}

/// Low seven bits of every char. Lossy outside ASCII.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiEncoder;

impl StringEncoder for AsciiEncoder {
    fn encode<'a>(&self, data: &'a str) -> Cow<'a, [u8]> {
        Cow::Owned(data.chars().map(|c| (u32::from(c) & 0x7F) as u8).collect())
    }
}

/// Hex digit pairs to bytes.
///
/// Input is not validated: digits outside `[0-9A-Fa-f]` produce unspecified
/// (but deterministic) bytes and a trailing odd digit is ignored. Meant for
/// keys that are already known to be hex, such as digests.
///
/// ```
/// use cuckoocraft::encode::{HexEncoder, StringEncoder};
///
/// assert_eq!(&*HexEncoder.encode("00ff7Fa0"), &[0x00, 0xFF, 0x7F, 0xA0]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HexEncoder;

impl HexEncoder {
    #[inline]
    fn nibble(digit: u8) -> u8 {
        let mut value = digit.wrapping_sub(b'0');
        if value > 15 {
            value = value.wrapping_sub(7);
            if value > 15 {
                value = value.wrapping_sub(32);
            }
        }
        value
    }
}

impl StringEncoder for HexEncoder {
    fn encode<'a>(&self, data: &'a str) -> Cow<'a, [u8]> {
        Cow::Owned(
            data.as_bytes()
                .chunks_exact(2)
                .map(|pair| (Self::nibble(pair[0]) << 4).wrapping_add(Self::nibble(pair[1])))
                .collect(),
        )
    }
}
