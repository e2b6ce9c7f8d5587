// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text encoding selectors and fixed-width code unit conversion.
//!
//! The rest of the codec treats characters as fixed-width primitives so the
//! same buffered read/write path serves numeric and text data. Variable-width
//! encodings (UTF-7, UTF-8) are normalized to their minimum safe fixed width
//! of one byte; code points outside that safe range are substituted, never
//! split across units.

/// Logical text encoding selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    Ascii,
    Utf7,
    Utf8,
    Utf16Le,
    /// UTF-16 with big-endian code units regardless of the numeric byte
    /// order configured on the context.
    Utf16Be,
    Utf32,
}

impl TextEncoding {
    /// Fixed bytes per code unit: 1, 2, or 4.
    pub const fn unit_width(self) -> usize {
        match self {
            Self::Ascii | Self::Utf7 | Self::Utf8 => 1,
            Self::Utf16Le | Self::Utf16Be => 2,
            Self::Utf32 => 4,
        }
    }

    /// Whether code units are byte-swapped relative to the configured
    /// numeric byte order.
    pub(crate) const fn swaps_unit_bytes(self) -> bool {
        matches!(self, Self::Utf16Be)
    }

    /// Decode one code unit into a character.
    ///
    /// Units no encoding can represent decode lossily: narrow encodings
    /// substitute `'?'`, wide encodings U+FFFD.
    pub(crate) fn decode_unit(self, unit: u32) -> char {
        match self {
            Self::Ascii | Self::Utf7 | Self::Utf8 => {
                if unit <= 0x7F {
                    unit as u8 as char
                } else {
                    '?'
                }
            }
            Self::Utf16Le | Self::Utf16Be => match char::from_u32(unit) {
                Some(c) => c,
                None => char::REPLACEMENT_CHARACTER,
            },
            Self::Utf32 => match char::from_u32(unit) {
                Some(c) => c,
                None => char::REPLACEMENT_CHARACTER,
            },
        }
    }

    /// Encode one character into a code unit, substituting `'?'` for
    /// characters outside the encoding's representable range.
    pub(crate) fn encode_unit(self, c: char) -> u32 {
        let cp = c as u32;
        match self {
            Self::Ascii | Self::Utf7 | Self::Utf8 => {
                if cp <= 0x7F {
                    cp
                } else {
                    u32::from(b'?')
                }
            }
            Self::Utf16Le | Self::Utf16Be => {
                // One unit per character: astral-plane characters would need
                // a surrogate pair, which the fixed-width contract excludes.
                if cp <= 0xFFFF {
                    cp
                } else {
                    u32::from(b'?')
                }
            }
            Self::Utf32 => cp,
        }
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self::Ascii
    }
}
