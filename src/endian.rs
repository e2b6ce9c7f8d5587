// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Byte order handling and the per-primitive-width flip routine.

/// Byte order of multi-byte primitives on the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    /// Byte order of the host.
    pub const fn native() -> Self {
        #[cfg(target_endian = "little")]
        {
            Self::Little
        }
        #[cfg(target_endian = "big")]
        {
            Self::Big
        }
    }

    pub const fn is_native(self) -> bool {
        matches!(
            (self, Self::native()),
            (Self::Little, Self::Little) | (Self::Big, Self::Big)
        )
    }
}

impl Default for Endianness {
    fn default() -> Self {
        Self::Little
    }
}

/// Stored width of a boolean on the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolWidth {
    U8,
    U16,
    U32,
}

impl BoolWidth {
    pub const fn bytes(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

impl Default for BoolWidth {
    fn default() -> Self {
        Self::U8
    }
}

/// Reverse each `width`-sized chunk of `buf[..byte_count]` when the stream
/// byte order differs from the host's; a no-op when they match.
///
/// `byte_count` must be a multiple of `width`. Chunks are reversed
/// independently so that N primitives flip without reordering between them.
pub(crate) fn flip_primitives(
    buf: &mut [u8],
    endianness: Endianness,
    byte_count: usize,
    width: usize,
) {
    debug_assert!(byte_count % width == 0);
    if endianness.is_native() || width <= 1 {
        return;
    }
    for chunk in buf[..byte_count].chunks_exact_mut(width) {
        chunk.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn foreign() -> Endianness {
        match Endianness::native() {
            Endianness::Little => Endianness::Big,
            Endianness::Big => Endianness::Little,
        }
    }

    #[test]
    fn test_flip_is_noop_for_native_order() {
        let mut buf = [0x01, 0x02, 0x03, 0x04];
        flip_primitives(&mut buf, Endianness::native(), 4, 2);
        assert_eq!(buf, [0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_flip_reverses_each_chunk_independently() {
        let mut buf = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
        flip_primitives(&mut buf, foreign(), 6, 2);
        assert_eq!(buf, [0x02, 0x01, 0x04, 0x03, 0x06, 0x05]);
    }

    #[test]
    fn test_flip_ignores_bytes_beyond_count() {
        let mut buf = [0x01, 0x02, 0xAA, 0xBB];
        flip_primitives(&mut buf, foreign(), 2, 2);
        assert_eq!(buf, [0x02, 0x01, 0xAA, 0xBB]);
    }

    #[test]
    fn test_bool_width_bytes() {
        assert_eq!(BoolWidth::U8.bytes(), 1);
        assert_eq!(BoolWidth::U16.bytes(), 2);
        assert_eq!(BoolWidth::U32.bytes(), 4);
    }
}
