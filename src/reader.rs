// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Buffered endian-aware reader over any seekable byte stream.
//!
//! Every multi-byte read lands in a reusable scratch buffer first; when the
//! configured byte order differs from the host's, each primitive-width chunk
//! is reversed in place before reinterpretation. The buffer only ever grows,
//! so steady-state reads allocate nothing.

use crate::decimal::Decimal128;
use crate::encoding::TextEncoding;
use crate::endian::{flip_primitives, BoolWidth, Endianness};
use crate::error::{Error, Result};
use crate::schema::{ElemKind, FieldDescriptor, FieldKind, Layout, LenPolicy, Record, ScalarKind,
    StructDescriptor, Value};
use crate::traits::RecordRead;
use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom};
use std::sync::Arc;

/// Reader half of the codec.
///
/// Carries three mutable defaults (byte order, text encoding, boolean width)
/// that apply to every operation without an explicit override. Changing a
/// default mid-session affects only subsequent operations.
#[derive(Debug)]
pub struct EndianReader<S> {
    stream: S,
    endianness: Endianness,
    encoding: TextEncoding,
    bool_width: BoolWidth,
    buffer: Vec<u8>,
}

impl<S: Read + Seek> EndianReader<S> {
    /// Little-endian reader with ASCII text and one-byte booleans.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            endianness: Endianness::default(),
            encoding: TextEncoding::default(),
            bool_width: BoolWidth::default(),
            buffer: Vec::new(),
        }
    }

    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_bool_width(mut self, width: BoolWidth) -> Self {
        self.bool_width = width;
        self
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub fn set_encoding(&mut self, encoding: TextEncoding) {
        self.encoding = encoding;
    }

    pub fn bool_width(&self) -> BoolWidth {
        self.bool_width
    }

    pub fn set_bool_width(&mut self, width: BoolWidth) {
        self.bool_width = width;
    }

    /// Consume the reader, returning the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }

    pub fn position(&mut self) -> Result<u64> {
        Ok(self.stream.stream_position()?)
    }

    pub fn seek_to(&mut self, offset: u64) -> Result<u64> {
        Ok(self.stream.seek(SeekFrom::Start(offset))?)
    }

    /// Read `count * width` bytes into the scratch buffer and normalize each
    /// `width`-sized chunk to host byte order.
    fn fill_buffer(&mut self, count: usize, width: usize) -> Result<()> {
        let byte_count = count.checked_mul(width).ok_or_else(|| Error::InvalidData {
            reason: format!("byte count overflow: {} elements of {} bytes", count, width),
        })?;
        if byte_count == 0 {
            return Ok(());
        }
        if self.buffer.len() < byte_count {
            self.buffer.resize(byte_count, 0);
        }
        self.stream.read_exact(&mut self.buffer[..byte_count])?;
        flip_primitives(&mut self.buffer, self.endianness, byte_count, width);
        Ok(())
    }
}

macro_rules! impl_read_prim {
    ($read:ident, $read_at:ident, $read_many:ident, $ty:ty) => {
        pub fn $read(&mut self) -> Result<$ty> {
            const WIDTH: usize = std::mem::size_of::<$ty>();
            self.fill_buffer(1, WIDTH)?;
            let mut raw = [0u8; WIDTH];
            raw.copy_from_slice(&self.buffer[..WIDTH]);
            Ok(<$ty>::from_ne_bytes(raw))
        }

        pub fn $read_at(&mut self, offset: u64) -> Result<$ty> {
            self.seek_to(offset)?;
            self.$read()
        }

        pub fn $read_many(&mut self, count: usize) -> Result<Vec<$ty>> {
            const WIDTH: usize = std::mem::size_of::<$ty>();
            self.fill_buffer(count, WIDTH)?;
            let mut out = Vec::with_capacity(count);
            for chunk in self.buffer[..count * WIDTH].chunks_exact(WIDTH) {
                let mut raw = [0u8; WIDTH];
                raw.copy_from_slice(chunk);
                out.push(<$ty>::from_ne_bytes(raw));
            }
            Ok(out)
        }
    };
}

impl<S: Read + Seek> EndianReader<S> {
    impl_read_prim!(read_u8, read_u8_at, read_u8s, u8);
    impl_read_prim!(read_u16, read_u16_at, read_u16s, u16);
    impl_read_prim!(read_u32, read_u32_at, read_u32s, u32);
    impl_read_prim!(read_u64, read_u64_at, read_u64s, u64);
    impl_read_prim!(read_i8, read_i8_at, read_i8s, i8);
    impl_read_prim!(read_i16, read_i16_at, read_i16s, i16);
    impl_read_prim!(read_i32, read_i32_at, read_i32s, i32);
    impl_read_prim!(read_i64, read_i64_at, read_i64s, i64);
    impl_read_prim!(read_f32, read_f32_at, read_f32s, f32);
    impl_read_prim!(read_f64, read_f64_at, read_f64s, f64);

    /// Fill `buf` from the stream verbatim.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        self.stream.read_exact(buf)?;
        Ok(())
    }

    pub fn read_bytes_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.seek_to(offset)?;
        self.read_bytes(buf)
    }

    pub fn read_decimal(&mut self) -> Result<Decimal128> {
        let words = self.read_decimal_words(1)?;
        Self::assemble_decimal(&words)
    }

    pub fn read_decimal_at(&mut self, offset: u64) -> Result<Decimal128> {
        self.seek_to(offset)?;
        self.read_decimal()
    }

    pub fn read_decimals(&mut self, count: usize) -> Result<Vec<Decimal128>> {
        let words = self.read_decimal_words(count)?;
        words.chunks_exact(4).map(Self::assemble_decimal).collect()
    }

    fn read_decimal_words(&mut self, count: usize) -> Result<Vec<u32>> {
        let word_count = count.checked_mul(4).ok_or_else(|| Error::InvalidData {
            reason: format!("decimal count overflow: {}", count),
        })?;
        self.read_u32s(word_count)
    }

    fn assemble_decimal(words: &[u32]) -> Result<Decimal128> {
        Decimal128::from_words([words[0], words[1], words[2], words[3]]).ok_or_else(|| {
            Error::InvalidData {
                reason: format!("malformed decimal flags word {:#010x}", words[3]),
            }
        })
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        self.read_bool_width(self.bool_width)
    }

    /// Any nonzero stored value reads as `true`.
    pub fn read_bool_width(&mut self, width: BoolWidth) -> Result<bool> {
        let bytes = width.bytes();
        self.fill_buffer(1, bytes)?;
        Ok(self.buffer[..bytes].iter().any(|b| *b != 0))
    }

    pub fn read_bool_at(&mut self, offset: u64) -> Result<bool> {
        self.seek_to(offset)?;
        self.read_bool()
    }

    pub fn read_bools(&mut self, count: usize) -> Result<Vec<bool>> {
        self.read_bools_width(count, self.bool_width)
    }

    pub fn read_bools_width(&mut self, count: usize, width: BoolWidth) -> Result<Vec<bool>> {
        let bytes = width.bytes();
        self.fill_buffer(count, bytes)?;
        Ok(self.buffer[..count * bytes]
            .chunks_exact(bytes)
            .map(|chunk| chunk.iter().any(|b| *b != 0))
            .collect())
    }

    pub fn read_char(&mut self) -> Result<char> {
        self.read_char_enc(self.encoding)
    }

    pub fn read_char_enc(&mut self, encoding: TextEncoding) -> Result<char> {
        self.fill_buffer(1, encoding.unit_width())?;
        Ok(self.decode_buffered_unit(encoding, 0))
    }

    pub fn read_char_at(&mut self, offset: u64) -> Result<char> {
        self.seek_to(offset)?;
        self.read_char()
    }

    pub fn read_chars(&mut self, count: usize) -> Result<Vec<char>> {
        self.read_chars_enc(count, self.encoding)
    }

    pub fn read_chars_enc(&mut self, count: usize, encoding: TextEncoding) -> Result<Vec<char>> {
        self.fill_buffer(count, encoding.unit_width())?;
        Ok((0..count)
            .map(|i| self.decode_buffered_unit(encoding, i))
            .collect())
    }

    /// Decode the `index`-th already-buffered code unit.
    fn decode_buffered_unit(&self, encoding: TextEncoding, index: usize) -> char {
        let width = encoding.unit_width();
        let start = index * width;
        let mut unit = match width {
            1 => u32::from(self.buffer[start]),
            2 => {
                let mut raw = [0u8; 2];
                raw.copy_from_slice(&self.buffer[start..start + 2]);
                u32::from(u16::from_ne_bytes(raw))
            }
            _ => {
                let mut raw = [0u8; 4];
                raw.copy_from_slice(&self.buffer[start..start + 4]);
                u32::from_ne_bytes(raw)
            }
        };
        if encoding.swaps_unit_bytes() {
            unit = u32::from((unit as u16).swap_bytes());
        }
        encoding.decode_unit(unit)
    }

    /// Read exactly `chars` characters.
    pub fn read_string(&mut self, chars: usize) -> Result<String> {
        self.read_string_enc(chars, self.encoding)
    }

    pub fn read_string_enc(&mut self, chars: usize, encoding: TextEncoding) -> Result<String> {
        Ok(self.read_chars_enc(chars, encoding)?.into_iter().collect())
    }

    pub fn read_string_at(&mut self, offset: u64, chars: usize) -> Result<String> {
        self.seek_to(offset)?;
        self.read_string(chars)
    }

    /// Read characters until a zero terminator; the terminator is consumed
    /// but not included.
    pub fn read_string_nt(&mut self) -> Result<String> {
        self.read_string_nt_enc(self.encoding)
    }

    pub fn read_string_nt_enc(&mut self, encoding: TextEncoding) -> Result<String> {
        let mut out = String::new();
        loop {
            let c = self.read_char_enc(encoding)?;
            if c == '\0' {
                return Ok(out);
            }
            out.push(c);
        }
    }

    pub fn read_string_nt_at(&mut self, offset: u64) -> Result<String> {
        self.seek_to(offset)?;
        self.read_string_nt()
    }

    pub fn read_strings(&mut self, count: usize, chars_each: usize) -> Result<Vec<String>> {
        (0..count).map(|_| self.read_string(chars_each)).collect()
    }

    pub fn read_strings_nt(&mut self, count: usize) -> Result<Vec<String>> {
        (0..count).map(|_| self.read_string_nt()).collect()
    }

    /// Read without advancing: the position is restored afterwards.
    pub fn peek_u8(&mut self) -> Result<u8> {
        let pos = self.position()?;
        let v = self.read_u8()?;
        self.seek_to(pos)?;
        Ok(v)
    }

    pub fn peek_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        let pos = self.position()?;
        self.read_bytes(buf)?;
        self.seek_to(pos)?;
        Ok(())
    }

    pub fn peek_char(&mut self) -> Result<char> {
        let pos = self.position()?;
        let c = self.read_char()?;
        self.seek_to(pos)?;
        Ok(c)
    }

    /// Read one composite record described by `descriptor`.
    pub fn read_record(&mut self, descriptor: &Arc<StructDescriptor>) -> Result<Record> {
        log::trace!("reading record '{}'", descriptor.name());
        let value = self.read_struct_value(descriptor)?;
        Ok(Record::from_parts(descriptor.clone(), value))
    }

    pub fn read_record_at(
        &mut self,
        offset: u64,
        descriptor: &Arc<StructDescriptor>,
    ) -> Result<Record> {
        self.seek_to(offset)?;
        self.read_record(descriptor)
    }

    fn read_struct_value(&mut self, descriptor: &StructDescriptor) -> Result<Value> {
        if let Some(codec) = descriptor.custom_codec() {
            return codec.read(self);
        }
        let start = self.position()?;
        let mut fields = HashMap::new();
        for field in descriptor.fields() {
            if field.ignore {
                fields.insert(field.name.clone(), Value::default_for(&field.kind));
                continue;
            }
            if descriptor.layout() == Layout::Explicit {
                if let Some(offset) = field.offset {
                    self.seek_to(start + offset)?;
                }
            }
            let value = self.read_field_value(field, &fields)?;
            fields.insert(field.name.clone(), value);
        }
        Ok(Value::Struct(fields))
    }

    fn read_field_value(
        &mut self,
        field: &FieldDescriptor,
        seen: &HashMap<String, Value>,
    ) -> Result<Value> {
        let encoding = field.encoding.unwrap_or(self.encoding);
        let bool_width = field.bool_width.unwrap_or(self.bool_width);
        match &field.kind {
            FieldKind::Scalar(kind) => self.read_scalar_value(*kind, encoding, bool_width),
            FieldKind::Enum(underlying) => {
                Ok(Value::Enum(self.read_enum_raw(*underlying)?))
            }
            FieldKind::String(policy) => {
                let s = match policy {
                    LenPolicy::NullTerminated => self.read_string_nt_enc(encoding)?,
                    other => {
                        let chars = other.resolve(&field.name, seen)?;
                        self.read_string_enc(chars, encoding)?
                    }
                };
                Ok(Value::Str(s))
            }
            FieldKind::Array(elem, policy) => {
                let count = policy.resolve(&field.name, seen)?;
                self.read_array_value(&field.name, elem, count, encoding, bool_width, seen)
            }
            FieldKind::Struct(nested) => self.read_struct_value(nested),
        }
    }

    fn read_scalar_value(
        &mut self,
        kind: ScalarKind,
        encoding: TextEncoding,
        bool_width: BoolWidth,
    ) -> Result<Value> {
        Ok(match kind {
            ScalarKind::Bool => Value::Bool(self.read_bool_width(bool_width)?),
            ScalarKind::U8 => Value::U8(self.read_u8()?),
            ScalarKind::U16 => Value::U16(self.read_u16()?),
            ScalarKind::U32 => Value::U32(self.read_u32()?),
            ScalarKind::U64 => Value::U64(self.read_u64()?),
            ScalarKind::I8 => Value::I8(self.read_i8()?),
            ScalarKind::I16 => Value::I16(self.read_i16()?),
            ScalarKind::I32 => Value::I32(self.read_i32()?),
            ScalarKind::I64 => Value::I64(self.read_i64()?),
            ScalarKind::F32 => Value::F32(self.read_f32()?),
            ScalarKind::F64 => Value::F64(self.read_f64()?),
            ScalarKind::Decimal => Value::Decimal(self.read_decimal()?),
            ScalarKind::Char => Value::Char(self.read_char_enc(encoding)?),
        })
    }

    /// Read an enum's underlying integer, widened bit-preserving to i64.
    fn read_enum_raw(&mut self, underlying: ScalarKind) -> Result<i64> {
        Ok(match underlying {
            ScalarKind::U8 => i64::from(self.read_u8()?),
            ScalarKind::U16 => i64::from(self.read_u16()?),
            ScalarKind::U32 => i64::from(self.read_u32()?),
            ScalarKind::U64 => self.read_u64()? as i64,
            ScalarKind::I8 => i64::from(self.read_i8()?),
            ScalarKind::I16 => i64::from(self.read_i16()?),
            ScalarKind::I32 => i64::from(self.read_i32()?),
            _ => self.read_i64()?,
        })
    }

    fn read_array_value(
        &mut self,
        field: &str,
        elem: &ElemKind,
        count: usize,
        encoding: TextEncoding,
        bool_width: BoolWidth,
        seen: &HashMap<String, Value>,
    ) -> Result<Value> {
        let values = match elem {
            ElemKind::Scalar(kind) => match kind {
                ScalarKind::U8 => self.read_u8s(count)?.into_iter().map(Value::U8).collect(),
                ScalarKind::U16 => self.read_u16s(count)?.into_iter().map(Value::U16).collect(),
                ScalarKind::U32 => self.read_u32s(count)?.into_iter().map(Value::U32).collect(),
                ScalarKind::U64 => self.read_u64s(count)?.into_iter().map(Value::U64).collect(),
                ScalarKind::I8 => self.read_i8s(count)?.into_iter().map(Value::I8).collect(),
                ScalarKind::I16 => self.read_i16s(count)?.into_iter().map(Value::I16).collect(),
                ScalarKind::I32 => self.read_i32s(count)?.into_iter().map(Value::I32).collect(),
                ScalarKind::I64 => self.read_i64s(count)?.into_iter().map(Value::I64).collect(),
                ScalarKind::F32 => self.read_f32s(count)?.into_iter().map(Value::F32).collect(),
                ScalarKind::F64 => self.read_f64s(count)?.into_iter().map(Value::F64).collect(),
                ScalarKind::Decimal => self
                    .read_decimals(count)?
                    .into_iter()
                    .map(Value::Decimal)
                    .collect(),
                ScalarKind::Bool => self
                    .read_bools_width(count, bool_width)?
                    .into_iter()
                    .map(Value::Bool)
                    .collect(),
                ScalarKind::Char => self
                    .read_chars_enc(count, encoding)?
                    .into_iter()
                    .map(Value::Char)
                    .collect(),
            },
            ElemKind::Enum(underlying) => {
                let mut out = Vec::with_capacity(count);
                for _ in 0..count {
                    out.push(Value::Enum(self.read_enum_raw(*underlying)?));
                }
                out
            }
            ElemKind::String(elem_policy) => {
                let mut out = Vec::with_capacity(count);
                for _ in 0..count {
                    let s = match elem_policy {
                        LenPolicy::NullTerminated => self.read_string_nt_enc(encoding)?,
                        other => {
                            let chars = other.resolve(field, seen)?;
                            self.read_string_enc(chars, encoding)?
                        }
                    };
                    out.push(Value::Str(s));
                }
                out
            }
            ElemKind::Struct(nested) => {
                let mut out = Vec::with_capacity(count);
                for _ in 0..count {
                    out.push(self.read_struct_value(nested)?);
                }
                out
            }
        };
        Ok(Value::Array(values))
    }
}

impl<S: Read + Seek> RecordRead for EndianReader<S> {
    fn position(&mut self) -> Result<u64> {
        EndianReader::position(self)
    }

    fn seek_to(&mut self, offset: u64) -> Result<u64> {
        EndianReader::seek_to(self, offset)
    }

    fn read_bool(&mut self) -> Result<bool> {
        EndianReader::read_bool(self)
    }

    fn read_bool_width(&mut self, width: BoolWidth) -> Result<bool> {
        EndianReader::read_bool_width(self, width)
    }

    fn read_u8(&mut self) -> Result<u8> {
        EndianReader::read_u8(self)
    }

    fn read_u16(&mut self) -> Result<u16> {
        EndianReader::read_u16(self)
    }

    fn read_u32(&mut self) -> Result<u32> {
        EndianReader::read_u32(self)
    }

    fn read_u64(&mut self) -> Result<u64> {
        EndianReader::read_u64(self)
    }

    fn read_i8(&mut self) -> Result<i8> {
        EndianReader::read_i8(self)
    }

    fn read_i16(&mut self) -> Result<i16> {
        EndianReader::read_i16(self)
    }

    fn read_i32(&mut self) -> Result<i32> {
        EndianReader::read_i32(self)
    }

    fn read_i64(&mut self) -> Result<i64> {
        EndianReader::read_i64(self)
    }

    fn read_f32(&mut self) -> Result<f32> {
        EndianReader::read_f32(self)
    }

    fn read_f64(&mut self) -> Result<f64> {
        EndianReader::read_f64(self)
    }

    fn read_decimal(&mut self) -> Result<Decimal128> {
        EndianReader::read_decimal(self)
    }

    fn read_char(&mut self) -> Result<char> {
        EndianReader::read_char(self)
    }

    fn read_char_enc(&mut self, encoding: TextEncoding) -> Result<char> {
        EndianReader::read_char_enc(self, encoding)
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        EndianReader::read_bytes(self, buf)
    }

    fn read_string(&mut self, chars: usize) -> Result<String> {
        EndianReader::read_string(self, chars)
    }

    fn read_string_nt(&mut self) -> Result<String> {
        EndianReader::read_string_nt(self)
    }

    fn read_record(&mut self, descriptor: &Arc<StructDescriptor>) -> Result<Record> {
        EndianReader::read_record(self, descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_scratch_buffer_grows_and_is_reused() {
        let bytes = [1u8, 0, 2, 0, 3, 0, 4, 0, 5, 0];
        let mut r = EndianReader::new(Cursor::new(bytes));
        assert_eq!(r.read_u16s(4).expect("four"), vec![1, 2, 3, 4]);
        let cap = r.buffer.len();
        assert_eq!(r.read_u16().expect("one more"), 5);
        assert_eq!(r.buffer.len(), cap);
    }

    #[test]
    fn test_big_endian_u32() {
        let bytes = [0x12, 0x34, 0x56, 0x78];
        let mut r = EndianReader::new(Cursor::new(bytes)).with_endianness(Endianness::Big);
        assert_eq!(r.read_u32().expect("read"), 0x1234_5678);
    }

    #[test]
    fn test_eof_maps_to_end_of_stream() {
        let mut r = EndianReader::new(Cursor::new([0u8; 2]));
        match r.read_u32() {
            Err(Error::EndOfStream) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_peek_restores_position() {
        let mut r = EndianReader::new(Cursor::new([7u8, 8]));
        assert_eq!(r.peek_u8().expect("peek"), 7);
        assert_eq!(r.read_u8().expect("read"), 7);
        assert_eq!(r.read_u8().expect("read"), 8);
    }

    #[test]
    fn test_null_terminated_string_stops_at_terminator() {
        let mut bytes = b"Hi\0rest".to_vec();
        bytes.push(0);
        let mut r = EndianReader::new(Cursor::new(bytes));
        assert_eq!(r.read_string_nt().expect("nt"), "Hi");
        assert_eq!(r.position().expect("pos"), 3);
    }

    #[test]
    fn test_utf16be_unit_swaps_relative_to_numeric_order() {
        // Units are interpreted in the configured numeric order, then
        // byte-swapped for the big-endian UTF-16 selector.
        let bytes = [0x00, 0x41, 0x42, 0x00];
        let mut r = EndianReader::new(Cursor::new(bytes)).with_encoding(TextEncoding::Utf16Be);
        assert_eq!(r.read_char().expect("le ctx"), 'A');
        r.set_endianness(Endianness::Big);
        assert_eq!(r.read_char().expect("be ctx"), 'B');
    }

    #[test]
    fn test_zero_count_reads_nothing() {
        let mut r = EndianReader::new(Cursor::new(Vec::<u8>::new()));
        assert!(r.read_u32s(0).expect("empty").is_empty());
        assert_eq!(r.read_string(0).expect("empty"), "");
    }
}
