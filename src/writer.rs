// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Buffered endian-aware writer over any seekable byte stream.
//!
//! Values are staged in a reusable scratch buffer in host byte order, each
//! primitive-width chunk is reversed when the configured order differs from
//! the host's, and the result is flushed in one `write_all`. The buffer only
//! ever grows.

use crate::decimal::Decimal128;
use crate::encoding::TextEncoding;
use crate::endian::{flip_primitives, BoolWidth, Endianness};
use crate::error::{Error, Result};
use crate::schema::{ElemKind, FieldDescriptor, FieldKind, Layout, LenPolicy, Record, ScalarKind,
    Value};
use crate::traits::RecordWrite;
use std::collections::HashMap;
use std::io::{Seek, SeekFrom, Write};

/// Writer half of the codec.
///
/// Shares the reader's context model: three mutable defaults that apply
/// wherever no per-operation or per-field override is given.
#[derive(Debug)]
pub struct EndianWriter<S> {
    stream: S,
    endianness: Endianness,
    encoding: TextEncoding,
    bool_width: BoolWidth,
    buffer: Vec<u8>,
}

impl<S: Write + Seek> EndianWriter<S> {
    /// Little-endian writer with ASCII text and one-byte booleans.
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

    /// Consume the writer, returning the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        Ok(self.stream.flush()?)
    }

    pub fn position(&mut self) -> Result<u64> {
        Ok(self.stream.stream_position()?)
    }

    pub fn seek_to(&mut self, offset: u64) -> Result<u64> {
        Ok(self.stream.seek(SeekFrom::Start(offset))?)
    }

    /// Grow the scratch buffer to hold `count * width` bytes, returning the
    /// checked byte count.
    fn ensure_buffer(&mut self, count: usize, width: usize) -> Result<usize> {
        let byte_count = count.checked_mul(width).ok_or_else(|| Error::InvalidData {
            reason: format!("byte count overflow: {} elements of {} bytes", count, width),
        })?;
        if self.buffer.len() < byte_count {
            self.buffer.resize(byte_count, 0);
        }
        Ok(byte_count)
    }

    /// Reorder the staged chunks for the configured byte order and write
    /// them out.
    fn flush_buffer(&mut self, byte_count: usize, width: usize) -> Result<()> {
        if byte_count == 0 {
            return Ok(());
        }
        flip_primitives(&mut self.buffer, self.endianness, byte_count, width);
        self.stream.write_all(&self.buffer[..byte_count])?;
        Ok(())
    }
}

macro_rules! impl_write_prim {
    ($write:ident, $write_at:ident, $write_many:ident, $ty:ty) => {
        pub fn $write(&mut self, value: $ty) -> Result<()> {
            const WIDTH: usize = std::mem::size_of::<$ty>();
            self.ensure_buffer(1, WIDTH)?;
            self.buffer[..WIDTH].copy_from_slice(&value.to_ne_bytes());
            self.flush_buffer(WIDTH, WIDTH)
        }

        pub fn $write_at(&mut self, offset: u64, value: $ty) -> Result<()> {
            self.seek_to(offset)?;
            self.$write(value)
        }

        pub fn $write_many(&mut self, values: &[$ty]) -> Result<()> {
            const WIDTH: usize = std::mem::size_of::<$ty>();
            let byte_count = self.ensure_buffer(values.len(), WIDTH)?;
            for (chunk, value) in self.buffer[..byte_count]
                .chunks_exact_mut(WIDTH)
                .zip(values)
            {
                chunk.copy_from_slice(&value.to_ne_bytes());
            }
            self.flush_buffer(byte_count, WIDTH)
        }
    };
}

impl<S: Write + Seek> EndianWriter<S> {
    impl_write_prim!(write_u8, write_u8_at, write_u8s, u8);
    impl_write_prim!(write_u16, write_u16_at, write_u16s, u16);
    impl_write_prim!(write_u32, write_u32_at, write_u32s, u32);
    impl_write_prim!(write_u64, write_u64_at, write_u64s, u64);
    impl_write_prim!(write_i8, write_i8_at, write_i8s, i8);
    impl_write_prim!(write_i16, write_i16_at, write_i16s, i16);
    impl_write_prim!(write_i32, write_i32_at, write_i32s, i32);
    impl_write_prim!(write_i64, write_i64_at, write_i64s, i64);
    impl_write_prim!(write_f32, write_f32_at, write_f32s, f32);
    impl_write_prim!(write_f64, write_f64_at, write_f64s, f64);

    /// Write `buf` to the stream verbatim.
    pub fn write_bytes(&mut self, buf: &[u8]) -> Result<()> {
        self.stream.write_all(buf)?;
        Ok(())
    }

    pub fn write_bytes_at(&mut self, offset: u64, buf: &[u8]) -> Result<()> {
        self.seek_to(offset)?;
        self.write_bytes(buf)
    }

    pub fn write_decimal(&mut self, value: Decimal128) -> Result<()> {
        self.write_u32s(&value.to_words())
    }

    pub fn write_decimal_at(&mut self, offset: u64, value: Decimal128) -> Result<()> {
        self.seek_to(offset)?;
        self.write_decimal(value)
    }

    pub fn write_decimals(&mut self, values: &[Decimal128]) -> Result<()> {
        let mut words = Vec::with_capacity(values.len() * 4);
        for value in values {
            words.extend_from_slice(&value.to_words());
        }
        self.write_u32s(&words)
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_bool_width(value, self.bool_width)
    }

    /// `true` is stored as 1 in the given width, `false` as 0.
    pub fn write_bool_width(&mut self, value: bool, width: BoolWidth) -> Result<()> {
        match width {
            BoolWidth::U8 => self.write_u8(u8::from(value)),
            BoolWidth::U16 => self.write_u16(u16::from(value)),
            BoolWidth::U32 => self.write_u32(u32::from(value)),
        }
    }

    pub fn write_bool_at(&mut self, offset: u64, value: bool) -> Result<()> {
        self.seek_to(offset)?;
        self.write_bool(value)
    }

    pub fn write_bools(&mut self, values: &[bool]) -> Result<()> {
        self.write_bools_width(values, self.bool_width)
    }

    pub fn write_bools_width(&mut self, values: &[bool], width: BoolWidth) -> Result<()> {
        for value in values {
            self.write_bool_width(*value, width)?;
        }
        Ok(())
    }

    pub fn write_char(&mut self, value: char) -> Result<()> {
        self.write_char_enc(value, self.encoding)
    }

    pub fn write_char_enc(&mut self, value: char, encoding: TextEncoding) -> Result<()> {
        let width = encoding.unit_width();
        self.ensure_buffer(1, width)?;
        Self::stage_unit(&mut self.buffer, encoding, 0, value);
        self.flush_buffer(width, width)
    }

    pub fn write_chars(&mut self, values: &[char]) -> Result<()> {
        self.write_chars_enc(values, self.encoding)
    }

    pub fn write_chars_enc(&mut self, values: &[char], encoding: TextEncoding) -> Result<()> {
        let width = encoding.unit_width();
        let byte_count = self.ensure_buffer(values.len(), width)?;
        for (i, c) in values.iter().enumerate() {
            Self::stage_unit(&mut self.buffer, encoding, i, *c);
        }
        self.flush_buffer(byte_count, width)
    }

    /// Encode one character into the `index`-th unit slot in host order.
    fn stage_unit(buffer: &mut [u8], encoding: TextEncoding, index: usize, c: char) {
        let width = encoding.unit_width();
        let start = index * width;
        let mut unit = encoding.encode_unit(c);
        if encoding.swaps_unit_bytes() {
            unit = u32::from((unit as u16).swap_bytes());
        }
        match width {
            1 => buffer[start] = unit as u8,
            2 => buffer[start..start + 2].copy_from_slice(&(unit as u16).to_ne_bytes()),
            _ => buffer[start..start + 4].copy_from_slice(&unit.to_ne_bytes()),
        }
    }

    /// Write exactly `chars` characters: the content truncated to fit, then
    /// zero characters to pad.
    pub fn write_string(&mut self, value: &str, chars: usize) -> Result<()> {
        let mut units: Vec<char> = value.chars().take(chars).collect();
        units.resize(chars, '\0');
        self.write_chars(&units)
    }

    pub fn write_string_enc(
        &mut self,
        value: &str,
        chars: usize,
        encoding: TextEncoding,
    ) -> Result<()> {
        let mut units: Vec<char> = value.chars().take(chars).collect();
        units.resize(chars, '\0');
        self.write_chars_enc(&units, encoding)
    }

    pub fn write_string_at(&mut self, offset: u64, value: &str, chars: usize) -> Result<()> {
        self.seek_to(offset)?;
        self.write_string(value, chars)
    }

    /// Write the full content followed by a single zero terminator.
    pub fn write_string_nt(&mut self, value: &str) -> Result<()> {
        self.write_string_nt_enc(value, self.encoding)
    }

    pub fn write_string_nt_enc(&mut self, value: &str, encoding: TextEncoding) -> Result<()> {
        let mut units: Vec<char> = value.chars().collect();
        units.push('\0');
        self.write_chars_enc(&units, encoding)
    }

    pub fn write_string_nt_at(&mut self, offset: u64, value: &str) -> Result<()> {
        self.seek_to(offset)?;
        self.write_string_nt(value)
    }

    pub fn write_strings(&mut self, values: &[impl AsRef<str>], chars_each: usize) -> Result<()> {
        for value in values {
            self.write_string(value.as_ref(), chars_each)?;
        }
        Ok(())
    }

    pub fn write_strings_nt(&mut self, values: &[impl AsRef<str>]) -> Result<()> {
        for value in values {
            self.write_string_nt(value.as_ref())?;
        }
        Ok(())
    }

    /// Write one composite record.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        log::trace!("writing record '{}'", record.type_name());
        self.write_struct_value(record.descriptor(), record.value())
    }

    pub fn write_record_at(&mut self, offset: u64, record: &Record) -> Result<()> {
        self.seek_to(offset)?;
        self.write_record(record)
    }

    fn write_struct_value(
        &mut self,
        descriptor: &crate::schema::StructDescriptor,
        value: &Value,
    ) -> Result<()> {
        if let Some(codec) = descriptor.custom_codec() {
            return codec.write(self, value);
        }
        let Value::Struct(fields) = value else {
            return Err(Error::TypeMismatch {
                field: descriptor.name().to_string(),
                expected: "struct".into(),
                found: value.kind_name().into(),
            });
        };
        let start = self.position()?;
        for field in descriptor.fields() {
            if field.ignore {
                continue;
            }
            if descriptor.layout() == Layout::Explicit {
                if let Some(offset) = field.offset {
                    self.seek_to(start + offset)?;
                }
            }
            let field_value = fields.get(&field.name).ok_or_else(|| Error::MissingValue {
                field: field.name.clone(),
            })?;
            self.write_field_value(field, field_value, fields)?;
        }
        Ok(())
    }

    fn write_field_value(
        &mut self,
        field: &FieldDescriptor,
        value: &Value,
        siblings: &HashMap<String, Value>,
    ) -> Result<()> {
        let encoding = field.encoding.unwrap_or(self.encoding);
        let bool_width = field.bool_width.unwrap_or(self.bool_width);
        match &field.kind {
            FieldKind::Scalar(kind) => {
                self.write_scalar_value(&field.name, *kind, value, encoding, bool_width)
            }
            FieldKind::Enum(underlying) => {
                let raw = value.as_enum().ok_or_else(|| Self::mismatch(field, value))?;
                self.write_enum_raw(raw, *underlying)
            }
            FieldKind::String(policy) => {
                let s = value.as_str().ok_or_else(|| Self::mismatch(field, value))?;
                match policy {
                    LenPolicy::NullTerminated => self.write_string_nt_enc(s, encoding),
                    other => {
                        let chars = other.resolve(&field.name, siblings)?;
                        self.write_string_enc(s, chars, encoding)
                    }
                }
            }
            FieldKind::Array(elem, policy) => {
                let items = value.as_array().ok_or_else(|| Self::mismatch(field, value))?;
                let count = policy.resolve(&field.name, siblings)?;
                if items.len() != count {
                    return Err(Error::InvalidLength {
                        field: field.name.clone(),
                        reason: format!("expected {} elements, value holds {}", count, items.len()),
                    });
                }
                self.write_array_value(field, elem, items, encoding, bool_width, siblings)
            }
            FieldKind::Struct(nested) => self.write_struct_value(nested, value),
        }
    }

    fn mismatch(field: &FieldDescriptor, value: &Value) -> Error {
        Error::TypeMismatch {
            field: field.name.clone(),
            expected: field.kind.name(),
            found: value.kind_name().into(),
        }
    }

    fn write_scalar_value(
        &mut self,
        field: &str,
        kind: ScalarKind,
        value: &Value,
        encoding: TextEncoding,
        bool_width: BoolWidth,
    ) -> Result<()> {
        let mismatch = || Error::TypeMismatch {
            field: field.to_string(),
            expected: kind.name().to_string(),
            found: value.kind_name().to_string(),
        };
        match kind {
            ScalarKind::Bool => {
                self.write_bool_width(value.as_bool().ok_or_else(mismatch)?, bool_width)
            }
            ScalarKind::U8 => self.write_u8(value.as_u8().ok_or_else(mismatch)?),
            ScalarKind::U16 => self.write_u16(value.as_u16().ok_or_else(mismatch)?),
            ScalarKind::U32 => self.write_u32(value.as_u32().ok_or_else(mismatch)?),
            ScalarKind::U64 => self.write_u64(value.as_u64().ok_or_else(mismatch)?),
            ScalarKind::I8 => self.write_i8(value.as_i8().ok_or_else(mismatch)?),
            ScalarKind::I16 => self.write_i16(value.as_i16().ok_or_else(mismatch)?),
            ScalarKind::I32 => self.write_i32(value.as_i32().ok_or_else(mismatch)?),
            ScalarKind::I64 => self.write_i64(value.as_i64().ok_or_else(mismatch)?),
            ScalarKind::F32 => self.write_f32(value.as_f32().ok_or_else(mismatch)?),
            ScalarKind::F64 => self.write_f64(value.as_f64().ok_or_else(mismatch)?),
            ScalarKind::Decimal => self.write_decimal(value.as_decimal().ok_or_else(mismatch)?),
            ScalarKind::Char => {
                self.write_char_enc(value.as_char().ok_or_else(mismatch)?, encoding)
            }
        }
    }

    /// Narrow the widened enum value back to its underlying width,
    /// bit-preserving.
    fn write_enum_raw(&mut self, raw: i64, underlying: ScalarKind) -> Result<()> {
        match underlying {
            ScalarKind::U8 => self.write_u8(raw as u8),
            ScalarKind::U16 => self.write_u16(raw as u16),
            ScalarKind::U32 => self.write_u32(raw as u32),
            ScalarKind::U64 => self.write_u64(raw as u64),
            ScalarKind::I8 => self.write_i8(raw as i8),
            ScalarKind::I16 => self.write_i16(raw as i16),
            ScalarKind::I32 => self.write_i32(raw as i32),
            _ => self.write_i64(raw),
        }
    }

    fn write_array_value(
        &mut self,
        field: &FieldDescriptor,
        elem: &ElemKind,
        items: &[Value],
        encoding: TextEncoding,
        bool_width: BoolWidth,
        siblings: &HashMap<String, Value>,
    ) -> Result<()> {
        match elem {
            ElemKind::Scalar(kind) => {
                for item in items {
                    self.write_scalar_value(&field.name, *kind, item, encoding, bool_width)?;
                }
                Ok(())
            }
            ElemKind::Enum(underlying) => {
                for item in items {
                    let raw = item.as_enum().ok_or_else(|| Self::mismatch(field, item))?;
                    self.write_enum_raw(raw, *underlying)?;
                }
                Ok(())
            }
            ElemKind::String(elem_policy) => {
                for item in items {
                    let s = item.as_str().ok_or_else(|| Self::mismatch(field, item))?;
                    match elem_policy {
                        LenPolicy::NullTerminated => self.write_string_nt_enc(s, encoding)?,
                        other => {
                            let chars = other.resolve(&field.name, siblings)?;
                            self.write_string_enc(s, chars, encoding)?;
                        }
                    }
                }
                Ok(())
            }
            ElemKind::Struct(nested) => {
                for item in items {
                    self.write_struct_value(nested, item)?;
                }
                Ok(())
            }
        }
    }
}

impl<S: Write + Seek> RecordWrite for EndianWriter<S> {
    fn position(&mut self) -> Result<u64> {
        EndianWriter::position(self)
    }

    fn seek_to(&mut self, offset: u64) -> Result<u64> {
        EndianWriter::seek_to(self, offset)
    }

    fn write_bool(&mut self, value: bool) -> Result<()> {
        EndianWriter::write_bool(self, value)
    }

    fn write_bool_width(&mut self, value: bool, width: BoolWidth) -> Result<()> {
        EndianWriter::write_bool_width(self, value, width)
    }

    fn write_u8(&mut self, value: u8) -> Result<()> {
        EndianWriter::write_u8(self, value)
    }

    fn write_u16(&mut self, value: u16) -> Result<()> {
        EndianWriter::write_u16(self, value)
    }

    fn write_u32(&mut self, value: u32) -> Result<()> {
        EndianWriter::write_u32(self, value)
    }

    fn write_u64(&mut self, value: u64) -> Result<()> {
        EndianWriter::write_u64(self, value)
    }

    fn write_i8(&mut self, value: i8) -> Result<()> {
        EndianWriter::write_i8(self, value)
    }

    fn write_i16(&mut self, value: i16) -> Result<()> {
        EndianWriter::write_i16(self, value)
    }

    fn write_i32(&mut self, value: i32) -> Result<()> {
        EndianWriter::write_i32(self, value)
    }

    fn write_i64(&mut self, value: i64) -> Result<()> {
        EndianWriter::write_i64(self, value)
    }

    fn write_f32(&mut self, value: f32) -> Result<()> {
        EndianWriter::write_f32(self, value)
    }

    fn write_f64(&mut self, value: f64) -> Result<()> {
        EndianWriter::write_f64(self, value)
    }

    fn write_decimal(&mut self, value: Decimal128) -> Result<()> {
        EndianWriter::write_decimal(self, value)
    }

    fn write_char(&mut self, value: char) -> Result<()> {
        EndianWriter::write_char(self, value)
    }

    fn write_char_enc(&mut self, value: char, encoding: TextEncoding) -> Result<()> {
        EndianWriter::write_char_enc(self, value, encoding)
    }

    fn write_bytes(&mut self, buf: &[u8]) -> Result<()> {
        EndianWriter::write_bytes(self, buf)
    }

    fn write_string(&mut self, value: &str, chars: usize) -> Result<()> {
        EndianWriter::write_string(self, value, chars)
    }

    fn write_string_nt(&mut self, value: &str) -> Result<()> {
        EndianWriter::write_string_nt(self, value)
    }

    fn write_record(&mut self, record: &Record) -> Result<()> {
        EndianWriter::write_record(self, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn written(w: EndianWriter<Cursor<Vec<u8>>>) -> Vec<u8> {
        w.into_inner().into_inner()
    }

    #[test]
    fn test_big_endian_u32_bytes() {
        let mut w = EndianWriter::new(Cursor::new(Vec::new())).with_endianness(Endianness::Big);
        w.write_u32(0x1234_5678).expect("write");
        assert_eq!(written(w), [0x12, 0x34, 0x56, 0x78]);
    }

    #[test]
    fn test_fixed_string_truncates_and_pads() {
        let mut w = EndianWriter::new(Cursor::new(Vec::new()));
        w.write_string("Hello", 3).expect("truncate");
        w.write_string("Hi", 4).expect("pad");
        assert_eq!(written(w), *b"HelHi\0\0");
    }

    #[test]
    fn test_null_terminated_string_appends_one_terminator() {
        let mut w = EndianWriter::new(Cursor::new(Vec::new()));
        w.write_string_nt("AB").expect("write");
        assert_eq!(written(w), *b"AB\0");
    }

    #[test]
    fn test_bool_widths() {
        let mut w = EndianWriter::new(Cursor::new(Vec::new()));
        w.write_bool_width(true, BoolWidth::U32).expect("u32 true");
        w.write_bool_width(false, BoolWidth::U16).expect("u16 false");
        w.write_bool(true).expect("default u8");
        assert_eq!(written(w), [1, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_utf16be_unit_bytes() {
        let mut w = EndianWriter::new(Cursor::new(Vec::new()));
        w.write_char_enc('A', TextEncoding::Utf16Be).expect("write");
        assert_eq!(written(w), [0x00, 0x41]);
    }

    #[test]
    fn test_empty_slice_writes_nothing() {
        let mut w = EndianWriter::new(Cursor::new(Vec::new()));
        w.write_u32s(&[]).expect("empty");
        assert!(written(w).is_empty());
    }
}
