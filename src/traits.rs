// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Object-safe read/write surfaces and the self-describing escape hatch.
//!
//! [`CustomCodec`] lets a type bypass the generic field walk and drive the
//! stream itself. The codec sees the reader or writer through the trait
//! objects here, so one codec serves every stream type.

use crate::decimal::Decimal128;
use crate::encoding::TextEncoding;
use crate::endian::BoolWidth;
use crate::error::Result;
use crate::schema::{Record, StructDescriptor, Value};
use std::sync::Arc;

/// Object-safe subset of the reading surface.
pub trait RecordRead {
    fn position(&mut self) -> Result<u64>;
    fn seek_to(&mut self, offset: u64) -> Result<u64>;

    fn read_bool(&mut self) -> Result<bool>;
    fn read_bool_width(&mut self, width: BoolWidth) -> Result<bool>;
    fn read_u8(&mut self) -> Result<u8>;
    fn read_u16(&mut self) -> Result<u16>;
    fn read_u32(&mut self) -> Result<u32>;
    fn read_u64(&mut self) -> Result<u64>;
    fn read_i8(&mut self) -> Result<i8>;
    fn read_i16(&mut self) -> Result<i16>;
    fn read_i32(&mut self) -> Result<i32>;
    fn read_i64(&mut self) -> Result<i64>;
    fn read_f32(&mut self) -> Result<f32>;
    fn read_f64(&mut self) -> Result<f64>;
    fn read_decimal(&mut self) -> Result<Decimal128>;
    fn read_char(&mut self) -> Result<char>;
    fn read_char_enc(&mut self, encoding: TextEncoding) -> Result<char>;
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()>;
    fn read_string(&mut self, chars: usize) -> Result<String>;
    fn read_string_nt(&mut self) -> Result<String>;
    fn read_record(&mut self, descriptor: &Arc<StructDescriptor>) -> Result<Record>;
}

/// Object-safe subset of the writing surface.
pub trait RecordWrite {
    fn position(&mut self) -> Result<u64>;
    fn seek_to(&mut self, offset: u64) -> Result<u64>;

    fn write_bool(&mut self, value: bool) -> Result<()>;
    fn write_bool_width(&mut self, value: bool, width: BoolWidth) -> Result<()>;
    fn write_u8(&mut self, value: u8) -> Result<()>;
    fn write_u16(&mut self, value: u16) -> Result<()>;
    fn write_u32(&mut self, value: u32) -> Result<()>;
    fn write_u64(&mut self, value: u64) -> Result<()>;
    fn write_i8(&mut self, value: i8) -> Result<()>;
    fn write_i16(&mut self, value: i16) -> Result<()>;
    fn write_i32(&mut self, value: i32) -> Result<()>;
    fn write_i64(&mut self, value: i64) -> Result<()>;
    fn write_f32(&mut self, value: f32) -> Result<()>;
    fn write_f64(&mut self, value: f64) -> Result<()>;
    fn write_decimal(&mut self, value: Decimal128) -> Result<()>;
    fn write_char(&mut self, value: char) -> Result<()>;
    fn write_char_enc(&mut self, value: char, encoding: TextEncoding) -> Result<()>;
    fn write_bytes(&mut self, buf: &[u8]) -> Result<()>;
    fn write_string(&mut self, value: &str, chars: usize) -> Result<()>;
    fn write_string_nt(&mut self, value: &str) -> Result<()>;
    fn write_record(&mut self, record: &Record) -> Result<()>;
}

/// Self-describing serialization for types whose wire shape the generic
/// dispatcher cannot express.
///
/// When a descriptor carries a codec, the dispatcher hands the whole field
/// region over to it for both directions.
pub trait CustomCodec: Send + Sync {
    fn read(&self, reader: &mut dyn RecordRead) -> Result<Value>;
    fn write(&self, writer: &mut dyn RecordWrite, value: &Value) -> Result<()>;
}
