// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Endian-aware binary (de)serialization over seekable streams.
//!
//! The crate reads and writes fixed-layout binary data with a configurable
//! byte order, text encoding, and boolean width. Two surfaces are offered:
//!
//! - Direct primitive calls on [`EndianReader`] and [`EndianWriter`]
//!   (`read_u32`, `write_string_nt`, ...), for hand-driven formats.
//! - Declarative records: describe a composite type once with
//!   [`StructBuilder`](schema::StructBuilder), then move whole
//!   [`Record`](schema::Record)s through the stream in either direction.
//!
//! # Quick start
//!
//! ```
//! use endianio::{EndianReader, EndianWriter, Endianness};
//! use endianio::schema::{Record, ScalarKind, StructBuilder};
//! use std::io::Cursor;
//!
//! # fn main() -> endianio::Result<()> {
//! let point = StructBuilder::new("Point")
//!     .field("x", ScalarKind::I32)
//!     .field("y", ScalarKind::I32)
//!     .build()?;
//!
//! let mut rec = Record::new(point.clone());
//! rec.set("x", 3i32)?;
//! rec.set("y", -4i32)?;
//!
//! let mut w = EndianWriter::new(Cursor::new(Vec::new())).with_endianness(Endianness::Big);
//! w.write_record(&rec)?;
//!
//! let mut r = EndianReader::new(Cursor::new(w.into_inner().into_inner()))
//!     .with_endianness(Endianness::Big);
//! let back = r.read_record(&point)?;
//! assert_eq!(back.get::<i32>("x")?, 3);
//! assert_eq!(back.get::<i32>("y")?, -4);
//! # Ok(())
//! # }
//! ```
//!
//! # Key types
//!
//! - [`EndianReader`] / [`EndianWriter`]: the buffered stream contexts.
//! - [`Endianness`], [`TextEncoding`], [`BoolWidth`]: the mutable context
//!   defaults.
//! - [`schema::StructBuilder`] / [`schema::StructDescriptor`]: declarative
//!   shape of a composite type, built once and shared.
//! - [`Decimal128`]: the 128-bit scaled decimal wire value.
//! - [`CustomCodec`]: self-describing escape hatch for shapes the generic
//!   dispatcher cannot express.

mod decimal;
mod encoding;
mod endian;
mod error;
mod reader;
pub mod schema;
mod traits;
mod writer;

pub use decimal::{Decimal128, MAX_SCALE};
pub use encoding::TextEncoding;
pub use endian::{BoolWidth, Endianness};
pub use error::{Error, Result};
pub use reader::EndianReader;
pub use traits::{CustomCodec, RecordRead, RecordWrite};
pub use writer::EndianWriter;
