// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stream-level round trips and golden byte layouts for the primitive
//! surface.

use endianio::{
    BoolWidth, Decimal128, EndianReader, EndianWriter, Endianness, Error, TextEncoding,
};
use std::io::{Cursor, Seek, SeekFrom, Write};

fn writer(endianness: Endianness) -> EndianWriter<Cursor<Vec<u8>>> {
    EndianWriter::new(Cursor::new(Vec::new())).with_endianness(endianness)
}

fn reader(bytes: Vec<u8>, endianness: Endianness) -> EndianReader<Cursor<Vec<u8>>> {
    EndianReader::new(Cursor::new(bytes)).with_endianness(endianness)
}

#[test]
fn test_u32_golden_bytes_both_orders() {
    let mut w = writer(Endianness::Little);
    w.write_u32(0xDEAD_BEEF).expect("write le");
    assert_eq!(w.into_inner().into_inner(), [0xEF, 0xBE, 0xAD, 0xDE]);

    let mut w = writer(Endianness::Big);
    w.write_u32(0xDEAD_BEEF).expect("write be");
    assert_eq!(w.into_inner().into_inner(), [0xDE, 0xAD, 0xBE, 0xEF]);
}

#[test]
fn test_scalar_round_trips_both_orders() {
    for endianness in [Endianness::Little, Endianness::Big] {
        let mut w = writer(endianness);
        w.write_u8(0xA5).expect("u8");
        w.write_i16(-12345).expect("i16");
        w.write_u64(0x0123_4567_89AB_CDEF).expect("u64");
        w.write_f32(3.5).expect("f32");
        w.write_f64(-2.25).expect("f64");

        let mut r = reader(w.into_inner().into_inner(), endianness);
        assert_eq!(r.read_u8().expect("u8"), 0xA5);
        assert_eq!(r.read_i16().expect("i16"), -12345);
        assert_eq!(r.read_u64().expect("u64"), 0x0123_4567_89AB_CDEF);
        assert_eq!(r.read_f32().expect("f32"), 3.5);
        assert_eq!(r.read_f64().expect("f64"), -2.25);
    }
}

#[test]
fn test_array_round_trip_preserves_order() {
    let values: Vec<i32> = vec![i32::MIN, -1, 0, 1, i32::MAX];
    for endianness in [Endianness::Little, Endianness::Big] {
        let mut w = writer(endianness);
        w.write_i32s(&values).expect("write");
        let mut r = reader(w.into_inner().into_inner(), endianness);
        assert_eq!(r.read_i32s(values.len()).expect("read"), values);
    }
}

#[test]
fn test_randomized_round_trips() {
    fastrand::seed(0x5EED);
    for _ in 0..200 {
        let endianness = if fastrand::bool() {
            Endianness::Little
        } else {
            Endianness::Big
        };
        let values: Vec<u64> = (0..fastrand::usize(1..32)).map(|_| fastrand::u64(..)).collect();
        let mut w = writer(endianness);
        w.write_u64s(&values).expect("write");
        let mut r = reader(w.into_inner().into_inner(), endianness);
        assert_eq!(r.read_u64s(values.len()).expect("read"), values);
    }
}

// 12345678909876543210.123456789 as lo/mid/hi/flags words.
const DECIMAL_MANTISSA: u128 = 12_345_678_909_876_543_210_123_456_789;

#[test]
fn test_decimal_golden_bytes_little_endian() {
    let d = Decimal128::from_parts(DECIMAL_MANTISSA, false, 9).expect("in range");
    let mut w = writer(Endianness::Little);
    w.write_decimal(d).expect("write");
    assert_eq!(
        w.into_inner().into_inner(),
        [
            0x15, 0x71, 0x84, 0xA0, 0x75, 0x40, 0xAD, 0xBE, 0x32, 0x1B, 0xE4, 0x27, 0x00, 0x00,
            0x09, 0x00,
        ]
    );
}

#[test]
fn test_decimal_golden_bytes_big_endian_flip_per_word() {
    let d = Decimal128::from_parts(DECIMAL_MANTISSA, false, 9).expect("in range");
    let mut w = writer(Endianness::Big);
    w.write_decimal(d).expect("write");
    // Each of the four words reverses independently; word order is fixed.
    assert_eq!(
        w.into_inner().into_inner(),
        [
            0xA0, 0x84, 0x71, 0x15, 0xBE, 0xAD, 0x40, 0x75, 0x27, 0xE4, 0x1B, 0x32, 0x00, 0x09,
            0x00, 0x00,
        ]
    );
}

#[test]
fn test_decimal_array_round_trip() {
    let values = vec![
        Decimal128::default(),
        Decimal128::from_parts(12345, true, 2).expect("in range"),
        Decimal128::from_parts(DECIMAL_MANTISSA, false, 9).expect("in range"),
        Decimal128::from_parts(98_7654_3210, true, 8).expect("in range"),
    ];
    for endianness in [Endianness::Little, Endianness::Big] {
        let mut w = writer(endianness);
        w.write_decimals(&values).expect("write");
        let mut r = reader(w.into_inner().into_inner(), endianness);
        assert_eq!(r.read_decimals(values.len()).expect("read"), values);
    }
}

#[test]
fn test_malformed_decimal_flags_rejected() {
    // Reserved bit set in the flags word.
    let bytes = vec![0u8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01, 0x00, 0x00, 0x00];
    let mut r = reader(bytes, Endianness::Little);
    match r.read_decimal() {
        Err(Error::InvalidData { .. }) => {}
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_null_terminated_string_golden_bytes() {
    let mut w = writer(Endianness::Little);
    w.write_string_nt("BinaryRecordIO").expect("write");
    let bytes = w.into_inner().into_inner();
    assert_eq!(bytes, *b"BinaryRecordIO\0");

    let mut r = reader(bytes, Endianness::Little);
    assert_eq!(r.read_string_nt().expect("read"), "BinaryRecordIO");
}

#[test]
fn test_utf16_string_bytes_follow_numeric_order() {
    let mut w = writer(Endianness::Big).with_encoding(TextEncoding::Utf16Le);
    w.write_string("Hi", 2).expect("write");
    assert_eq!(w.into_inner().into_inner(), [0x00, 0x48, 0x00, 0x69]);

    let mut w = writer(Endianness::Little).with_encoding(TextEncoding::Utf16Le);
    w.write_string("Hi", 2).expect("write");
    assert_eq!(w.into_inner().into_inner(), [0x48, 0x00, 0x69, 0x00]);
}

#[test]
fn test_fixed_string_truncation_and_padding_round_trip() {
    let mut w = writer(Endianness::Little);
    w.write_string("Binary", 10).expect("pad");
    w.write_string("RecordBinaryIO", 6).expect("truncate");
    let mut r = reader(w.into_inner().into_inner(), Endianness::Little);
    assert_eq!(r.read_string(10).expect("pad"), "Binary\0\0\0\0");
    assert_eq!(r.read_string(6).expect("truncate"), "Record");
}

#[test]
fn test_utf32_string_round_trip() {
    for endianness in [Endianness::Little, Endianness::Big] {
        let mut w = writer(endianness).with_encoding(TextEncoding::Utf32);
        w.write_string_nt("né😀").expect("write");
        let mut r = reader(w.into_inner().into_inner(), endianness)
            .with_encoding(TextEncoding::Utf32);
        assert_eq!(r.read_string_nt().expect("read"), "né😀");
    }
}

#[test]
fn test_ascii_substitutes_out_of_range() {
    let mut w = writer(Endianness::Little);
    w.write_string_nt("héllo").expect("write");
    let mut r = reader(w.into_inner().into_inner(), Endianness::Little);
    assert_eq!(r.read_string_nt().expect("read"), "h?llo");
}

#[test]
fn test_bool_widths_golden_bytes() {
    let mut w = writer(Endianness::Little);
    w.write_bool_width(true, BoolWidth::U32).expect("u32");
    w.write_bool_width(true, BoolWidth::U16).expect("u16");
    w.write_bool(false).expect("u8 default");
    assert_eq!(w.into_inner().into_inner(), [1, 0, 0, 0, 1, 0, 0]);
}

#[test]
fn test_bool_reads_any_nonzero_as_true() {
    let bytes = vec![0, 0, 0x40, 0, 0, 0, 0, 0];
    let mut r = reader(bytes, Endianness::Little).with_bool_width(BoolWidth::U32);
    assert!(r.read_bool().expect("nonzero"));
    assert!(!r.read_bool().expect("zero"));
}

#[test]
fn test_mid_session_default_mutation() {
    let mut w = writer(Endianness::Little);
    w.write_u16(1).expect("le");
    w.set_endianness(Endianness::Big);
    w.write_u16(1).expect("be");
    assert_eq!(w.into_inner().into_inner(), [1, 0, 0, 1]);
}

#[test]
fn test_offset_variants_seek_first() {
    let mut w = writer(Endianness::Little);
    w.write_u32(0).expect("placeholder");
    w.write_u32(0xAABB_CCDD).expect("payload");
    w.write_u32_at(0, 0x1122_3344).expect("backfill");
    let mut r = reader(w.into_inner().into_inner(), Endianness::Little);
    assert_eq!(r.read_u32_at(4).expect("payload"), 0xAABB_CCDD);
    assert_eq!(r.read_u32_at(0).expect("backfill"), 0x1122_3344);
}

#[test]
fn test_peek_does_not_advance() {
    let mut r = reader(vec![0x10, 0x20, 0x30], Endianness::Little);
    assert_eq!(r.peek_u8().expect("peek"), 0x10);
    assert_eq!(r.peek_u8().expect("peek again"), 0x10);
    let mut two = [0u8; 2];
    r.peek_bytes(&mut two).expect("peek bytes");
    assert_eq!(two, [0x10, 0x20]);
    assert_eq!(r.read_u8().expect("advance"), 0x10);
}

#[test]
fn test_end_of_stream_error() {
    let mut r = reader(vec![1, 2], Endianness::Little);
    match r.read_u64() {
        Err(Error::EndOfStream) => {}
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_file_backed_round_trip() {
    let file = tempfile::tempfile().expect("temp file");
    let mut w = EndianWriter::new(file).with_endianness(Endianness::Big);
    w.write_u32(7).expect("u32");
    w.write_string_nt("disk").expect("string");
    let mut file = w.into_inner();
    file.flush().expect("flush");
    file.seek(SeekFrom::Start(0)).expect("rewind");

    let mut r = EndianReader::new(file).with_endianness(Endianness::Big);
    assert_eq!(r.read_u32().expect("u32"), 7);
    assert_eq!(r.read_string_nt().expect("string"), "disk");
}
