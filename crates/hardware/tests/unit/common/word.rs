//! # Word Codec Tests

use proptest::prelude::*;
use sicsim_core::common::{bytes_to_signed_int, int_to_bytes, sign_extend};

#[test]
fn test_three_byte_fields_are_sign_extended() {
    assert_eq!(bytes_to_signed_int(&[0xFF, 0xFF, 0xFF]), -1);
    assert_eq!(bytes_to_signed_int(&[0x80, 0x00, 0x00]), -8_388_608);
    assert_eq!(bytes_to_signed_int(&[0x00, 0x10, 0x00]), 0x1000);
}

#[test]
fn test_one_byte_fields_are_sign_extended() {
    assert_eq!(bytes_to_signed_int(&[0x7F]), 127);
    assert_eq!(bytes_to_signed_int(&[0x80]), -128);
}

#[test]
fn test_other_widths_are_unsigned() {
    assert_eq!(bytes_to_signed_int(&[]), 0);
    assert_eq!(bytes_to_signed_int(&[0xFF, 0xFE]), 0xFFFE);
}

#[test]
fn test_int_to_bytes_keeps_low_24_bits() {
    assert_eq!(int_to_bytes(-1), [0xFF, 0xFF, 0xFF]);
    assert_eq!(int_to_bytes(0x0112_3456), [0x12, 0x34, 0x56]);
}

#[test]
fn test_sign_extend_12_bit_displacement() {
    assert_eq!(sign_extend(0xFFD, 12), -3);
    assert_eq!(sign_extend(0x7FF, 12), 2047);
    assert_eq!(sign_extend(0x800, 12), -2048);
}

proptest! {
    #[test]
    fn prop_word_values_survive_the_codec(value in -8_388_608i32..=8_388_607) {
        prop_assert_eq!(bytes_to_signed_int(&int_to_bytes(value)), value);
    }
}
