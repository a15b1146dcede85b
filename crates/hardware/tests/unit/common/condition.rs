//! # Condition Code Tests
//!
//! The status word encoding is not monotonic: LT=1, EQ=0, GT=2.

use rstest::rstest;
use sicsim_core::common::ConditionCode;

#[rstest]
#[case(-5, 3, ConditionCode::Less)]
#[case(3, 3, ConditionCode::Equal)]
#[case(4, -3, ConditionCode::Greater)]
#[case(-8_388_608, 8_388_607, ConditionCode::Less)]
fn test_compare(#[case] lhs: i64, #[case] rhs: i64, #[case] expected: ConditionCode) {
    assert_eq!(ConditionCode::compare(lhs, rhs), expected);
}

#[test]
fn test_raw_encoding() {
    assert_eq!(ConditionCode::Less as u32, 1);
    assert_eq!(ConditionCode::Equal as u32, 0);
    assert_eq!(ConditionCode::Greater as u32, 2);
}

#[test]
fn test_from_raw_rejects_other_values() {
    assert_eq!(ConditionCode::from_raw(1), Some(ConditionCode::Less));
    assert_eq!(ConditionCode::from_raw(0), Some(ConditionCode::Equal));
    assert_eq!(ConditionCode::from_raw(2), Some(ConditionCode::Greater));
    assert_eq!(ConditionCode::from_raw(3), None);
}

#[test]
fn test_names() {
    assert_eq!(ConditionCode::Less.as_str(), "LT");
    assert_eq!(ConditionCode::Equal.as_str(), "EQ");
    assert_eq!(ConditionCode::Greater.as_str(), "GT");
}
