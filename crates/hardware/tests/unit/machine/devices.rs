//! # Device Registry Tests

use crate::common::mocks::device::{BufferDevice, MockByteDevice};
use rstest::rstest;
use sicsim_core::machine::devices::{ConsoleStream, FileDevice, canonical_name, device_name};
use sicsim_core::machine::{Device, DeviceBus};
use std::fs;
use tempfile::TempDir;

#[rstest]
#[case("00", Some(ConsoleStream::Stdin))]
#[case("stdin", Some(ConsoleStream::Stdin))]
#[case("01", Some(ConsoleStream::Stdout))]
#[case("StdOut", Some(ConsoleStream::Stdout))]
#[case("02", Some(ConsoleStream::Stderr))]
#[case("STDERR", Some(ConsoleStream::Stderr))]
#[case("03", None)]
#[case("F1", None)]
fn test_console_aliases(#[case] name: &str, #[case] expected: Option<ConsoleStream>) {
    assert_eq!(ConsoleStream::from_name(name), expected);
}

#[test]
fn test_canonical_names() {
    assert_eq!(canonical_name("stdout"), "01");
    assert_eq!(canonical_name("f1"), "F1");
    assert_eq!(device_name(0xF1), "F1");
    assert_eq!(device_name(5), "05");
}

#[test]
fn test_console_is_always_ready() {
    let mut bus = DeviceBus::default();
    assert!(bus.test("00"));
    assert!(bus.test("STDOUT"));
    assert!(bus.test("02"));
    assert_eq!(bus.last_accessed(), Some("02"));
}

#[test]
fn test_attached_device_is_used() {
    let mut bus = DeviceBus::default();
    bus.attach(Box::new(BufferDevice::new("f1", b"xyz")));
    assert_eq!(bus.read("F1", 2), b"xy");
    assert_eq!(bus.read("F1", 5), b"z");
    assert_eq!(bus.read("F1", 1), b"");
}

#[test]
fn test_replacing_a_device_closes_the_old_one() {
    let mut old = MockByteDevice::new();
    let _ = old.expect_name().return_const("F2".to_owned());
    let _ = old.expect_close().times(1).return_const(());

    let mut bus = DeviceBus::default();
    bus.attach(Box::new(old));
    bus.attach(Box::new(BufferDevice::new("F2", b"")));
}

#[test]
fn test_close_all_closes_and_forgets() {
    let mut device = MockByteDevice::new();
    let _ = device.expect_name().return_const("F4".to_owned());
    let _ = device.expect_is_ready().return_const(true);
    let _ = device.expect_close().times(1).return_const(());

    let dir = TempDir::new().unwrap();
    let mut bus = DeviceBus::new(dir.path());
    bus.attach(Box::new(device));
    assert!(bus.test("F4"));

    bus.close_all();
    assert_eq!(bus.last_accessed(), None);
    // The name now resolves to a missing file.
    assert!(!bus.test("F4"));
}

#[test]
fn test_file_device_reads_and_writes() {
    let dir = TempDir::new().unwrap();
    let mut device = FileDevice::new("0A", dir.path());
    assert!(!device.is_ready());
    assert_eq!(device.read(&mut [0; 4]), 0);

    assert_eq!(device.write(b"hello"), 5);
    assert!(device.is_ready());
    device.close();
    assert_eq!(fs::read(dir.path().join("0A")).unwrap(), b"hello");

    let mut buf = [0; 8];
    assert_eq!(device.read(&mut buf), 5);
    assert_eq!(&buf[..5], b"hello");
}

#[test]
fn test_file_device_existing_file_is_ready() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("1B"), b"").unwrap();
    let mut device = FileDevice::new("1B", dir.path());
    assert!(device.is_ready());
    assert_eq!(device.path(), dir.path().join("1B"));
}
