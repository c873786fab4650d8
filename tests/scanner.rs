//! Integration tests — require a physical serial QR scanner.
//!
//! Run with: cargo test --test scanner -- --test-threads=1
//!
//! These tests MUST run single-threaded (--test-threads=1) because they share
//! a single serial port. Tests are skipped if no scanner port is configured.
//!
//! Set QR2KEY_PORT to the scanner's port:
//!   QR2KEY_PORT=/dev/ttyUSB0 cargo test --test scanner -- --test-threads=1

use std::time::Duration;

use qr2key::{serial, DecodePolicy, ScannerPort};

fn scanner_port() -> Option<String> {
    match std::env::var("QR2KEY_PORT") {
        Ok(port) => Some(port),
        Err(_) => {
            eprintln!("QR2KEY_PORT not set — skipping scanner integration tests");
            None
        }
    }
}

macro_rules! require_scanner {
    () => {
        match scanner_port() {
            Some(port) => port,
            None => return,
        }
    };
}

#[test]
fn open_and_close() {
    let port = require_scanner!();
    let opened = ScannerPort::open(&port, serial::DEFAULT_BAUD, serial::DEFAULT_TIMEOUT)
        .expect("open failed");
    assert_eq!(opened.name(), port);
    // Dropping must release the handle so the port can be re-opened.
    drop(opened);
    let _ = ScannerPort::open(&port, serial::DEFAULT_BAUD, serial::DEFAULT_TIMEOUT)
        .expect("re-open after close failed");
}

#[test]
fn idle_read_times_out_with_empty_frame() {
    let port = require_scanner!();
    let mut opened = ScannerPort::open(&port, serial::DEFAULT_BAUD, Duration::from_millis(200))
        .expect("open failed");
    // Nothing is being scanned: the read must return, empty, not hang.
    let frame = opened.read_frame().expect("read failed");
    assert!(frame.is_empty(), "expected no data on an idle line");
}

#[test]
fn idle_scan_is_a_decode_failure() {
    let port = require_scanner!();
    let frame = {
        let mut opened =
            ScannerPort::open(&port, serial::DEFAULT_BAUD, Duration::from_millis(200))
                .expect("open failed");
        opened.read_frame().expect("read failed")
    };
    // An empty frame must be reported as failure, never empty-string success.
    assert!(DecodePolicy::default().decode(&frame).is_err());
}

#[test]
fn listed_ports_include_the_scanner() {
    let port = require_scanner!();
    let ports = qr2key::list_ports();
    assert!(
        ports.iter().any(|p| p.name == port),
        "QR2KEY_PORT={port} not in enumerated ports"
    );
}
