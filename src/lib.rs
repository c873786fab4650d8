//! # qr2key
//!
//! Bridge a serial-attached QR scanner to keystroke emulation.
//!
//! Reads one line of scanned text from a serial port, decodes it with an
//! encoding fallback (Shift_JIS, then UTF-8 by default), and replays the
//! text as synthetic keyboard input into whatever window holds focus.
//! A side utility generates a symmetric provisioning key and renders it
//! as a QR image.
//!
//! ## Quick Start
//!
//! ```no_run
//! use qr2key::{DecodePolicy, KeystrokeEmitter, serial};
//!
//! let ports = serial::list_ports();
//! let frame = serial::read_scan(&ports[0].name)?;
//! let text = DecodePolicy::default().decode(&frame)?;
//! KeystrokeEmitter::default().type_text(&text)?;
//! # Ok::<(), qr2key::Qr2KeyError>(())
//! ```

pub mod clipboard;
pub mod decode;
pub mod keystroke;
pub mod provision;
pub mod serial;

pub use clipboard::{clipboard, Clipboard, EchoClipboard, SystemClipboard};
pub use decode::{DecodeCandidate, DecodePolicy, DecodeReport};
pub use keystroke::KeystrokeEmitter;
pub use provision::{generate_key, key_to_qr, DEFAULT_QR_PATH};
pub use serial::{list_ports, read_scan, PortChoice, PortInfo, ScannerPort};

/// Errors returned by the qr2key crate.
#[derive(Debug, thiserror::Error)]
pub enum Qr2KeyError {
    /// No serial ports are available on this machine.
    #[error("No serial ports found")]
    NoPorts,

    /// Serial transport error (open, read, close).
    #[error("Serial error: {0}")]
    Serial(String),

    /// No usable text could be extracted from a received frame.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Keystroke injection was rejected by the OS.
    #[error("Keystroke injection error: {0}")]
    Inject(String),

    /// Clipboard access failed.
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// Key generation or QR rendering failed.
    #[error("Provisioning error: {0}")]
    Provision(String),
}
