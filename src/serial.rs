//! Serial port enumeration, selection, and one-shot line reads.

use serialport::{SerialPort, SerialPortType};
use std::io::Read;
use std::time::Duration;

use crate::Qr2KeyError;

/// Baud rate used by common handheld QR scanners in serial mode.
pub const DEFAULT_BAUD: u32 = 9_600;

/// Read timeout for one scan.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// How many bad selections to tolerate before giving up.
pub const MAX_SELECT_ATTEMPTS: u32 = 5;

/// An available serial device with a human-readable description.
#[derive(Debug, Clone)]
pub struct PortInfo {
    /// Port path (e.g. `/dev/ttyUSB0`, `COM3`).
    pub name: String,
    /// Description from the USB descriptor where available.
    pub description: String,
}

/// List all serial devices visible on this machine, sorted by name.
pub fn list_ports() -> Vec<PortInfo> {
    let mut ports: Vec<PortInfo> = serialport::available_ports()
        .unwrap_or_default()
        .into_iter()
        .map(|p| {
            let description = match p.port_type {
                SerialPortType::UsbPort(usb) => usb
                    .product
                    .unwrap_or_else(|| "USB serial device".to_string()),
                SerialPortType::PciPort => "PCI serial device".to_string(),
                SerialPortType::BluetoothPort => "Bluetooth serial device".to_string(),
                SerialPortType::Unknown => "Serial device".to_string(),
            };
            PortInfo {
                name: p.port_name,
                description,
            }
        })
        .collect();
    ports.sort_by(|a, b| a.name.cmp(&b.name));
    ports
}

/// Outcome of parsing one line of port-selection input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortChoice {
    /// User asked to cancel (`q`).
    Quit,
    /// Valid 1-based ordinal, converted to a 0-based index.
    Pick(usize),
    /// Non-numeric or out-of-range input; caller should re-prompt.
    Invalid,
}

/// Parse one selection line against a list of `count` ports.
///
/// Selection is by 1-based ordinal as printed by the menu. `q` cancels.
pub fn parse_port_choice(line: &str, count: usize) -> PortChoice {
    let trimmed = line.trim();
    if trimmed.eq_ignore_ascii_case("q") {
        return PortChoice::Quit;
    }
    match trimmed.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => PortChoice::Pick(n - 1),
        _ => PortChoice::Invalid,
    }
}

/// An open serial connection to a QR scanner.
///
/// The handle is released when the value is dropped, on every exit path.
pub struct ScannerPort {
    port: Box<dyn SerialPort>,
    name: String,
}

impl ScannerPort {
    /// Open a scanner port at the given baud rate and read timeout.
    pub fn open(port_name: &str, baud: u32, timeout: Duration) -> Result<Self, Qr2KeyError> {
        let port = serialport::new(port_name, baud)
            .timeout(timeout)
            .open()
            .map_err(|e| Qr2KeyError::Serial(format!("Failed to open {port_name}: {e}")))?;
        log::debug!("Opened {port_name} at {baud} baud");
        Ok(Self {
            port,
            name: port_name.to_string(),
        })
    }

    /// Port path this connection was opened on.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read one raw frame: bytes up to and including `\n`, or whatever
    /// arrived before the read timeout.
    ///
    /// A timeout with partial data returns the partial frame; a timeout
    /// with no data returns an empty frame. Bytes after the terminator in
    /// the same chunk are discarded; the scanner sends one line per
    /// trigger and the handle is closed after the read.
    pub fn read_frame(&mut self) -> Result<Vec<u8>, Qr2KeyError> {
        let mut frame = Vec::new();
        let mut buf = [0u8; 256];
        loop {
            match self.port.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if let Some(pos) = buf[..n].iter().position(|&b| b == b'\n') {
                        frame.extend_from_slice(&buf[..=pos]);
                        break;
                    }
                    frame.extend_from_slice(&buf[..n]);
                }
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => break,
                Err(e) => {
                    return Err(Qr2KeyError::Serial(format!(
                        "Read from {} failed: {e}",
                        self.name
                    )))
                }
            }
        }
        log::debug!("Received {} bytes from {}", frame.len(), self.name);
        Ok(frame)
    }
}

impl Drop for ScannerPort {
    fn drop(&mut self) {
        log::debug!("Closed {}", self.name);
    }
}

/// Perform exactly one scan: open `port_name` with the default baud rate
/// and timeout, read one frame, and close the port.
pub fn read_scan(port_name: &str) -> Result<Vec<u8>, Qr2KeyError> {
    let mut port = ScannerPort::open(port_name, DEFAULT_BAUD, DEFAULT_TIMEOUT)?;
    port.read_frame()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_ports_does_not_panic() {
        // May be empty on CI machines; enumeration itself must not fail.
        let _ = list_ports();
    }

    #[test]
    fn open_bogus_port_fails() {
        let result = ScannerPort::open("/dev/nonexistent_port_xyz", DEFAULT_BAUD, DEFAULT_TIMEOUT);
        assert!(matches!(result, Err(Qr2KeyError::Serial(_))));
    }

    #[test]
    fn choice_quit() {
        assert_eq!(parse_port_choice("q", 3), PortChoice::Quit);
        assert_eq!(parse_port_choice(" Q \n", 3), PortChoice::Quit);
    }

    #[test]
    fn choice_valid_is_zero_based() {
        assert_eq!(parse_port_choice("1", 3), PortChoice::Pick(0));
        assert_eq!(parse_port_choice("3\n", 3), PortChoice::Pick(2));
    }

    #[test]
    fn choice_out_of_range() {
        assert_eq!(parse_port_choice("0", 3), PortChoice::Invalid);
        assert_eq!(parse_port_choice("4", 3), PortChoice::Invalid);
    }

    #[test]
    fn choice_non_numeric() {
        assert_eq!(parse_port_choice("abc", 3), PortChoice::Invalid);
        assert_eq!(parse_port_choice("", 3), PortChoice::Invalid);
        assert_eq!(parse_port_choice("1.5", 3), PortChoice::Invalid);
    }
}
