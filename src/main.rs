//! qr2key command-line tool: interactive shell and diagnostic mode.

use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;

use qr2key::{
    clipboard, generate_key, key_to_qr, list_ports,
    read_scan, serial, DecodePolicy, KeystrokeEmitter, PortChoice, ScannerPort, DEFAULT_QR_PATH,
};

#[derive(Parser)]
#[command(name = "qr2key", version, about = "Serial QR scanner to keyboard bridge")]
struct Cli {
    /// Run the diagnostic sub-menu (raw serial inspection, keystroke test)
    #[arg(long)]
    test: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    if cli.test {
        run_test_menu();
    } else {
        run_shell();
    }
}

/// Print `text`, then read one line from stdin. `None` on EOF or error.
fn prompt(text: &str) -> Option<String> {
    print!("{text}");
    io::stdout().flush().ok()?;
    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line),
        Err(_) => None,
    }
}

/// List ports and let the user pick one by ordinal. Bounded retry:
/// after too many invalid inputs the selection is abandoned.
fn select_port() -> Option<String> {
    let ports = list_ports();
    if ports.is_empty() {
        println!("No serial ports found.");
        return None;
    }

    println!("Available serial ports:");
    for (i, p) in ports.iter().enumerate() {
        println!("  {}. {} - {}", i + 1, p.name, p.description);
    }

    for _ in 0..serial::MAX_SELECT_ATTEMPTS {
        let line = prompt(&format!(
            "Port number (1-{}), or q to cancel: ",
            ports.len()
        ))?;
        match serial::parse_port_choice(&line, ports.len()) {
            PortChoice::Quit => return None,
            PortChoice::Pick(i) => return Some(ports[i].name.clone()),
            PortChoice::Invalid => println!("Invalid selection."),
        }
    }
    println!("Too many invalid selections, cancelling.");
    None
}

fn run_shell() {
    println!("QR2Key - serial QR scanner to keyboard bridge");
    println!("=============================================");

    let Some(mut port) = select_port() else {
        println!("Cancelled.");
        return;
    };

    loop {
        println!();
        println!("Select an option:");
        println!("  1. Scan a QR code and type it");
        println!("  2. Change serial port (current: {port})");
        println!("  3. Generate a provisioning key QR");
        println!("  q. Quit");
        let Some(choice) = prompt("Choice: ") else { break };

        match choice.trim().to_ascii_lowercase().as_str() {
            "1" => scan_and_type(&port),
            "2" => {
                if let Some(new_port) = select_port() {
                    port = new_port;
                    println!("Serial port changed to {port}.");
                }
            }
            "3" => provision_key(),
            "q" => break,
            _ => println!("Invalid choice, try again."),
        }
    }
    println!("Bye.");
}

/// One scan cycle: read a frame, decode it, replay it as keystrokes.
/// Every failure is printed and returns to the menu.
fn scan_and_type(port: &str) {
    println!("Opening {port}. Scan a QR code...");
    let frame = match read_scan(port) {
        Ok(frame) => frame,
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };
    let text = match DecodePolicy::default().decode(&frame) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };
    if text.is_empty() {
        println!("Scan decoded to empty text, nothing to type.");
        return;
    }

    println!("Received {} characters.", text.chars().count());
    println!("Focus the target input field...");
    let emitter = KeystrokeEmitter::default();
    match emitter.type_text_with_progress(&text, |remaining| println!("{remaining}...")) {
        Ok(()) => println!("Done typing."),
        Err(e) => eprintln!("{e}"),
    }
}

/// Generate a key, render its QR, and offer the key text via clipboard.
fn provision_key() {
    let path = prompt(&format!("Output path [{DEFAULT_QR_PATH}]: "))
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .unwrap_or_else(|| DEFAULT_QR_PATH.to_string());

    let key = generate_key();
    match key_to_qr(&key, Path::new(&path)) {
        Ok(written) => {
            println!("Key QR saved to {}.", written.display());
            let mut clip = clipboard();
            match clip.set_text(&key) {
                Ok(()) => println!("Key text placed on {}.", clip.name()),
                Err(e) => eprintln!("{e}"),
            }
        }
        Err(e) => eprintln!("{e}"),
    }
}

fn run_test_menu() {
    println!("QR2Key - diagnostic mode");
    println!("========================");
    println!();
    println!("  1. Raw serial inspection");
    println!("  2. Keystroke emission test");
    println!("  q. Quit");
    let Some(choice) = prompt("Choice: ") else { return };

    match choice.trim().to_ascii_lowercase().as_str() {
        "1" => {
            if let Some(port) = select_port() {
                listen(&port);
            }
        }
        "2" => keystroke_test(),
        _ => {}
    }
}

/// Continuous listen loop with per-frame decode diagnostics.
///
/// A detached watcher thread flips the stop flag when the user presses
/// Enter; the port closes by drop on every exit path.
fn listen(port_name: &str) {
    let mut port = match ScannerPort::open(port_name, serial::DEFAULT_BAUD, serial::DEFAULT_TIMEOUT)
    {
        Ok(port) => port,
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };
    println!("Listening on {port_name}. Press Enter to stop.");

    let stop = Arc::new(AtomicBool::new(false));
    let watcher_stop = Arc::clone(&stop);
    thread::spawn(move || {
        let mut line = String::new();
        let _ = io::stdin().read_line(&mut line);
        watcher_stop.store(true, Ordering::Relaxed);
    });

    let policy = DecodePolicy::default();
    while !stop.load(Ordering::Relaxed) {
        let frame = match port.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                eprintln!("{e}");
                break;
            }
        };
        if frame.is_empty() {
            continue;
        }
        let report = policy.inspect(&frame);
        println!("Received ({} bytes): {}", frame.len(), report.hex);
        for candidate in &report.candidates {
            let marker = if candidate.clean { " " } else { "!" };
            println!("  {marker} {:<9} {}", candidate.encoding, candidate.text);
        }
        println!("------------------------------");
    }
    println!("Stopped listening, closing {}.", port.name());
}

/// Type a canned (or user-supplied) string after a flat focus delay.
fn keystroke_test() {
    const CANNED: &str = "テスト入力 ABC 123";
    let text = prompt(&format!("Text to type [{CANNED}]: "))
        .map(|line| line.trim_end_matches(['\r', '\n']).to_string())
        .filter(|line| !line.is_empty())
        .unwrap_or_else(|| CANNED.to_string());

    println!("Focus the target input field. Typing in 5 seconds...");
    thread::sleep(Duration::from_secs(5));

    let emitter = KeystrokeEmitter::with_countdown(0);
    match emitter.type_text(&text) {
        Ok(()) => println!("Done."),
        Err(e) => eprintln!("{e}"),
    }
}
