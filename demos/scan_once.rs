use qr2key::{list_ports, read_scan, DecodePolicy};

fn main() -> Result<(), qr2key::Qr2KeyError> {
    // Enumerate serial devices
    let ports = list_ports();
    if ports.is_empty() {
        eprintln!("No serial ports found.");
        std::process::exit(1);
    }
    for p in &ports {
        println!("Found: {} - {}", p.name, p.description);
    }

    // One scan from the first port: open, read a line, close
    let first = &ports[0].name;
    println!("\nReading one scan from {first}...");
    let frame = read_scan(first)?;
    println!("Raw frame: {} bytes", frame.len());

    // Decode with the default Shift_JIS -> UTF-8 fallback
    let policy = DecodePolicy::default();
    let text = policy.decode(&frame)?;
    println!("Decoded:   {text}");

    // Full diagnostics for the same frame
    let report = policy.inspect(&frame);
    println!("\nHex: {}", report.hex);
    for candidate in &report.candidates {
        println!(
            "{:<9} clean={} {}",
            candidate.encoding, candidate.clean, candidate.text
        );
    }

    Ok(())
}
