use midival_midi_io::{MidiDriver, MidirDriver};

fn main() -> midival_midi_io::Result<()> {
    let ports = MidirDriver::new().available_ports()?;

    println!("=== MIDI Input Ports ===");
    if ports.inputs.is_empty() {
        println!("  (none found)");
    }
    for port in &ports.inputs {
        println!("  {}", port);
    }

    println!("\n=== MIDI Output Ports ===");
    if ports.outputs.is_empty() {
        println!("  (none found)");
    }
    for port in &ports.outputs {
        println!("  {}", port);
    }
    Ok(())
}
