//! Round-trip check against a real device.
//!
//! Connect the device under test (running a thru sketch) and run:
//!   cargo run -p midival-midi-io --example thru_check
//!
//! With several ports present the port is chosen interactively.

use std::time::Duration;

use midival_midi_io::{
    default_thru_suite, LinePrompt, MidiInterface, MidirDriver, RoundTripTester,
};

fn main() -> midival_midi_io::Result<()> {
    tracing_subscriber::fmt::init();

    let interface = MidiInterface::open(MidirDriver::new(), None, &mut LinePrompt::stdio())?;
    if !interface.is_connected() {
        eprintln!("No MIDI ports available, bailing out.");
        std::process::exit(1);
    }
    if let Some(session) = interface.session() {
        println!(
            "Connected: in {} / out {}",
            session.input_port(),
            session.output_port()
        );
    }

    let mut tester = RoundTripTester::builder(interface)
        .echo_timeout(Duration::from_millis(500))
        .build()?;
    let summary = tester.run(&default_thru_suite())?;
    for result in &summary.results {
        println!("{}", result);
    }
    println!("{}", summary);
    Ok(())
}
