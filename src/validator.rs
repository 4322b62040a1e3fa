//! Validator: runs the compile and runtime checks.

use std::path::Path;
#[cfg(feature = "compile")]
use std::path::PathBuf;
#[cfg(feature = "runtime")]
use std::time::Duration;

#[cfg(feature = "compile")]
use midival_arduino::{ArduinoMidiLibrary, Board, CompileReport, LibraryLayout, Toolchain};
#[cfg(feature = "runtime")]
use midival_midi::MidiMessage;
#[cfg(feature = "runtime")]
use midival_midi_io::{LoopbackDriver, MidiInterface, PortPrompt, RoundTripTester, RunSummary};
use tracing::info;

#[cfg(feature = "runtime")]
use crate::builder::MidiBackend;
use crate::builder::ValidatorBuilder;
use crate::Result;

/// Validation entry point. Each check is independent and can be run any
/// number of times; runtime checks open and release the MIDI ports per run.
pub struct Validator {
    pub(crate) root: std::path::PathBuf,

    #[cfg(feature = "compile")]
    pub(crate) arduino: Option<PathBuf>,
    #[cfg(feature = "compile")]
    pub(crate) sketchbook: Option<PathBuf>,
    #[cfg(feature = "compile")]
    pub(crate) boards: Vec<Board>,

    #[cfg(feature = "runtime")]
    pub(crate) backend: MidiBackend,
    #[cfg(feature = "runtime")]
    pub(crate) echo_timeout: Duration,
    #[cfg(feature = "runtime")]
    pub(crate) suite: Vec<MidiMessage>,
}

impl Validator {
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::default()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Toolchain with any configured paths applied over the platform defaults.
    #[cfg(feature = "compile")]
    pub fn toolchain(&self) -> Result<Toolchain> {
        let toolchain = match (&self.arduino, &self.sketchbook) {
            (Some(binary), Some(sketchbook)) => Toolchain::new(binary, sketchbook),
            (binary, sketchbook) => {
                let mut toolchain = Toolchain::platform_default()?;
                if let Some(binary) = binary {
                    toolchain = toolchain.with_binary(binary);
                }
                if let Some(sketchbook) = sketchbook {
                    toolchain = toolchain.with_sketchbook(sketchbook);
                }
                toolchain
            }
        };
        Ok(toolchain)
    }

    #[cfg(feature = "compile")]
    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    /// Stage the library into the sketchbook and compile every example for
    /// every board, stopping at the first failure.
    #[cfg(feature = "compile")]
    pub fn compile(&self) -> Result<CompileReport> {
        let toolchain = self.toolchain()?;
        self.compile_with(&toolchain)
    }

    #[cfg(feature = "compile")]
    pub fn compile_with(&self, toolchain: &Toolchain) -> Result<CompileReport> {
        let library = ArduinoMidiLibrary::scan(LibraryLayout::new(&self.root))?;
        library.install(toolchain)?;
        let report = ArduinoMidiLibrary::validate(toolchain, &self.boards)?;
        info!(
            "Compilation test {}",
            if report.passed() { "passed" } else { "failed" }
        );
        Ok(report)
    }

    #[cfg(feature = "runtime")]
    pub fn backend(&self) -> MidiBackend {
        self.backend
    }

    #[cfg(feature = "runtime")]
    pub fn echo_timeout(&self) -> Duration {
        self.echo_timeout
    }

    #[cfg(feature = "runtime")]
    pub fn suite(&self) -> &[MidiMessage] {
        &self.suite
    }

    /// Open the configured backend, resolving ports through `prompt`, and run
    /// the round-trip suite. Fails with `NoPortsAvailable` when a direction
    /// has no port.
    #[cfg(feature = "runtime")]
    pub fn runtime(&self, prompt: &mut dyn PortPrompt) -> Result<RunSummary> {
        let interface = match self.backend {
            #[cfg(feature = "midi-hardware")]
            MidiBackend::Hardware => {
                MidiInterface::open(midival_midi_io::MidirDriver::new(), None, prompt)?
            }
            MidiBackend::Loopback => MidiInterface::open(LoopbackDriver::new(), None, prompt)?,
        };
        self.runtime_with(interface)
    }

    /// Run the round-trip suite over an already opened interface.
    #[cfg(feature = "runtime")]
    pub fn runtime_with(&self, interface: MidiInterface) -> Result<RunSummary> {
        info!(
            "Runtime test over {} ({} check(s))",
            interface.driver_name(),
            self.suite.len()
        );
        let mut tester = RoundTripTester::builder(interface)
            .echo_timeout(self.echo_timeout)
            .build()?;
        Ok(tester.run(&self.suite)?)
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Validator");
        s.field("root", &self.root);
        #[cfg(feature = "compile")]
        s.field("boards", &self.boards);
        #[cfg(feature = "runtime")]
        s.field("backend", &self.backend)
            .field("echo_timeout", &self.echo_timeout);
        s.finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let validator = Validator::builder().build();
        assert_eq!(validator.root(), Path::new("."));
        #[cfg(feature = "compile")]
        assert_eq!(validator.boards().len(), 4);
        #[cfg(feature = "runtime")]
        {
            assert_eq!(validator.echo_timeout(), Duration::from_millis(1000));
            assert_eq!(validator.suite().len(), 9);
        }
    }

    #[cfg(feature = "compile")]
    #[test]
    fn test_explicit_toolchain_paths() {
        let validator = Validator::builder()
            .arduino("/opt/arduino/arduino")
            .sketchbook("/tmp/sketchbook")
            .build();
        let toolchain = validator.toolchain().unwrap();
        assert_eq!(toolchain.binary(), Path::new("/opt/arduino/arduino"));
        assert_eq!(
            toolchain.library_dir(),
            Path::new("/tmp/sketchbook/libraries")
        );
    }

    #[cfg(feature = "runtime")]
    #[test]
    fn test_custom_suite() {
        let suite = vec![MidiMessage::note_on(1, 60, 100)];
        let validator = Validator::builder()
            .backend(MidiBackend::Loopback)
            .suite(suite.clone())
            .build();
        assert_eq!(validator.suite(), suite.as_slice());
    }
}
