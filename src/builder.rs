//! Builder for configuring and constructing a `Validator`.

use std::path::PathBuf;

#[cfg(feature = "runtime")]
use std::time::Duration;

#[cfg(feature = "compile")]
use midival_arduino::{default_boards, Board};

#[cfg(feature = "runtime")]
use midival_midi::MidiMessage;

use crate::Validator;

/// Which driver the runtime check talks to.
#[cfg(feature = "runtime")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiBackend {
    /// System MIDI ports through midir.
    #[cfg(feature = "midi-hardware")]
    Hardware,
    /// In-memory port that echoes everything back. Useful for dry runs.
    Loopback,
}

#[cfg(feature = "runtime")]
impl Default for MidiBackend {
    fn default() -> Self {
        #[cfg(feature = "midi-hardware")]
        {
            MidiBackend::Hardware
        }
        #[cfg(not(feature = "midi-hardware"))]
        {
            MidiBackend::Loopback
        }
    }
}

/// Compile settings apply only with the `compile` feature, runtime settings
/// only with `runtime`. Unset toolchain paths fall back to the platform
/// defaults when the compile check runs.
///
/// # Example
///
/// ```ignore
/// use midival::prelude::*;
///
/// let validator = Validator::builder()
///     .root("path/to/arduino_midi_library")
///     .echo_timeout(Duration::from_millis(500))
///     .build();
///
/// let report = validator.compile()?;
/// ```
pub struct ValidatorBuilder {
    root: PathBuf,

    #[cfg(feature = "compile")]
    arduino: Option<PathBuf>,
    #[cfg(feature = "compile")]
    sketchbook: Option<PathBuf>,
    #[cfg(feature = "compile")]
    boards: Vec<Board>,

    #[cfg(feature = "runtime")]
    backend: MidiBackend,
    #[cfg(feature = "runtime")]
    echo_timeout: Duration,
    #[cfg(feature = "runtime")]
    suite: Option<Vec<MidiMessage>>,
}

impl Default for ValidatorBuilder {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),

            #[cfg(feature = "compile")]
            arduino: None,
            #[cfg(feature = "compile")]
            sketchbook: None,
            #[cfg(feature = "compile")]
            boards: default_boards(),

            #[cfg(feature = "runtime")]
            backend: MidiBackend::default(),
            #[cfg(feature = "runtime")]
            echo_timeout: midival_midi_io::DEFAULT_ECHO_TIMEOUT,
            #[cfg(feature = "runtime")]
            suite: None,
        }
    }
}

impl ValidatorBuilder {
    /// Library repository root (containing `src/` and `res/`). Default: `.`
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Arduino IDE binary.
    #[cfg(feature = "compile")]
    pub fn arduino(mut self, binary: impl Into<PathBuf>) -> Self {
        self.arduino = Some(binary.into());
        self
    }

    #[cfg(feature = "compile")]
    pub fn sketchbook(mut self, sketchbook: impl Into<PathBuf>) -> Self {
        self.sketchbook = Some(sketchbook.into());
        self
    }

    /// Default: Uno, Leonardo, Mega, Due
    #[cfg(feature = "compile")]
    pub fn boards(mut self, boards: Vec<Board>) -> Self {
        self.boards = boards;
        self
    }

    #[cfg(feature = "runtime")]
    pub fn backend(mut self, backend: MidiBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Default: 1 s
    #[cfg(feature = "runtime")]
    pub fn echo_timeout(mut self, timeout: Duration) -> Self {
        self.echo_timeout = timeout;
        self
    }

    /// Messages for the runtime check. Default: the thru suite.
    #[cfg(feature = "runtime")]
    pub fn suite(mut self, messages: Vec<MidiMessage>) -> Self {
        self.suite = Some(messages);
        self
    }

    pub fn build(self) -> Validator {
        Validator {
            root: self.root,

            #[cfg(feature = "compile")]
            arduino: self.arduino,
            #[cfg(feature = "compile")]
            sketchbook: self.sketchbook,
            #[cfg(feature = "compile")]
            boards: self.boards,

            #[cfg(feature = "runtime")]
            backend: self.backend,
            #[cfg(feature = "runtime")]
            echo_timeout: self.echo_timeout,
            #[cfg(feature = "runtime")]
            suite: self
                .suite
                .unwrap_or_else(midival_midi_io::default_thru_suite),
        }
    }
}
