//! Arduino IDE command-line driver.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::board::Board;
use crate::error::{Error, Result};

/// Result of one `--verify` run, decoded from the IDE's exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Passed,
    OperationFailed,
    FileNotFound,
    InvalidArgument,
    Unknown(i32),
    /// Killed before it could exit, e.g. by a signal.
    Terminated,
}

impl VerifyOutcome {
    pub fn from_exit_code(code: Option<i32>) -> Self {
        match code {
            Some(0) => VerifyOutcome::Passed,
            Some(1) => VerifyOutcome::OperationFailed,
            Some(2) => VerifyOutcome::FileNotFound,
            Some(3) => VerifyOutcome::InvalidArgument,
            Some(other) => VerifyOutcome::Unknown(other),
            None => VerifyOutcome::Terminated,
        }
    }

    pub fn passed(&self) -> bool {
        *self == VerifyOutcome::Passed
    }
}

impl fmt::Display for VerifyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyOutcome::Passed => f.write_str("Passed"),
            VerifyOutcome::OperationFailed => f.write_str("Operation failed."),
            VerifyOutcome::FileNotFound => f.write_str("File not found"),
            VerifyOutcome::InvalidArgument => f.write_str("Invalid argument"),
            VerifyOutcome::Unknown(code) => write!(f, "Unknown exit code {}", code),
            VerifyOutcome::Terminated => f.write_str("Terminated without exit code"),
        }
    }
}

/// Runs an external program to completion and reports its exit code
/// (`None` when it had none).
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &Path, args: &[OsString]) -> Result<Option<i32>>;
}

/// Spawns real processes. Build output is forwarded to `debug` logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> Result<Option<i32>> {
        debug!("Running {} {:?}", program.display(), args);
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| Error::Launch {
                binary: program.to_path_buf(),
                source,
            })?;
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!("{}", line);
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            debug!("{}", line);
        }
        Ok(output.status.code())
    }
}

/// Location of the IDE binary and the sketchbook it installs libraries into.
#[derive(Clone)]
pub struct Toolchain {
    binary: PathBuf,
    sketchbook: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl Toolchain {
    pub fn new(binary: impl Into<PathBuf>, sketchbook: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            sketchbook: sketchbook.into(),
            runner: Arc::new(ProcessRunner),
        }
    }

    /// Default install locations for the running OS.
    pub fn platform_default() -> Result<Self> {
        let home = dirs::home_dir().ok_or(Error::NoHomeDir)?;
        Self::for_platform(std::env::consts::OS, &home)
    }

    /// Default install locations for `os` (as in `std::env::consts::OS`).
    pub fn for_platform(os: &str, home: &Path) -> Result<Self> {
        let (binary, sketchbook) = match os {
            "macos" => (
                PathBuf::from("/Applications/Arduino.app/Contents/MacOS/JavaApplicationStub"),
                home.join("Documents").join("Arduino"),
            ),
            "windows" => (
                PathBuf::from("arduino.exe"),
                home.join("My Documents").join("Arduino"),
            ),
            "linux" => (PathBuf::from("arduino"), home.join("Arduino")),
            other => return Err(Error::UnsupportedPlatform(other.to_string())),
        };
        Ok(Self::new(binary, sketchbook))
    }

    pub fn with_runner(mut self, runner: impl CommandRunner + 'static) -> Self {
        self.runner = Arc::new(runner);
        self
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_sketchbook(mut self, sketchbook: impl Into<PathBuf>) -> Self {
        self.sketchbook = sketchbook.into();
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn sketchbook(&self) -> &Path {
        &self.sketchbook
    }

    pub fn library_dir(&self) -> PathBuf {
        self.sketchbook.join("libraries")
    }

    pub fn verify_args(sketch: &Path, board: &Board) -> Vec<OsString> {
        vec![
            "--verify".into(),
            sketch.as_os_str().to_owned(),
            "--board".into(),
            board.fqbn.as_str().into(),
            "--verbose-build".into(),
        ]
    }

    /// Compile `sketch` for `board` without uploading.
    ///
    /// A failed compilation is an `Ok` outcome; only failing to launch the
    /// toolchain is an error.
    pub fn verify(&self, sketch: &Path, board: &Board) -> Result<VerifyOutcome> {
        info!("Verifying {} for {}", sketch.display(), board);
        let code = self
            .runner
            .run(&self.binary, &Self::verify_args(sketch, board))?;
        let outcome = VerifyOutcome::from_exit_code(code);
        if !outcome.passed() {
            warn!("{}", outcome);
        }
        Ok(outcome)
    }
}

impl fmt::Debug for Toolchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toolchain")
            .field("binary", &self.binary)
            .field("sketchbook", &self.sketchbook)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Records invocations and answers with a fixed exit code.
    struct FakeRunner {
        code: Option<i32>,
        calls: Arc<Mutex<Vec<(PathBuf, Vec<OsString>)>>>,
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, program: &Path, args: &[OsString]) -> Result<Option<i32>> {
            self.calls
                .lock()
                .push((program.to_path_buf(), args.to_vec()));
            Ok(self.code)
        }
    }

    fn fake(code: Option<i32>) -> (Toolchain, Arc<Mutex<Vec<(PathBuf, Vec<OsString>)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let toolchain = Toolchain::new("arduino", "/sketchbook").with_runner(FakeRunner {
            code,
            calls: calls.clone(),
        });
        (toolchain, calls)
    }

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(VerifyOutcome::from_exit_code(Some(0)), VerifyOutcome::Passed);
        assert_eq!(
            VerifyOutcome::from_exit_code(Some(1)),
            VerifyOutcome::OperationFailed
        );
        assert_eq!(
            VerifyOutcome::from_exit_code(Some(2)),
            VerifyOutcome::FileNotFound
        );
        assert_eq!(
            VerifyOutcome::from_exit_code(Some(3)),
            VerifyOutcome::InvalidArgument
        );
        assert_eq!(
            VerifyOutcome::from_exit_code(Some(127)),
            VerifyOutcome::Unknown(127)
        );
        assert_eq!(VerifyOutcome::from_exit_code(None), VerifyOutcome::Terminated);
        assert!(VerifyOutcome::Passed.passed());
        assert!(!VerifyOutcome::Unknown(0x7f).passed());
    }

    #[test]
    fn test_outcome_messages() {
        assert_eq!(VerifyOutcome::OperationFailed.to_string(), "Operation failed.");
        assert_eq!(VerifyOutcome::FileNotFound.to_string(), "File not found");
        assert_eq!(VerifyOutcome::InvalidArgument.to_string(), "Invalid argument");
    }

    #[test]
    fn test_platform_defaults() {
        let home = Path::new("/home/user");

        let linux = Toolchain::for_platform("linux", home).unwrap();
        assert_eq!(linux.binary(), Path::new("arduino"));
        assert_eq!(linux.library_dir(), home.join("Arduino").join("libraries"));

        let mac = Toolchain::for_platform("macos", home).unwrap();
        assert_eq!(
            mac.binary(),
            Path::new("/Applications/Arduino.app/Contents/MacOS/JavaApplicationStub")
        );
        assert_eq!(mac.sketchbook(), home.join("Documents").join("Arduino"));

        let win = Toolchain::for_platform("windows", home).unwrap();
        assert_eq!(win.binary(), Path::new("arduino.exe"));
        assert_eq!(win.sketchbook(), home.join("My Documents").join("Arduino"));

        assert!(matches!(
            Toolchain::for_platform("haiku", home),
            Err(Error::UnsupportedPlatform(ref os)) if os == "haiku"
        ));
    }

    #[test]
    fn test_verify_command_line() {
        let (toolchain, calls) = fake(Some(0));
        let board = Board::new("Uno", "arduino:avr:uno");
        let outcome = toolchain.verify(Path::new("/x/Basic/Basic.ino"), &board).unwrap();
        assert_eq!(outcome, VerifyOutcome::Passed);

        let calls = calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, PathBuf::from("arduino"));
        let args: Vec<_> = calls[0].1.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            [
                "--verify",
                "/x/Basic/Basic.ino",
                "--board",
                "arduino:avr:uno",
                "--verbose-build"
            ]
        );
    }

    #[test]
    fn test_verify_failure_is_not_an_error() {
        let (toolchain, _) = fake(Some(2));
        let outcome = toolchain
            .verify(Path::new("missing.ino"), &Board::new("Due", "arduino:sam:due"))
            .unwrap();
        assert_eq!(outcome, VerifyOutcome::FileNotFound);
    }

    #[test]
    fn test_missing_binary_is_launch_error() {
        let toolchain = Toolchain::new("/nonexistent/midival-arduino-ide", "/tmp");
        let err = toolchain
            .verify(Path::new("a.ino"), &Board::new("Uno", "arduino:avr:uno"))
            .unwrap_err();
        assert!(matches!(err, Error::Launch { .. }));
    }
}
