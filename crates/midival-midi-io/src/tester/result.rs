//! Per-check results and run summaries.

use std::fmt;
use std::time::Duration;

use midival_midi::MidiMessage;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The echo matched the sent message byte for byte.
    Passed,
    /// Something came back, but not the sent bytes.
    Mismatch,
    /// Nothing came back before the echo timeout.
    NoResponse,
}

/// One round-trip attempt. `expected` always equals `sent` under the loopback
/// protocol; both are kept so reports read naturally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub sent: MidiMessage,
    pub expected: MidiMessage,
    pub received: Option<MidiMessage>,
    pub outcome: CheckOutcome,
    /// Time from send until the echo arrived, or the full timeout.
    pub waited: Duration,
}

impl CheckResult {
    pub(crate) fn new(sent: MidiMessage, received: Option<MidiMessage>, waited: Duration) -> Self {
        let outcome = match &received {
            None => CheckOutcome::NoResponse,
            Some(received) if *received == sent => CheckOutcome::Passed,
            Some(_) => CheckOutcome::Mismatch,
        };
        Self {
            expected: sent.clone(),
            sent,
            received,
            outcome,
            waited,
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome == CheckOutcome::Passed
    }

    /// `Ok` for a passed check, otherwise the matching error.
    pub fn into_result(self) -> Result<()> {
        match (self.outcome, self.received) {
            (CheckOutcome::Passed, _) => Ok(()),
            (CheckOutcome::Mismatch, Some(received)) => Err(Error::ContentMismatch {
                expected: self.expected,
                received,
            }),
            (_, _) => Err(Error::EchoTimeout {
                sent: self.sent,
                waited: self.waited,
            }),
        }
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sent = self.sent.to_string();
        match (&self.outcome, &self.received) {
            (CheckOutcome::Passed, _) => write!(f, "{:40} PASSED", sent),
            (CheckOutcome::Mismatch, Some(received)) => write!(
                f,
                "{:40} FAILED (received {}, expected {})",
                sent, received, self.expected
            ),
            (_, _) => write!(
                f,
                "{:40} FAILED (no response within {} ms)",
                sent,
                self.waited.as_millis()
            ),
        }
    }
}

/// Results of a sequence of checks, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub results: Vec<CheckResult>,
}

impl RunSummary {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    pub fn no_response(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome == CheckOutcome::NoResponse)
            .count()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} check(s): {} passed, {} failed",
            self.results.len(),
            self.passed(),
            self.failed()
        )?;
        let silent = self.no_response();
        if silent > 0 {
            write!(f, " ({} without response)", silent)?;
        }
        Ok(())
    }
}
