use std::io::{self, BufRead, StdinLock, Stdout, Write};

use tracing::{debug, warn};

use super::{AvailablePorts, PortDirection, PortInfo, PortLayout};
use crate::error::{Error, Result};

/// Asks the user to pick one of several ports.
pub trait PortPrompt {
    /// Returns the index the user typed. Range checking is left to the caller.
    fn choose(&mut self, direction: PortDirection, ports: &[PortInfo]) -> Result<usize>;
}

/// Line-oriented prompt: prints the enumerated list, reads one base-10 index.
pub struct LinePrompt<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl LinePrompt<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> PortPrompt for LinePrompt<R, W> {
    fn choose(&mut self, direction: PortDirection, ports: &[PortInfo]) -> Result<usize> {
        writeln!(
            self.writer,
            "Multiple {} ports available, please make a choice:",
            direction
        )?;
        for port in ports {
            writeln!(self.writer, "  {}", port)?;
        }
        write!(self.writer, "-> ")?;
        self.writer.flush()?;

        let mut line = String::new();
        self.reader.read_line(&mut line)?;
        let input = line.trim();
        input.parse::<usize>().map_err(|_| Error::InvalidSelection {
            direction,
            input: input.to_string(),
        })
    }
}

/// Resolve one direction.
///
/// No ports yields `Ok(None)`; a single port is picked without asking;
/// otherwise the prompt decides. Out-of-range or non-numeric answers fail
/// with [`Error::InvalidSelection`] and are not asked again.
pub fn choose_port(
    ports: &[PortInfo],
    direction: PortDirection,
    prompt: &mut dyn PortPrompt,
) -> Result<Option<PortInfo>> {
    match ports {
        [] => {
            warn!("No MIDI {} ports available, bailing out.", direction);
            Ok(None)
        }
        [only] => {
            debug!("Auto-selected MIDI {} port {}", direction, only);
            Ok(Some(only.clone()))
        }
        _ => {
            let index = prompt.choose(direction, ports)?;
            ports
                .get(index)
                .cloned()
                .map(Some)
                .ok_or_else(|| Error::InvalidSelection {
                    direction,
                    input: index.to_string(),
                })
        }
    }
}

/// Outcome of port resolution for both directions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortSelection {
    pub input: Option<PortInfo>,
    pub output: Option<PortInfo>,
}

impl PortSelection {
    /// First direction left without a port, if any.
    pub fn missing(&self) -> Option<PortDirection> {
        if self.input.is_none() {
            Some(PortDirection::Input)
        } else if self.output.is_none() {
            Some(PortDirection::Output)
        } else {
            None
        }
    }
}

/// Resolve both directions according to the driver's port layout.
pub fn choose_ports(
    ports: &AvailablePorts,
    layout: PortLayout,
    prompt: &mut dyn PortPrompt,
) -> Result<PortSelection> {
    match layout {
        PortLayout::Directional => Ok(PortSelection {
            input: choose_port(&ports.inputs, PortDirection::Input, prompt)?,
            output: choose_port(&ports.outputs, PortDirection::Output, prompt)?,
        }),
        PortLayout::Shared => {
            let port = choose_port(&ports.inputs, PortDirection::Input, prompt)?;
            Ok(PortSelection {
                output: port.as_ref().map(|p| p.with_direction(PortDirection::Output)),
                input: port,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Prompt that must never be consulted.
    struct NoPrompt;

    impl PortPrompt for NoPrompt {
        fn choose(&mut self, direction: PortDirection, _ports: &[PortInfo]) -> Result<usize> {
            panic!("unexpected {} prompt", direction);
        }
    }

    fn ports(names: &[&str], direction: PortDirection) -> Vec<PortInfo> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| PortInfo::new(i, *n, direction))
            .collect()
    }

    fn scripted(answers: &str) -> LinePrompt<Cursor<Vec<u8>>, Vec<u8>> {
        LinePrompt::new(Cursor::new(answers.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_no_ports_yields_no_selection() {
        let chosen = choose_port(&[], PortDirection::Input, &mut NoPrompt).unwrap();
        assert!(chosen.is_none());
    }

    #[test]
    fn test_single_port_is_auto_selected() {
        let list = ports(&["Teensy MIDI"], PortDirection::Output);
        let chosen = choose_port(&list, PortDirection::Output, &mut NoPrompt).unwrap();
        assert_eq!(chosen, Some(list[0].clone()));
    }

    #[test]
    fn test_multiple_ports_use_typed_index() {
        let list = ports(&["A", "B", "C"], PortDirection::Input);
        let mut prompt = scripted("2\n");
        let chosen = choose_port(&list, PortDirection::Input, &mut prompt).unwrap();
        assert_eq!(chosen.unwrap().name, "C");

        let (_, written) = prompt.into_inner();
        let text = String::from_utf8(written).unwrap();
        assert!(text.starts_with("Multiple input ports available, please make a choice:"));
        assert!(text.contains("  [0] A\n"));
        assert!(text.contains("  [2] C\n"));
        assert!(text.ends_with("-> "));
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let list = ports(&["A", "B"], PortDirection::Input);
        let chosen = choose_port(&list, PortDirection::Input, &mut scripted("  1 \r\n")).unwrap();
        assert_eq!(chosen.unwrap().index, 1);
    }

    #[test]
    fn test_out_of_range_selection() {
        let list = ports(&["A", "B"], PortDirection::Output);
        let err = choose_port(&list, PortDirection::Output, &mut scripted("5\n")).unwrap_err();
        match err {
            Error::InvalidSelection { direction, input } => {
                assert_eq!(direction, PortDirection::Output);
                assert_eq!(input, "5");
            }
            other => panic!("Expected InvalidSelection, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_selection() {
        let list = ports(&["A", "B"], PortDirection::Input);
        let err = choose_port(&list, PortDirection::Input, &mut scripted("first\n")).unwrap_err();
        assert!(matches!(err, Error::InvalidSelection { ref input, .. } if input == "first"));
    }

    #[test]
    fn test_closed_stdin_is_invalid_selection() {
        let list = ports(&["A", "B"], PortDirection::Input);
        let err = choose_port(&list, PortDirection::Input, &mut scripted("")).unwrap_err();
        assert!(matches!(err, Error::InvalidSelection { ref input, .. } if input.is_empty()));
    }

    #[test]
    fn test_directional_layout_prompts_per_direction() {
        let available = AvailablePorts::from_names(
            vec!["In A".into(), "In B".into()],
            vec!["Out A".into(), "Out B".into()],
        );
        let mut prompt = scripted("1\n0\n");
        let selection = choose_ports(&available, PortLayout::Directional, &mut prompt).unwrap();
        assert_eq!(selection.input.unwrap().name, "In B");
        assert_eq!(selection.output.unwrap().name, "Out A");
    }

    #[test]
    fn test_shared_layout_prompts_once() {
        let available = AvailablePorts::from_names(vec!["Loop 1".into(), "Loop 2".into()], vec![]);
        let mut prompt = scripted("1\n");
        let selection = choose_ports(&available, PortLayout::Shared, &mut prompt).unwrap();
        let input = selection.input.unwrap();
        let output = selection.output.unwrap();
        assert_eq!(input.index, 1);
        assert_eq!(output.index, 1);
        assert_eq!(output.direction, PortDirection::Output);
    }

    #[test]
    fn test_missing_direction() {
        let available = AvailablePorts::from_names(vec!["In".into()], vec![]);
        let selection =
            choose_ports(&available, PortLayout::Directional, &mut NoPrompt).unwrap();
        assert_eq!(selection.missing(), Some(PortDirection::Output));

        let selection = PortSelection::default();
        assert_eq!(selection.missing(), Some(PortDirection::Input));
    }
}
