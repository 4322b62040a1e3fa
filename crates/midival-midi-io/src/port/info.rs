use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDirection {
    Input,
    Output,
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortDirection::Input => f.write_str("input"),
            PortDirection::Output => f.write_str("output"),
        }
    }
}

/// How a driver exposes its ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PortLayout {
    /// Separate input and output port lists.
    #[default]
    Directional,
    /// One list of bidirectional ports; the same index opens both directions.
    Shared,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    pub index: usize,
    pub name: String,
    pub direction: PortDirection,
}

impl PortInfo {
    pub fn new(index: usize, name: impl Into<String>, direction: PortDirection) -> Self {
        Self {
            index,
            name: name.into(),
            direction,
        }
    }

    /// Same device seen from the other direction (shared layouts).
    pub fn with_direction(&self, direction: PortDirection) -> Self {
        Self {
            direction,
            ..self.clone()
        }
    }
}

impl fmt::Display for PortInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.index, self.name)
    }
}

/// Snapshot of one enumeration pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailablePorts {
    pub inputs: Vec<PortInfo>,
    pub outputs: Vec<PortInfo>,
}

impl AvailablePorts {
    pub fn from_names(inputs: Vec<String>, outputs: Vec<String>) -> Self {
        Self {
            inputs: Self::indexed(inputs, PortDirection::Input),
            outputs: Self::indexed(outputs, PortDirection::Output),
        }
    }

    fn indexed(names: Vec<String>, direction: PortDirection) -> Vec<PortInfo> {
        names
            .into_iter()
            .enumerate()
            .map(|(index, name)| PortInfo::new(index, name, direction))
            .collect()
    }

    pub fn list(&self, direction: PortDirection) -> &[PortInfo] {
        match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        }
    }
}
