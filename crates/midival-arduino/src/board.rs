use std::fmt;

use crate::error::{Error, Result};

/// A compilation target, identified by its fully qualified board name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    pub name: String,
    pub fqbn: String,
}

impl Board {
    pub fn new(name: impl Into<String>, fqbn: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fqbn: fqbn.into(),
        }
    }

    /// Look up one of the [`default_boards`] by FQBN or (case-insensitive) name.
    pub fn find(key: &str) -> Result<Self> {
        default_boards()
            .into_iter()
            .find(|b| b.fqbn == key || b.name.eq_ignore_ascii_case(key))
            .ok_or_else(|| Error::UnknownBoard(key.to_string()))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.fqbn)
    }
}

/// Boards every example must compile for, in validation order.
pub fn default_boards() -> Vec<Board> {
    vec![
        Board::new("Uno", "arduino:avr:uno"),
        Board::new("Leonardo", "arduino:avr:leonardo"),
        Board::new("Mega", "arduino:avr:mega"),
        Board::new("Due", "arduino:sam:due"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_boards() {
        let boards = default_boards();
        let names: Vec<_> = boards.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Uno", "Leonardo", "Mega", "Due"]);
        assert_eq!(boards[3].fqbn, "arduino:sam:due");
    }

    #[test]
    fn test_find() {
        assert_eq!(Board::find("mega").unwrap().fqbn, "arduino:avr:mega");
        assert_eq!(Board::find("arduino:avr:uno").unwrap().name, "Uno");
        assert!(matches!(
            Board::find("esp32"),
            Err(Error::UnknownBoard(ref key)) if key == "esp32"
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Board::new("Uno", "arduino:avr:uno").to_string(),
            "Uno (arduino:avr:uno)"
        );
    }
}
