//! Locations inside a schema.

use std::fmt;
use std::path::PathBuf;

/// Where a schema element lives: its file and, when known, the record and
/// member that own it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaLocation {
    pub file: PathBuf,
    pub record: Option<String>,
    pub member: Option<String>,
}

impl SchemaLocation {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            record: None,
            member: None,
        }
    }

    pub fn record(mut self, record: impl Into<String>) -> Self {
        self.record = Some(record.into());
        self
    }

    pub fn member(mut self, member: impl Into<String>) -> Self {
        self.member = Some(member.into());
        self
    }
}

impl fmt::Display for SchemaLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file.display())?;
        match (&self.record, &self.member) {
            (Some(record), Some(member)) => write!(f, " ({}.{})", record, member),
            (Some(record), None) => write!(f, " ({})", record),
            _ => Ok(()),
        }
    }
}

/// Converts the 1-based line/column serde_json reports into a byte offset.
pub fn json_error_offset(source: &str, line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(source.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let loc = SchemaLocation::new("a.json").record("Player").member("hp");
        assert_eq!(loc.to_string(), "a.json (Player.hp)");
        assert_eq!(SchemaLocation::new("a.json").to_string(), "a.json");
    }

    #[test]
    fn test_json_offset() {
        let source = "{\n  \"records\": x\n}";
        assert_eq!(json_error_offset(source, 1, 1), 0);
        assert_eq!(json_error_offset(source, 2, 3), 4);
        assert_eq!(json_error_offset(source, 0, 0), 0);
    }
}
