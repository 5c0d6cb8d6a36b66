use serde::{Deserialize, Serialize};
use std::fmt;

/// How a strategy consumes the data file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadMethod {
    EntireFile,
    LineByLine,
}

impl ReadMethod {
    /// Value stored in the `method` column of the results log.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadMethod::EntireFile => "entire_file",
            ReadMethod::LineByLine => "line_by_line",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReadMethod::EntireFile => "Entire file",
            ReadMethod::LineByLine => "Line by line",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "entire_file" => Some(ReadMethod::EntireFile),
            "line_by_line" => Some(ReadMethod::LineByLine),
            _ => None,
        }
    }

    pub fn all() -> &'static [ReadMethod] {
        &[ReadMethod::EntireFile, ReadMethod::LineByLine]
    }
}

impl fmt::Display for ReadMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
