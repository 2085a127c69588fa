// Compiled pattern tables shared by the locator and the run parser

use crate::core::constants::FormatProfile;
use crate::core::error::{LabnoteError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

/// Delimiter-independent patterns, built once per process.
pub struct Patterns {
    starts: HashMap<FormatProfile, Regex>,
    pub date: Regex,
    pub time: Regex,
}

impl Patterns {
    pub fn global() -> &'static Patterns {
        PATTERNS.get_or_init(|| {
            let starts = FormatProfile::ALL
                .iter()
                .map(|p| {
                    let re = Regex::new(p.start_pattern()).expect("built-in start pattern");
                    (*p, re)
                })
                .collect();
            Patterns {
                starts,
                // YYYY/MM/DD or YYYY.MM.DD
                date: Regex::new(r"\d{4}[/.]\d{2}[/.]\d{2}").expect("built-in date pattern"),
                // HH:MM:SS
                time: Regex::new(r"\d\d:\d\d:\d\d").expect("built-in time pattern"),
            }
        })
    }

    pub fn start_marker(&self, profile: FormatProfile) -> &Regex {
        &self.starts[&profile]
    }
}

/// Patterns that depend on the column delimiter.
#[derive(Debug, Clone)]
pub struct CellPatterns {
    pub delimiter: char,
    /// A numeric-looking cell (possibly empty) running into the delimiter or
    /// a line terminator.
    pub cell: Regex,
    /// A column label running into the delimiter, `[`, `(`, or a terminator.
    pub name: Regex,
}

impl CellPatterns {
    pub fn new(delimiter: char) -> Result<Self> {
        let d = regex::escape(&delimiter.to_string());
        let cell = Regex::new(&format!(r"([-\d.+Ee]*)[{d}\r\n]"))
            .map_err(|e| LabnoteError::Config(format!("delimiter {delimiter:?}: {e}")))?;
        let name = Regex::new(&format!(r"(\w+)\s*[{d}\[(\r\n]"))
            .map_err(|e| LabnoteError::Config(format!("delimiter {delimiter:?}: {e}")))?;
        Ok(Self { delimiter, cell, name })
    }
}
