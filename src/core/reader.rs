// Log file access and the per-run record cache

use crate::core::compression::{decompress, CompressionType};
use crate::core::constants::{FormatProfile, DEFAULT_DELIMITER};
use crate::core::error::{LabnoteError, Result};
use crate::core::format::{RunRange, RunRecord};
use crate::core::locator::locate_runs;
use crate::core::parser::parse_run;
use crate::core::patterns::{CellPatterns, Patterns};
use encoding_rs::{Encoding, UTF_8};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A log on disk: where it is, how its bytes decode, and which instrument
/// wrote it.
#[derive(Debug, Clone)]
pub struct LogFile {
    path: PathBuf,
    encoding: &'static Encoding,
    profile: FormatProfile,
}

impl LogFile {
    pub fn new<P: AsRef<Path>>(path: P, format: &str) -> Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            encoding: UTF_8,
            profile: FormatProfile::from_name(format)?,
        })
    }

    /// `label` is any WHATWG encoding label, e.g. `latin1` or `utf-16le`.
    pub fn with_encoding(mut self, label: &str) -> Result<Self> {
        self.encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| LabnoteError::UnsupportedEncoding(label.to_string()))?;
        Ok(self)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn profile(&self) -> FormatProfile {
        self.profile
    }

    pub fn encoding(&self) -> &'static str {
        self.encoding.name()
    }

    /// Read, decompress and decode the whole file. The handle is dropped
    /// before returning.
    pub fn read_text(&self) -> Result<String> {
        let mut raw = Vec::new();
        File::open(&self.path)?.read_to_end(&mut raw)?;

        let bytes = decompress(raw, CompressionType::from_path(&self.path))?;
        let (text, _, had_errors) = self.encoding.decode(&bytes);
        if had_errors {
            warn!(
                "{}: malformed {} sequences replaced",
                self.path.display(),
                self.encoding.name()
            );
        }
        Ok(text.into_owned())
    }
}

#[derive(Debug, Clone)]
enum RunSlot {
    Unparsed,
    Parsed(RunRecord),
}

/// Run boundaries of one log plus lazily parsed run records.
///
/// The file is read and decoded once, in [`LogStore::from_file`]. Run offsets
/// always index that decoded text, so later edits to the file on disk are not
/// seen.
pub struct LogStore {
    file: LogFile,
    cells: CellPatterns,
    text: String,
    header: String,
    ranges: Vec<RunRange>,
    slots: Vec<RunSlot>,
}

impl LogStore {
    pub fn open<P: AsRef<Path>>(path: P, format: &str) -> Result<Self> {
        Self::from_file(LogFile::new(path, format)?, DEFAULT_DELIMITER)
    }

    /// Locate every run in `file`. Runs are parsed on first `get`.
    pub fn from_file(file: LogFile, delimiter: char) -> Result<Self> {
        let cells = CellPatterns::new(delimiter)?;
        let text = file.read_text()?;
        let layout = locate_runs(&text, file.profile(), Patterns::global());

        info!(
            "{}: {} runs ({} format, {})",
            file.path().display(),
            layout.ranges.len(),
            file.profile(),
            file.encoding()
        );

        Ok(Self {
            slots: vec![RunSlot::Unparsed; layout.ranges.len()],
            header: layout.header,
            ranges: layout.ranges,
            text,
            cells,
            file,
        })
    }

    pub fn run_count(&self) -> usize {
        self.ranges.len()
    }

    /// Text ahead of the first run.
    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn ranges(&self) -> &[RunRange] {
        &self.ranges
    }

    pub fn file(&self) -> &LogFile {
        &self.file
    }

    pub fn delimiter(&self) -> char {
        self.cells.delimiter
    }

    /// A copy of run `index`, parsing it if this is the first request.
    pub fn get(&mut self, index: usize) -> Result<RunRecord> {
        let count = self.run_count();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(LabnoteError::IndexOutOfRange { index, count })?;

        if let RunSlot::Parsed(record) = slot {
            return Ok(record.clone());
        }

        let range = self.ranges[index];
        let record = parse_run(&self.text, range.start, range.end, &self.cells, Patterns::global());
        debug!(
            "run {}: {} notes bytes, {} data rows",
            index,
            record.notes.len(),
            record.data.rows()
        );

        *slot = RunSlot::Parsed(record.clone());
        Ok(record)
    }

    /// Parse an arbitrary byte range without touching the cache. `stop` of
    /// `None` reads to end-of-file.
    pub fn read_range(&self, start: usize, stop: Option<usize>) -> Result<RunRecord> {
        let len = self.text.len();
        if start > len || !self.text.is_char_boundary(start) {
            return Err(LabnoteError::InvalidRange { start, len });
        }
        let stop = stop.unwrap_or(len);
        Ok(parse_run(&self.text, start, stop, &self.cells, Patterns::global()))
    }
}
