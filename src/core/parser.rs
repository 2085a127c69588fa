// Per-run note/data classification and column extraction

use crate::core::format::{Column, RunRecord};
use crate::core::locator::lines_with_offsets;
use crate::core::patterns::{CellPatterns, Patterns};
use tracing::debug;

/// Parse the lines of `text` starting at byte `start` until the line that
/// reaches `stop` has been consumed, or the text runs out.
///
/// Every line is a note unless, once numeric cells and delimiters are
/// stripped, nothing but whitespace is left. The line before the first data
/// line names the columns; anything past the named columns lands in
/// `unnamed`, one entry per data line.
///
/// `start` must sit on a character boundary.
pub fn parse_run(
    text: &str,
    start: usize,
    stop: usize,
    cells: &CellPatterns,
    patterns: &Patterns,
) -> RunRecord {
    let mut record = RunRecord::default();
    let mut last_line = String::new();
    let mut named: Option<usize> = None;

    for (offset, line) in lines_with_offsets(&text[start..]) {
        let line_end = start + offset + line.len();
        // one terminator, so a final unterminated cell still matches
        let normalized = format!("{}\n", line.trim_end_matches(['\r', '\n']));

        if is_data_line(&normalized, cells) {
            let values: Vec<f64> = cells
                .cell
                .captures_iter(&normalized)
                .map(|c| to_sample(c.get(1).map(|m| m.as_str()).unwrap_or_default()))
                .collect();

            let n_named = *named.get_or_insert_with(|| {
                record.data.named = cells
                    .name
                    .captures_iter(&last_line)
                    .filter_map(|c| c.get(1))
                    .map(|m| Column::new(m.as_str().to_string()))
                    .collect();
                debug!("columns: {:?}", record.data.column_names());
                record.data.named.len()
            });

            for (i, column) in record.data.named.iter_mut().enumerate() {
                column.values.push(values.get(i).copied().unwrap_or(f64::NAN));
            }
            record
                .data
                .unnamed
                .push(values.get(n_named..).map(<[f64]>::to_vec).unwrap_or_default());
        } else {
            record.notes.push_str(line);
            if record.date.is_empty() {
                if let Some(m) = patterns.date.find(line) {
                    record.date = m.as_str().to_string();
                }
            }
            if record.start_time.is_empty() {
                if let Some(m) = patterns.time.find(line) {
                    record.start_time = m.as_str().to_string();
                }
            }
        }

        last_line = normalized;
        if line_end >= stop {
            break;
        }
    }

    record
}

fn is_data_line(normalized: &str, cells: &CellPatterns) -> bool {
    if normalized.trim().is_empty() {
        return false;
    }
    cells
        .cell
        .replace_all(normalized, "")
        .replace(cells.delimiter, "")
        .trim()
        .is_empty()
}

fn to_sample(cell: &str) -> f64 {
    if cell.is_empty() {
        return f64::NAN;
    }
    cell.parse::<f64>().unwrap_or_else(|_| {
        debug!("non-numeric cell {:?} read as NaN", cell);
        f64::NAN
    })
}
