// Run boundary detection

use crate::core::constants::FormatProfile;
use crate::core::format::RunRange;
use crate::core::patterns::Patterns;
use tracing::{debug, warn};

/// Where the runs of a log sit, plus the text ahead of the first one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunLayout {
    pub header: String,
    pub ranges: Vec<RunRange>,
}

/// Lines of `text` with the byte offset each one starts at.
pub(crate) fn lines_with_offsets(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split_inclusive('\n').scan(0usize, |offset, line| {
        let start = *offset;
        *offset += line.len();
        Some((start, line))
    })
}

pub fn locate_runs(text: &str, profile: FormatProfile, patterns: &Patterns) -> RunLayout {
    let marker = patterns.start_marker(profile);
    let mut ranges: Vec<RunRange> = Vec::new();

    for (offset, line) in lines_with_offsets(text) {
        let caps = match marker.captures(line) {
            Some(c) => c,
            None => continue,
        };

        if let Some(prev) = ranges.last_mut() {
            prev.end = offset;
        }

        let colocated_data = caps
            .name("lead")
            .map(|m| !m.as_str().trim().is_empty())
            .unwrap_or(false);
        if colocated_data {
            // Kept whole as a note of the new run.
            warn!(
                "run {} header at byte {} shares its line with {:?}",
                ranges.len(),
                offset,
                caps.name("lead").map(|m| m.as_str()).unwrap_or_default()
            );
        }

        ranges.push(RunRange {
            start: offset,
            end: text.len(),
            colocated_data,
        });
    }

    let header = ranges
        .first()
        .map(|r| text[..r.start].to_string())
        .unwrap_or_default();

    debug!("{} profile: found {} runs", profile, ranges.len());

    RunLayout { header, ranges }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUTTY: &str = "\
Lab notebook
operator: ada
=~=~=~=~ PuTTY log 2021.03.04 10:11:12 =~=~=~=~
t,v
0,1
=~=~=~=~ PuTTY log 2021.03.04 11:00:00 =~=~=~=~
t,v
5,6
";

    #[test]
    fn test_ranges_contiguous_and_exhaustive() {
        let layout = locate_runs(PUTTY, FormatProfile::Putty, Patterns::global());
        assert_eq!(layout.ranges.len(), 2);
        assert_eq!(layout.header, "Lab notebook\noperator: ada\n");
        assert_eq!(layout.ranges[0].start, layout.header.len());
        for pair in layout.ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(layout.ranges.last().unwrap().end, PUTTY.len());
        assert!(PUTTY[layout.ranges[1].start..].starts_with("=~=~"));
    }

    #[test]
    fn test_no_runs() {
        let layout = locate_runs("just\nnotes\n", FormatProfile::Lvm, Patterns::global());
        assert!(layout.ranges.is_empty());
        assert_eq!(layout.header, "");
    }

    #[test]
    fn test_empty_text() {
        let layout = locate_runs("", FormatProfile::Putty, Patterns::global());
        assert_eq!(layout, RunLayout::default());
    }

    #[test]
    fn test_header_on_first_line() {
        let text = "Test_Name\tA\nx,y\n1,2\n";
        let layout = locate_runs(text, FormatProfile::Lvm, Patterns::global());
        assert_eq!(layout.header, "");
        assert_eq!(layout.ranges[0].start, 0);
        assert_eq!(layout.ranges[0].end, text.len());
    }

    #[test]
    fn test_colocated_data_flagged() {
        let text = "=~=~ log\n1,2\n3,4=~=~ log\n5,6\n";
        let layout = locate_runs(text, FormatProfile::Putty, Patterns::global());
        assert_eq!(layout.ranges.len(), 2);
        assert!(!layout.ranges[0].colocated_data);
        assert!(layout.ranges[1].colocated_data);
    }

    #[test]
    fn test_final_line_without_newline() {
        let text = "Packet_Notes\n1,2";
        let layout = locate_runs(text, FormatProfile::LvmSpl, Patterns::global());
        assert_eq!(layout.ranges[0].end, text.len());
    }
}
