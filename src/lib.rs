// Lab log parser and report generator
// Main library entry point

pub mod core;
pub mod report;

// Re-export main types
pub use crate::core::constants::{
    FormatProfile, DEFAULT_CHART_HEIGHT, DEFAULT_CHART_WIDTH, DEFAULT_DELIMITER, DEFAULT_ENCODING,
    DEFAULT_MARKER_SIZE, DEFAULT_REPORT_NAME,
};
pub use crate::core::error::{LabnoteError, Result};
pub use crate::core::format::{Column, Labels, PlotRequest, RunData, RunRange, RunRecord, SeriesRef, VarRef};
pub use crate::core::reader::{LogFile, LogStore};
pub use crate::report::assembler::{assemble_report, generate_report, render_charts, resolve_chart, Report, ReportOptions};
pub use crate::report::chart::{Chart, ChartRenderer, PngChartRenderer, Series};
pub use crate::report::directive::{extract_directives, Extraction};

#[cfg(test)]
mod tests {
    #[test]
    fn test_defaults() {
        use crate::core::constants::*;
        assert_eq!(DEFAULT_DELIMITER, ',');
        assert_eq!(DEFAULT_REPORT_NAME, "report.md");
        assert_eq!(ARTIFACT_EXTENSION, "png");
    }
}
