use labnote::{DEFAULT_CHART_HEIGHT, DEFAULT_CHART_WIDTH, DEFAULT_DELIMITER, DEFAULT_ENCODING, DEFAULT_MARKER_SIZE, DEFAULT_REPORT_NAME};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub input: PathBuf,
    pub format: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_report_name")]
    pub report_name: String,
    #[serde(default)]
    pub chart: ChartConfig,
    #[serde(default)]
    pub dump_json: Option<PathBuf>,
}

impl ReportConfig {
    pub fn new(input: PathBuf, format: String) -> Self {
        Self {
            input,
            format,
            encoding: default_encoding(),
            delimiter: default_delimiter(),
            output_dir: default_output_dir(),
            report_name: default_report_name(),
            chart: ChartConfig::default(),
            dump_json: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub marker_size: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CHART_WIDTH,
            height: DEFAULT_CHART_HEIGHT,
            marker_size: DEFAULT_MARKER_SIZE,
        }
    }
}

fn default_encoding() -> String {
    DEFAULT_ENCODING.to_string()
}

fn default_delimiter() -> char {
    DEFAULT_DELIMITER
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("report")
}

fn default_report_name() -> String {
    DEFAULT_REPORT_NAME.to_string()
}
