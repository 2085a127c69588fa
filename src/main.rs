use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, Level};

use labnote::{assemble_report, Chart, ChartRenderer, LogFile, LogStore, PngChartRenderer, Report, ReportOptions};

mod models;
mod utils;

use crate::models::report_config::ReportConfig;
use crate::utils::conf_helper::init_config;

/// Split a lab-instrument log into runs and write a markdown report, with
/// every `\p{...}(...)` plot directive in the notes rendered to a PNG.
#[derive(Parser, Debug)]
#[clap(name = "labnote", version, about, verbatim_doc_comment)]
pub struct Cli {
    /// Log file to read. May be .gz, .zst or .lz4 compressed.
    pub input: Option<PathBuf>,

    /// Header style: lvm, lvmspl, putty or nivb.
    #[clap(short, long)]
    pub format: Option<String>,

    /// Text encoding label of the log, e.g. utf-8, latin1, utf-16le.
    #[clap(short, long)]
    pub encoding: Option<String>,

    /// Column delimiter. "tab" or "\t" for a tab.
    #[clap(short, long, value_parser = parse_delimiter)]
    pub delimiter: Option<char>,

    /// Directory for the report and its plots. Created if missing.
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    /// File name of the report document inside the output directory.
    #[clap(long)]
    pub report_name: Option<String>,

    /// JSON config file. Command line values take precedence.
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// Also write every parsed run to this file as JSON.
    #[clap(long)]
    pub dump_json: Option<PathBuf>,

    /// Debug logging.
    #[clap(short, long)]
    pub verbose: bool,
}

fn parse_delimiter(s: &str) -> std::result::Result<char, String> {
    match s {
        "tab" | "\\t" => Ok('\t'),
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(format!("delimiter must be a single character, got {:?}", s)),
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let config = init_config(&cli).await?;

    // Parsing and text assembly are sequential and blocking.
    let report = tokio::task::spawn_blocking(move || prepare_report(config))
        .await
        .context("report task panicked")??;

    let renderer = Arc::new(
        PngChartRenderer::new(config.chart.width, config.chart.height)
            .with_marker_size(config.chart.marker_size),
    );
    let rendered = render_concurrently(report.charts, renderer).await?;

    info!(
        "Report written to {} with {} plots",
        report.document.display(),
        rendered
    );
    Ok(())
}

fn prepare_report(config: &ReportConfig) -> Result<Report> {
    let file = LogFile::new(&config.input, &config.format)?.with_encoding(&config.encoding)?;
    let mut store = LogStore::from_file(file, config.delimiter)
        .with_context(|| format!("reading {}", config.input.display()))?;

    if let Some(path) = &config.dump_json {
        dump_runs(&mut store, path)?;
    }

    let options = ReportOptions {
        output_dir: config.output_dir.clone(),
        report_name: config.report_name.clone(),
    };
    Ok(assemble_report(&mut store, &options)?)
}

fn dump_runs(store: &mut LogStore, path: &Path) -> Result<()> {
    let runs = (0..store.run_count())
        .map(|i| store.get(i))
        .collect::<labnote::Result<Vec<_>>>()?;
    let out = BufWriter::new(
        File::create(path).with_context(|| format!("creating {}", path.display()))?,
    );
    serde_json::to_writer_pretty(out, &runs)?;
    info!("Dumped {} runs to {}", runs.len(), path.display());
    Ok(())
}

/// Every chart is independent once resolved, so each gets its own blocking task.
async fn render_concurrently(charts: Vec<Chart>, renderer: Arc<PngChartRenderer>) -> Result<usize> {
    let mut tasks = JoinSet::new();
    for chart in charts {
        let renderer = Arc::clone(&renderer);
        tasks.spawn_blocking(move || renderer.render(&chart).map(|_| chart.path));
    }

    let mut rendered = 0;
    while let Some(joined) = tasks.join_next().await {
        let path = joined.context("render task panicked")??;
        info!("Saved {}", path.display());
        rendered += 1;
    }
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(",", Ok(','))]
    #[test_case("tab", Ok('\t'))]
    #[test_case("\\t", Ok('\t'))]
    #[test_case("\t", Ok('\t'))]
    #[test_case(";", Ok(';'))]
    fn test_parse_delimiter(input: &str, expect: std::result::Result<char, String>) {
        assert_eq!(parse_delimiter(input), expect);
    }

    #[test]
    fn test_parse_delimiter_rejects_words() {
        assert!(parse_delimiter("comma").is_err());
        assert!(parse_delimiter("").is_err());
    }

    #[test]
    fn test_cli_requires_nothing_with_config() {
        let cli = Cli::parse_from(["labnote", "--config", "labnote.json", "-v"]);
        assert!(cli.input.is_none());
        assert!(cli.verbose);
    }
}
