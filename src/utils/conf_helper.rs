use anyhow::{anyhow, Context, Result};
use std::sync::OnceLock;
use tokio::fs;
use tracing::info;

use crate::models::report_config::ReportConfig;
use crate::Cli;

static CONFIG_CACHE: OnceLock<ReportConfig> = OnceLock::new();

/// Load the JSON config named by `--config` (if any), lay the command line
/// over it, and cache the result for the rest of the process.
pub async fn init_config(cli: &Cli) -> Result<&'static ReportConfig> {
    let mut config = match &cli.config {
        Some(file_path) => {
            let data = fs::read_to_string(file_path)
                .await
                .with_context(|| format!("File read Error: {}", file_path.display()))?;
            serde_json::from_str::<ReportConfig>(&data)
                .with_context(|| format!("JSON Parse Error: {}", file_path.display()))?
        }
        None => ReportConfig::new(
            cli.input.clone().context("INPUT is required without --config")?,
            cli.format.clone().context("--format is required without --config")?,
        ),
    };

    apply_overrides(&mut config, cli);

    CONFIG_CACHE
        .set(config)
        .map_err(|_| anyhow!("Config already initialized"))?;

    let config = get_cached_config();
    info!(
        "Config initialized: {} ({} format) -> {}",
        config.input.display(),
        config.format,
        config.output_dir.join(&config.report_name).display()
    );
    Ok(config)
}

fn apply_overrides(config: &mut ReportConfig, cli: &Cli) {
    if let Some(input) = &cli.input {
        config.input = input.clone();
    }
    if let Some(format) = &cli.format {
        config.format = format.clone();
    }
    if let Some(encoding) = &cli.encoding {
        config.encoding = encoding.clone();
    }
    if let Some(delimiter) = cli.delimiter {
        config.delimiter = delimiter;
    }
    if let Some(output) = &cli.output {
        config.output_dir = output.clone();
    }
    if let Some(name) = &cli.report_name {
        config.report_name = name.clone();
    }
    if let Some(path) = &cli.dump_json {
        config.dump_json = Some(path.clone());
    }
}

pub fn get_cached_config() -> &'static ReportConfig {
    CONFIG_CACHE.get().expect("Config not initialized")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_cli_overrides_file_values() {
        let mut config = ReportConfig::new(PathBuf::from("a.log"), "lvm".to_string());
        let cli = Cli::parse_from([
            "labnote",
            "--format",
            "putty",
            "--delimiter",
            ";",
            "--output",
            "out",
            "b.log",
        ]);
        apply_overrides(&mut config, &cli);
        assert_eq!(config.input, PathBuf::from("b.log"));
        assert_eq!(config.format, "putty");
        assert_eq!(config.delimiter, ';');
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.encoding, "utf-8");
    }
}
