// Markdown report assembly and chart dispatch

use crate::core::constants::DEFAULT_REPORT_NAME;
use crate::core::error::{LabnoteError, Result};
use crate::core::format::{PlotRequest, RunData};
use crate::core::reader::LogStore;
use crate::report::chart::{Chart, ChartRenderer, Series};
use crate::report::directive::extract_directives;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub output_dir: PathBuf,
    pub report_name: String,
}

impl ReportOptions {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            report_name: DEFAULT_REPORT_NAME.to_string(),
        }
    }

    pub fn document_path(&self) -> PathBuf {
        self.output_dir.join(&self.report_name)
    }
}

/// A written report document and the charts it links to, ready to render.
#[derive(Debug, Clone)]
pub struct Report {
    pub document: PathBuf,
    pub requests: Vec<PlotRequest>,
    pub charts: Vec<Chart>,
}

/// Write the header and every run's notes to the report document with
/// directives swapped for image links, then resolve each requested plot
/// against the run data. Nothing is rendered here.
pub fn assemble_report(store: &mut LogStore, options: &ReportOptions) -> Result<Report> {
    fs::create_dir_all(&options.output_dir)?;
    let document = options.document_path();
    let n_runs = store.run_count();

    let mut requests = Vec::new();
    let mut data: Vec<RunData> = Vec::with_capacity(n_runs);
    {
        let mut out = BufWriter::new(File::create(&document)?);

        let all_runs: Vec<usize> = (0..n_runs).collect();
        let header = extract_directives(store.header(), &all_runs)?;
        writeln!(out, "{}", header.text)?;
        requests.extend(header.requests);

        for index in 0..n_runs {
            let run = store.get(index)?;
            info!(
                "run {}: date {:?}, start {:?}, columns {:?}",
                index,
                run.date,
                run.start_time,
                run.data.column_names()
            );
            let notes = extract_directives(&run.notes, &[index])?;
            writeln!(out, "{}", notes.text)?;
            requests.extend(notes.requests);
            data.push(run.data);
        }

        out.flush()?;
    }
    info!("wrote {} ({} plots requested)", document.display(), requests.len());

    let charts = requests
        .iter()
        .map(|r| resolve_chart(r, &data, &options.output_dir))
        .collect::<Result<Vec<_>>>()?;

    Ok(Report {
        document,
        requests,
        charts,
    })
}

/// Scaled (x, y) series for every y variable and run a request names.
pub fn resolve_chart(request: &PlotRequest, data: &[RunData], output_dir: &Path) -> Result<Chart> {
    let mut series = Vec::new();

    for y in &request.y {
        for &run in &y.runs {
            let run_data = data.get(run).ok_or(LabnoteError::IndexOutOfRange {
                index: run,
                count: data.len(),
            })?;
            let column = |name: &str| {
                run_data.column(name).ok_or_else(|| LabnoteError::ColumnNotFound {
                    run,
                    column: name.to_string(),
                })
            };
            let xs = column(&request.x.name)?;
            let ys = column(&y.name)?;

            series.push(Series {
                label: format!("{} : Test {}", y.name, run),
                points: xs
                    .iter()
                    .zip(ys)
                    .map(|(x, v)| (x * request.x.scale, v * y.scale))
                    .collect(),
            });
        }
    }

    Ok(Chart {
        title: request.labels.title.clone(),
        x_label: request.labels.x.clone(),
        y_label: request.labels.y.clone(),
        series,
        path: output_dir.join(&request.artifact),
    })
}

pub fn render_charts(charts: &[Chart], renderer: &dyn ChartRenderer) -> Result<()> {
    for chart in charts {
        debug!("rendering {}", chart.path.display());
        renderer.render(chart)?;
    }
    Ok(())
}

/// Assemble the report, then render every chart it asks for.
pub fn generate_report(
    store: &mut LogStore,
    options: &ReportOptions,
    renderer: &dyn ChartRenderer,
) -> Result<Report> {
    let report = assemble_report(store, options)?;
    render_charts(&report.charts, renderer)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::format::{Labels, SeriesRef, VarRef};
    use std::sync::Mutex;
    use tempfile::{tempdir, NamedTempFile};

    const PUTTY: &str = "\
Pump characterisation
\\p{t, p} (time [s], pressure [kPa], all runs)
=~=~=~=~ PuTTY log 2021.03.04 10:11:12 =~=~=~=~
cold start
t,p
0,100
1,101
=~=~=~=~ PuTTY log 2021.03.04 11:00:00 =~=~=~=~
warm start
\\p{t[1000], p[0.5]}
  (time [ms], half pressure, run one)
t,p
0,200
1,
";

    /// Records each chart along with the document length at render time.
    struct RecordingRenderer {
        document: PathBuf,
        seen: Mutex<Vec<(Chart, usize)>>,
    }

    impl ChartRenderer for RecordingRenderer {
        fn render(&self, chart: &Chart) -> Result<()> {
            let len = fs::read_to_string(&self.document)?.len();
            self.seen.lock().unwrap().push((chart.clone(), len));
            Ok(())
        }
    }

    fn putty_store() -> (NamedTempFile, LogStore) {
        let mut ntf = NamedTempFile::new().unwrap();
        ntf.write_all(PUTTY.as_bytes()).unwrap();
        ntf.flush().unwrap();
        let store = LogStore::open(ntf.path(), "putty").unwrap();
        (ntf, store)
    }

    #[test]
    fn test_generate_report() {
        let (_ntf, mut store) = putty_store();
        let dir = tempdir().unwrap();
        let options = ReportOptions::new(dir.path().join("out"));
        let renderer = RecordingRenderer {
            document: options.document_path(),
            seen: Mutex::new(Vec::new()),
        };

        let report = generate_report(&mut store, &options, &renderer).unwrap();
        let text = fs::read_to_string(&report.document).unwrap();
        assert_eq!(
            text,
            "Pump characterisation\n![](all%20runs.png)\n\n\
=~=~=~=~ PuTTY log 2021.03.04 10:11:12 =~=~=~=~\ncold start\nt,p\n\n\
=~=~=~=~ PuTTY log 2021.03.04 11:00:00 =~=~=~=~\nwarm start\n![](run%20one.png)\nt,p\n\n"
        );

        let seen = renderer.seen.into_inner().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|(_, len)| *len == text.len()));

        let (all, _) = &seen[0];
        assert_eq!(all.path, dir.path().join("out").join("all runs.png"));
        let labels: Vec<&str> = all.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["p : Test 0", "p : Test 1"]);
        assert_eq!(all.series[0].points, vec![(0.0, 100.0), (1.0, 101.0)]);

        let (one, _) = &seen[1];
        assert_eq!(one.title, "run one");
        assert_eq!(one.series.len(), 1);
        assert_eq!(one.series[0].label, "p : Test 1");
        assert_eq!(one.series[0].points[0], (0.0, 100.0));
        assert_eq!(one.series[0].points[1].0, 1000.0);
        assert!(one.series[0].points[1].1.is_nan());
    }

    #[test]
    fn test_report_truncates_existing_document() {
        let (_ntf, mut store) = putty_store();
        let dir = tempdir().unwrap();
        let options = ReportOptions {
            output_dir: dir.path().to_path_buf(),
            report_name: "notes.md".to_string(),
        };
        fs::write(options.document_path(), "x".repeat(10_000)).unwrap();

        let report = assemble_report(&mut store, &options).unwrap();
        let text = fs::read_to_string(&report.document).unwrap();
        assert!(text.starts_with("Pump characterisation\n"));
        assert!(text.len() < 10_000);
        assert_eq!(report.requests.len(), 2);
        assert_eq!(report.requests[0].y[0].runs, vec![0, 1]);
        assert_eq!(report.requests[1].y[0].runs, vec![1]);
    }

    #[test]
    fn test_empty_log_report() {
        let ntf = NamedTempFile::new().unwrap();
        let mut store = LogStore::open(ntf.path(), "lvm").unwrap();
        let dir = tempdir().unwrap();
        let report = assemble_report(&mut store, &ReportOptions::new(dir.path())).unwrap();
        assert!(report.charts.is_empty());
        assert_eq!(fs::read_to_string(&report.document).unwrap(), "\n");
    }

    fn request(x: &str, y: &str, runs: Vec<usize>) -> PlotRequest {
        PlotRequest {
            labels: Labels {
                x: "x".into(),
                y: "y".into(),
                title: "t".into(),
            },
            x: VarRef {
                name: x.into(),
                scale: 1.0,
            },
            y: vec![SeriesRef {
                name: y.into(),
                scale: 1.0,
                runs,
            }],
            artifact: "t.png".into(),
        }
    }

    #[test]
    fn test_resolve_missing_column() {
        let (_ntf, mut store) = putty_store();
        let data = vec![store.get(0).unwrap().data];
        let err = resolve_chart(&request("t", "q", vec![0]), &data, Path::new(".")).unwrap_err();
        assert!(matches!(err, LabnoteError::ColumnNotFound { run: 0, ref column } if column == "q"));
    }

    #[test]
    fn test_resolve_missing_run() {
        let err = resolve_chart(&request("t", "p", vec![4]), &[], Path::new(".")).unwrap_err();
        assert!(matches!(err, LabnoteError::IndexOutOfRange { index: 4, count: 0 }));
    }
}
