// Chart model and the PNG backend

use crate::core::constants::{DEFAULT_CHART_HEIGHT, DEFAULT_CHART_WIDTH, DEFAULT_MARKER_SIZE};
use crate::core::error::{LabnoteError, Result};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters_backend::DrawingBackend;
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    /// NaN in either coordinate leaves a gap.
    pub points: Vec<(f64, f64)>,
}

/// Everything a renderer needs for one artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    pub path: PathBuf,
}

/// Backend turning a [`Chart`] into an image at `chart.path`.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, chart: &Chart) -> Result<()>;
}

const MARGIN: u32 = 20;
const CAPTION_SIZE: u32 = 24;
const LABEL_AREA: u32 = 50;
const PALETTE: [RGBColor; 8] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
];

/// Titled line chart with axis descriptions, point markers and a legend.
///
/// Text goes through the system fonts. When no usable font is found the
/// chart is saved again without any text rather than failing the report.
#[derive(Debug, Clone)]
pub struct PngChartRenderer {
    width: u32,
    height: u32,
    marker_size: u32,
}

impl Default for PngChartRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_CHART_WIDTH, DEFAULT_CHART_HEIGHT)
    }
}

impl PngChartRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            marker_size: DEFAULT_MARKER_SIZE,
        }
    }

    pub fn with_marker_size(mut self, marker_size: u32) -> Self {
        self.marker_size = marker_size;
        self
    }

    fn check_canvas(&self) -> Result<()> {
        if self.width <= 2 * (MARGIN + LABEL_AREA) || self.height <= 2 * (MARGIN + LABEL_AREA) {
            return Err(LabnoteError::Render(format!(
                "canvas {}x{} too small",
                self.width, self.height
            )));
        }
        Ok(())
    }

    fn draw_file(&self, chart: &Chart, labelled: bool) -> Result<()> {
        let root = BitMapBackend::new(&chart.path, (self.width, self.height)).into_drawing_area();
        self.plot(&root, chart, labelled)
            .map_err(|e| LabnoteError::Render(e.to_string()))
    }

    /// Draw `chart` onto `root`. With `labelled` off no text is drawn at all:
    /// no caption, tick labels, axis descriptions or legend.
    fn plot<DB>(
        &self,
        root: &DrawingArea<DB, Shift>,
        chart: &Chart,
        labelled: bool,
    ) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;

        let b = data_bounds(chart);
        let mut builder = ChartBuilder::on(root);
        builder.margin(MARGIN);
        if labelled {
            builder
                .caption(&chart.title, ("sans-serif", CAPTION_SIZE))
                .x_label_area_size(LABEL_AREA)
                .y_label_area_size(LABEL_AREA);
        }
        let mut cc = builder.build_cartesian_2d(b.x_min..b.x_max, b.y_min..b.y_max)?;

        {
            let mut mesh = cc.configure_mesh();
            if labelled {
                mesh.x_desc(chart.x_label.as_str())
                    .y_desc(chart.y_label.as_str());
            } else {
                mesh.x_labels(0).y_labels(0);
            }
            mesh.draw()?;
        }

        let mut legend = false;
        for (i, series) in chart.series.iter().enumerate() {
            let color = PALETTE[i % PALETTE.len()];
            let mut first = true;
            for segment in segments(&series.points) {
                let anno = cc.draw_series(LineSeries::new(segment.iter().copied(), &color))?;
                if labelled && first {
                    anno.label(series.label.as_str())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], color));
                    legend = true;
                }
                first = false;

                cc.draw_series(
                    segment
                        .iter()
                        .map(|&p| Circle::new(p, self.marker_size, color.filled())),
                )?;
            }
        }

        if legend {
            cc.configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }

        root.present()?;
        Ok(())
    }
}

impl ChartRenderer for PngChartRenderer {
    fn render(&self, chart: &Chart) -> Result<()> {
        self.check_canvas()?;

        // font lookup may panic on hosts without any fonts
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| self.draw_file(chart, true)))
            .unwrap_or_else(|_| Err(LabnoteError::Render("text rendering panicked".to_string())));
        if let Err(e) = attempt {
            warn!("{}: {}, saving without text", chart.path.display(), e);
            self.draw_file(chart, false)?;
        }

        debug!(
            "saved {} ({} series, x: {:?}, y: {:?})",
            chart.path.display(),
            chart.series.len(),
            chart.x_label,
            chart.y_label
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

/// Finite data extent, widened so neither axis collapses to a point.
fn data_bounds(chart: &Chart) -> Bounds {
    let mut b = Bounds {
        x_min: f64::INFINITY,
        x_max: f64::NEG_INFINITY,
        y_min: f64::INFINITY,
        y_max: f64::NEG_INFINITY,
    };
    for &(x, y) in chart.series.iter().flat_map(|s| s.points.iter()) {
        if x.is_finite() && y.is_finite() {
            b.x_min = b.x_min.min(x);
            b.x_max = b.x_max.max(x);
            b.y_min = b.y_min.min(y);
            b.y_max = b.y_max.max(y);
        }
    }
    if !b.x_min.is_finite() {
        return Bounds {
            x_min: 0.0,
            x_max: 1.0,
            y_min: 0.0,
            y_max: 1.0,
        };
    }
    let (x_min, x_max) = widen(b.x_min, b.x_max);
    let (y_min, y_max) = widen(b.y_min, b.y_max);
    Bounds {
        x_min,
        x_max,
        y_min,
        y_max,
    }
}

fn widen(min: f64, max: f64) -> (f64, f64) {
    if max > min {
        (min, max)
    } else {
        let pad = if min == 0.0 { 0.5 } else { min.abs() * 0.05 };
        (min - pad, max + pad)
    }
}

/// Runs of consecutive finite points. A non-finite coordinate ends a run.
fn segments(points: &[(f64, f64)]) -> Vec<&[(f64, f64)]> {
    points
        .split(|(x, y)| !x.is_finite() || !y.is_finite())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;
    use tempfile::tempdir;

    fn chart(points: Vec<(f64, f64)>) -> Chart {
        Chart {
            title: "demo".into(),
            x_label: "t".into(),
            y_label: "v".into(),
            series: vec![Series {
                label: "v : Test 0".into(),
                points,
            }],
            path: PathBuf::from("demo.png"),
        }
    }

    #[test]
    fn test_bounds_skip_nan() {
        let b = data_bounds(&chart(vec![(0.0, 1.0), (f64::NAN, 9.0), (2.0, 3.0)]));
        assert_eq!(b, Bounds { x_min: 0.0, x_max: 2.0, y_min: 1.0, y_max: 3.0 });
    }

    #[test]
    fn test_bounds_degenerate() {
        let b = data_bounds(&chart(vec![(1.0, 0.0)]));
        assert!(b.x_min < 1.0 && b.x_max > 1.0);
        assert!(b.y_min < 0.0 && b.y_max > 0.0);

        let b = data_bounds(&chart(vec![]));
        assert_eq!(b.x_max, 1.0);
    }

    #[test]
    fn test_segments_break_at_nan() {
        let points = [
            (0.0, 1.0),
            (1.0, 2.0),
            (2.0, f64::NAN),
            (f64::NAN, 0.0),
            (4.0, 5.0),
            (5.0, f64::INFINITY),
        ];
        let parts = segments(&points);
        assert_eq!(parts, vec![&points[0..2], &points[4..5]]);

        assert!(segments(&[(f64::NAN, f64::NAN)]).is_empty());
        assert!(segments(&[]).is_empty());
    }

    #[test]
    fn test_plot_draws_series_color() {
        let (w, h) = (320, 240);
        let mut buf = vec![0u8; (w * h * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
            PngChartRenderer::new(w, h)
                .plot(&root, &chart(vec![(0.0, 0.0), (1.0, 1.0), (2.0, 0.5)]), false)
                .unwrap();
        }
        let RGBColor(r, g, b) = PALETTE[0];
        assert!(buf.chunks(3).any(|px| px == [r, g, b]));
        assert!(buf.chunks(3).any(|px| px == [255, 255, 255]));
    }

    #[test]
    fn test_canvas_too_small() {
        let err = PngChartRenderer::new(50, 50).render(&chart(vec![])).unwrap_err();
        assert!(matches!(err, LabnoteError::Render(_)));
    }

    #[test]
    fn test_render_writes_png() {
        let dir = tempdir().unwrap();
        let mut c = chart(vec![(0.0, 1.0), (1.0, f64::NAN), (2.0, 0.5)]);
        c.series.push(Series {
            label: "v : Test 1".into(),
            points: vec![(0.0, 0.2), (2.0, 0.8)],
        });
        c.path = dir.path().join("demo plot.png");
        PngChartRenderer::default().render(&c).unwrap();

        let img = image::open(&c.path).unwrap();
        assert_eq!(img.dimensions(), (DEFAULT_CHART_WIDTH, DEFAULT_CHART_HEIGHT));
    }

    #[test]
    fn test_render_empty_chart() {
        let dir = tempdir().unwrap();
        let mut c = chart(vec![(f64::NAN, f64::NAN)]);
        c.path = dir.path().join("empty.png");
        PngChartRenderer::new(400, 300).render(&c).unwrap();
        assert!(c.path.exists());
    }
}
