use crate::data::LoginProfit;
use plotters::{
    prelude::*,
    style::{register_font, FontStyle},
};
use rust_decimal::prelude::ToPrimitive;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const FONT_FAMILY: &str = "sans-serif";

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Equal-width bins over the range of the data. `counts[i]` covers
/// `[lo + i * width, lo + (i + 1) * width)`, the last bin also takes `hi`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Histogram {
    pub lo: f64,
    pub hi: f64,
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Bins the finite values in `values`. A constant series gets a unit-wide range
    /// around its value, and no values at all give `[0, 1]` with zero counts.
    pub fn new(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let finite = || values.iter().copied().filter(|v| v.is_finite());
        let (lo, hi) = finite().fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .map_or((0.0, 1.0), |(lo, hi)| {
            if lo == hi {
                (lo - 0.5, hi + 0.5)
            } else {
                (lo, hi)
            }
        });
        let width = (hi - lo) / bins as f64;
        let mut counts = vec![0; bins];
        for v in finite() {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Self { lo, hi, counts }
    }

    /// `(start, end, count)` for each bin.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, u64)> + '_ {
        let width = (self.hi - self.lo) / self.counts.len() as f64;
        self.counts.iter().enumerate().map(move |(i, count)| {
            let start = self.lo + i as f64 * width;
            (start, start + width, *count)
        })
    }
}

/// Visual treatment of a ranking chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tone {
    Positive,
    Negative,
}

impl Tone {
    fn color(self) -> RGBColor {
        match self {
            Tone::Positive => GREEN,
            Tone::Negative => RED,
        }
    }
}

/// Registers a font for chart text. Tries `preferred` first, then a handful of usual
/// system locations. Returns `false` when none could be loaded, in which case charts
/// must be drawn without any text.
pub(crate) fn install_font(preferred: Option<&Path>) -> bool {
    let candidates = preferred
        .map(Path::to_path_buf)
        .into_iter()
        .chain(SYSTEM_FONTS.iter().map(PathBuf::from));
    for path in candidates {
        let Ok(bytes) = std::fs::read(&path) else {
            continue;
        };
        // plotters wants the font data for the rest of the process.
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        match register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
            Ok(()) => {
                debug!("Using font {}", path.display());
                return true;
            }
            Err(_) => warn!("Unusable font file {}", path.display()),
        }
    }
    warn!("No usable font found; charts will be drawn without text.");
    false
}

/// Renders the profit distribution histogram to a PNG file.
pub(crate) fn draw_histogram(
    path: &Path,
    histogram: &Histogram,
    labelled: bool,
) -> Result<(), anyhow::Error> {
    let root = BitMapBackend::new(path, (800, 400)).into_drawing_area();
    root.fill(&WHITE)?;
    let y_max = histogram.counts.iter().copied().max().unwrap_or(0);
    let mut builder = ChartBuilder::on(&root);
    builder.margin(10);
    if labelled {
        builder
            .caption("Distribution of Profit per Trade", (FONT_FAMILY, 22))
            .x_label_area_size(40)
            .y_label_area_size(60);
    }
    let mut chart =
        builder.build_cartesian_2d(histogram.lo..histogram.hi, 0u64..y_max + y_max / 10 + 1)?;
    if labelled {
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("Profit")
            .y_desc("Frequency")
            .draw()?;
    }
    chart.draw_series(
        histogram
            .bins()
            .filter(|(_, _, count)| *count > 0)
            .map(|(start, end, count)| {
                Rectangle::new([(start, 0), (end, count)], BLUE.mix(0.8).filled())
            }),
    )?;
    chart.draw_series(
        histogram
            .bins()
            .filter(|(_, _, count)| *count > 0)
            .map(|(start, end, count)| {
                Rectangle::new([(start, 0), (end, count)], BLACK.stroke_width(1))
            }),
    )?;
    root.present()?;
    Ok(())
}

/// Renders a bar chart of total profit per login, one bar per entry in `rows`,
/// in the given order.
pub(crate) fn draw_ranking(
    path: &Path,
    title: &str,
    rows: &[&LoginProfit],
    tone: Tone,
    labelled: bool,
) -> Result<(), anyhow::Error> {
    let root = BitMapBackend::new(path, (1000, 500)).into_drawing_area();
    root.fill(&WHITE)?;
    let values: Vec<f64> = rows
        .iter()
        .map(|p| p.total_profit.to_f64().unwrap_or_default())
        .collect();
    let (y_lo, y_hi) = value_range(&values);
    let slots = rows.len().max(1);

    let mut builder = ChartBuilder::on(&root);
    builder.margin(10);
    if labelled {
        builder
            .caption(title, (FONT_FAMILY, 22))
            .x_label_area_size(60)
            .y_label_area_size(80);
    }
    let mut chart = builder.build_cartesian_2d((0..slots).into_segmented(), y_lo..y_hi)?;
    if labelled {
        let login_label = |v: &SegmentValue<usize>| match v {
            SegmentValue::CenterOf(i) => {
                rows.get(*i).map(|p| p.login.clone()).unwrap_or_default()
            }
            _ => String::new(),
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(slots)
            .x_label_formatter(&login_label)
            .x_desc("Login")
            .y_desc("Total Profit")
            .draw()?;
    }
    chart.draw_series(values.iter().enumerate().map(|(i, v)| {
        let mut bar = Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *v)],
            tone.color().filled(),
        );
        bar.set_margin(0, 0, 6, 6);
        bar
    }))?;
    root.present()?;
    Ok(())
}

/// Y range for a bar chart: always includes zero, padded a bit, never empty.
fn value_range(values: &[f64]) -> (f64, f64) {
    let lo = values.iter().copied().fold(0.0_f64, f64::min);
    let hi = values.iter().copied().fold(0.0_f64, f64::max);
    if lo == hi {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (if lo < 0.0 { lo - pad } else { lo }, if hi > 0.0 { hi + pad } else { hi })
}

#[cfg(test)]
mod tests {
    use super::{draw_histogram, draw_ranking, value_range, Histogram, Tone};
    use crate::data::LoginProfit;
    use rust_decimal_macros::dec;

    #[test]
    fn histogram_bins() {
        let h = Histogram::new(&[0.0, 1.0, 2.0, 3.0, 4.0], 4);
        assert_eq!((h.lo, h.hi), (0.0, 4.0));
        // The max lands in the last bin.
        assert_eq!(h.counts, [1, 1, 1, 2]);
        let edges: Vec<_> = h.bins().map(|(s, e, _)| (s, e)).collect();
        assert_eq!(edges[0], (0.0, 1.0));
        assert_eq!(edges[3], (3.0, 4.0));
    }

    #[test]
    fn histogram_constant_and_empty() {
        let h = Histogram::new(&[5.0, 5.0], 80);
        assert_eq!((h.lo, h.hi), (4.5, 5.5));
        assert_eq!(h.counts.iter().sum::<u64>(), 2);
        assert_eq!(h.counts.len(), 80);

        let h = Histogram::new(&[], 80);
        assert_eq!((h.lo, h.hi), (0.0, 1.0));
        assert!(h.counts.iter().all(|c| *c == 0));
    }

    #[test]
    fn histogram_ignores_non_finite() {
        let h = Histogram::new(&[f64::NAN, 1.0, f64::INFINITY, 3.0], 2);
        assert_eq!(h.counts, [1, 1]);
    }

    #[test]
    fn value_range_includes_zero() {
        assert_eq!(value_range(&[]), (-1.0, 1.0));
        let (lo, hi) = value_range(&[10.0, 20.0]);
        assert_eq!(lo, 0.0);
        assert!(hi > 20.0);
        let (lo, hi) = value_range(&[-10.0, -5.0]);
        assert!(lo < -10.0);
        assert_eq!(hi, 0.0);
    }

    #[test]
    fn draws_unlabelled_charts() {
        let dir = tempfile::tempdir().unwrap();
        let hist = dir.path().join("hist.png");
        draw_histogram(&hist, &Histogram::new(&[-3.0, 1.0, 2.5], 80), false).unwrap();
        assert!(hist.metadata().unwrap().len() > 0);

        let rows = [
            LoginProfit {
                login: "1".into(),
                total_profit: dec!(-20),
                n_trades: 2,
                avg_profit: dec!(-10),
            },
            LoginProfit {
                login: "2".into(),
                total_profit: dec!(15),
                n_trades: 1,
                avg_profit: dec!(15),
            },
        ];
        let bars = dir.path().join("bars.png");
        let refs: Vec<_> = rows.iter().collect();
        draw_ranking(&bars, "Bars", &refs, Tone::Negative, false).unwrap();
        assert!(bars.metadata().unwrap().len() > 0);

        let empty = dir.path().join("empty.png");
        draw_ranking(&empty, "Empty", &[], Tone::Positive, false).unwrap();
        assert!(empty.exists());
    }
}
