use crate::compute::BottomOrder;
use clap::Parser;
use std::path::PathBuf;

/// Cleans a trade export and reports which logins are profitable.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Trade export to analyse (CSV with at least `login` and `profit` columns).
    pub input: PathBuf,

    /// Directory receiving the charts, the summary CSV and the report.
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Number of logins in the top ranking.
    #[arg(long, default_value_t = 10)]
    pub top_k: usize,

    /// Number of logins in the bottom ranking.
    #[arg(long, default_value_t = 10)]
    pub bottom_k: usize,

    /// Display order of the bottom ranking.
    #[arg(long, value_enum, default_value_t = BottomOrder::Ascending)]
    pub bottom_order: BottomOrder,

    /// Bins of the profit histogram.
    #[arg(long, default_value_t = 80, value_parser = clap::value_parser!(u16).range(1..))]
    pub bins: u16,

    /// Font used for chart text. Common system fonts are tried when omitted.
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Rows shown in the console preview.
    #[arg(long, default_value_t = 5)]
    pub preview_rows: usize,
}

#[cfg(test)]
impl Config {
    /// Defaults for everything but the input path.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: PathBuf::from("."),
            top_k: 10,
            bottom_k: 10,
            bottom_order: BottomOrder::Ascending,
            bins: 80,
            font: None,
            preview_rows: 5,
        }
    }
}
