use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use std::{fmt, path::PathBuf};
use thiserror::Error;

pub const LOGIN: &str = "login";
pub const PROFIT: &str = "profit";
pub const TIME_COLUMNS: [&str; 2] = ["open_time", "close_time"];

pub const PROFIT_DISTRIBUTION_PNG: &str = "profit_distribution.png";
pub const TOP_LOGINS_PNG: &str = "top10_logins.png";
pub const BOTTOM_LOGINS_PNG: &str = "bottom10_logins.png";
pub const PROFIT_PER_LOGIN_CSV: &str = "profit_per_login.csv";
pub const REPORT_MD: &str = "data_assessment_report.md";

/// Every file a run produces, in the order they are written.
pub const ARTIFACTS: [&str; 5] = [
    PROFIT_DISTRIBUTION_PNG,
    TOP_LOGINS_PNG,
    BOTTOM_LOGINS_PNG,
    PROFIT_PER_LOGIN_CSV,
    REPORT_MD,
];

/// A typed cell value. Everything comes out of the loader as `Text`; the cleaner is
/// the only one promoting cells to `Number` or `Timestamp`.
///
/// Note that `login` is never promoted and stays `Text`. It looks numeric in every
/// export we've seen, but it's an identifier, not a quantity: parsing it would make
/// `0042` and `42` the same account, and nothing ever does arithmetic on it anyway.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Value {
    Text(String),
    Number(Decimal),
    Timestamp(NaiveDateTime),
}

/// One table cell. Malformed input never raises: it just becomes `Missing`, so the
/// cleaning steps stay total and a "bad" cell is something you can match on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Cell {
    Valid(Value),
    Missing,
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Valid(Value::Text(s.into()))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Cell::Valid(Value::Number(n)) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{n}"),
            Value::Timestamp(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Valid(v) => v.fmt(f),
            Cell::Missing => f.write_str("NaN"),
        }
    }
}

pub(crate) type Row = Vec<Cell>;

/// In-memory table: column names plus rows in original input order. Every row has
/// exactly `columns.len()` cells (the loader pads short rows and rejects long ones).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    pub fn cells(&self, idx: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().map(move |row| &row[idx])
    }
}

/// Profitability of a single login. Field order is the column order of
/// `profit_per_login.csv`, since that's what the CSV writer serializes.
///
/// `avg_profit` is stored rather than computed on the fly (unlike a `total` field we
/// could derive at serialization time) because it's the one value that needs a
/// division, and we'd rather do it once in the aggregator than in every consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct LoginProfit {
    pub login: String,
    pub total_profit: Decimal,
    pub n_trades: usize,
    pub avg_profit: Decimal,
}

/// The only fatal failures of a run: the input can't be opened or isn't a table we
/// can work with. Everything after loading recovers locally.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Input file {0} not found")]
    SourceNotFound(PathBuf),
    #[error("Input is not valid delimited text: {0}")]
    ParseError(#[from] csv::Error),
    #[error("Line {line} has {found} fields, the header only has {expected}")]
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("Required column `{0}` is missing from the input")]
    MissingColumn(&'static str),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
