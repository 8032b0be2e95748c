use crate::data::{Cell, Row, Table, Value, LOGIN, PROFIT, TIME_COLUMNS};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::{prelude::FromPrimitive, Decimal};
use std::{collections::HashSet, str::FromStr};
use tracing::{info, warn};

/// Textual spellings of "no value" that show up in exported spreadsheets.
const MISSING_TOKENS: &[&str] = &[
    "", "nan", "NaN", "-nan", "-NaN", "NA", "N/A", "n/a", "NULL", "null", "None", "<NA>", "#N/A",
    "#NA", "#N/A N/A", "1.#IND", "-1.#IND", "1.#QNAN", "-1.#QNAN",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Result of the cleaning stage: the canonical table and what was thrown away to get it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Cleaned {
    pub table: Table,
    pub dropped_missing: usize,
    pub dropped_duplicates: usize,
}

/// Turns the raw table into the canonical one. The step order matters: the key
/// columns are only checked once text has been normalized and `profit` parsed,
/// and duplicates are only detected on fully typed rows.
///
/// Cleaning an already clean table is a no-op: typed cells are never touched again.
pub(crate) fn clean(table: Table) -> Cleaned {
    let Table { columns, mut rows } = table;

    for row in rows.iter_mut() {
        for cell in row.iter_mut() {
            normalize_text(cell);
        }
    }

    for idx in TIME_COLUMNS.iter().filter_map(|c| columns.iter().position(|x| x == c)) {
        for row in rows.iter_mut() {
            retype(&mut row[idx], parse_datetime);
        }
    }

    let login = columns.iter().position(|c| c == LOGIN);
    let profit = columns.iter().position(|c| c == PROFIT);
    if let Some(idx) = profit {
        for row in rows.iter_mut() {
            retype(&mut row[idx], parse_number);
        }
    }

    let before = rows.len();
    rows.retain(|row| {
        let present = |idx: Option<usize>| idx.is_some_and(|i| !row[i].is_missing());
        present(login) && present(profit)
    });
    let dropped_missing = before - rows.len();
    info!("Dropped {dropped_missing} rows with missing login/profit.");

    let before = rows.len();
    let rows = dedup(rows);
    let dropped_duplicates = before - rows.len();
    info!("Dropped {dropped_duplicates} duplicate rows.");

    Cleaned {
        table: Table { columns, rows },
        dropped_missing,
        dropped_duplicates,
    }
}

/// Strips text cells and maps the "no value" spellings to `Missing`.
fn normalize_text(cell: &mut Cell) {
    if let Cell::Valid(Value::Text(s)) = cell {
        let trimmed = s.trim();
        if MISSING_TOKENS.contains(&trimmed) {
            *cell = Cell::Missing;
        } else if trimmed.len() != s.len() {
            *s = trimmed.to_owned();
        }
    }
}

/// Replaces a text cell with its parsed value, or `Missing` when it doesn't parse.
fn retype(cell: &mut Cell, parse: fn(&str) -> Option<Value>) {
    if let Cell::Valid(Value::Text(s)) = cell {
        *cell = parse(s).map_or(Cell::Missing, Cell::Valid);
    }
}

/// Parses profit text. Plain and scientific notation go straight to `Decimal`.
///
/// A number can be perfectly well formed and still not fit a `Decimal` (`1e30`, or
/// `inf` from a spreadsheet export). Those are real profits, not garbage, so they are
/// kept: we go through `f64` and pin whatever doesn't fit to `Decimal::MAX`/`MIN`,
/// with a warning. Only text that isn't a number at all becomes `Missing`.
fn parse_number(s: &str) -> Option<Value> {
    if let Ok(n) = Decimal::from_str(s).or_else(|_| Decimal::from_scientific(s)) {
        return Some(Value::Number(n));
    }
    let float = s.parse::<f64>().ok().filter(|v| !v.is_nan())?;
    let n = Decimal::from_f64(float).unwrap_or_else(|| {
        let clamped = if float.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        };
        warn!("Profit {s} is outside the supported range; clamped to {clamped}.");
        clamped
    });
    Some(Value::Number(n))
}

fn parse_datetime(s: &str) -> Option<Value> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(Value::Timestamp(t.naive_utc()));
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(Value::Timestamp)
}

/// Keeps the first occurrence of every distinct row, in original order.
///
/// This runs last on purpose, on fully typed rows: `" 10"`, `10.0` and `1e1` are the
/// same trade once cleaned, and comparing raw text would keep all three. It clones
/// every row into the set, which is fine at spreadsheet sizes; if exports ever get
/// big enough to matter, hashing row indices instead would be the way to go.
fn dedup(rows: Vec<Row>) -> Vec<Row> {
    let mut seen = HashSet::with_capacity(rows.len());
    rows.into_iter()
        .filter(|row| seen.insert(row.clone()))
        .collect()
}
