//! Console tables printed while the pipeline runs. Purely informational.

use crate::{
    compute::saturating_sum,
    data::{Cell, LoginProfit, Table, Value},
};
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::warn;

fn grid<I, S>(header: I) -> comfy_table::Table
where
    I: IntoIterator<Item = S>,
    S: Into<comfy_table::Cell>,
{
    let mut grid = comfy_table::Table::new();
    grid.load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    grid
}

/// First `n` rows of the table, all columns.
pub(crate) fn preview(table: &Table, n: usize) -> comfy_table::Table {
    let mut grid = grid(&table.columns);
    for row in table.rows.iter().take(n) {
        grid.add_row(row.iter().map(Cell::to_string));
    }
    grid
}

/// Per-column count, distinct values, most frequent value and, when the column has
/// numbers or timestamps, mean/min/max.
pub(crate) fn describe(table: &Table) -> comfy_table::Table {
    let mut grid = grid(["column", "count", "unique", "top", "mean", "min", "max"]);
    for (idx, name) in table.columns.iter().enumerate() {
        let mut freq: HashMap<&Value, usize> = HashMap::new();
        let mut first_seen: Vec<&Value> = Vec::new();
        for cell in table.cells(idx) {
            if let Cell::Valid(v) = cell {
                let n = freq.entry(v).or_default();
                if *n == 0 {
                    first_seen.push(v);
                }
                *n += 1;
            }
        }
        let count: usize = freq.values().sum();
        let top = first_seen
            .iter()
            .max_by(|a, b| freq[*a].cmp(&freq[*b]).then(std::cmp::Ordering::Greater))
            .map(ToString::to_string)
            .unwrap_or_default();

        let numbers: Vec<Decimal> = table.cells(idx).filter_map(Cell::as_number).collect();
        let (mean, min, max) = if !numbers.is_empty() {
            let (sum, clamped) = saturating_sum(&numbers);
            if clamped {
                warn!("Sum of column {name} overflows; its mean is approximate.");
            }
            (
                (sum / Decimal::from(numbers.len())).round_dp(4).to_string(),
                numbers.iter().min().map(ToString::to_string).unwrap_or_default(),
                numbers.iter().max().map(ToString::to_string).unwrap_or_default(),
            )
        } else {
            let times = || {
                first_seen.iter().filter_map(|v| match v {
                    Value::Timestamp(t) => Some(*t),
                    _ => None,
                })
            };
            let fmt = |t: chrono::NaiveDateTime| t.format("%Y-%m-%d %H:%M:%S").to_string();
            (
                String::new(),
                times().min().map(fmt).unwrap_or_default(),
                times().max().map(fmt).unwrap_or_default(),
            )
        };

        grid.add_row(vec![
            name.clone(),
            count.to_string(),
            freq.len().to_string(),
            top,
            mean,
            min,
            max,
        ]);
    }
    grid
}

/// Number of missing cells per column.
pub(crate) fn missing_counts(table: &Table) -> comfy_table::Table {
    let mut grid = grid(["column", "missing"]);
    for (idx, name) in table.columns.iter().enumerate() {
        let missing = table.cells(idx).filter(|c| c.is_missing()).count();
        grid.add_row(vec![name.clone(), missing.to_string()]);
    }
    grid
}

pub(crate) fn ranking(rows: &[&LoginProfit]) -> comfy_table::Table {
    let mut grid = grid(["login", "total_profit", "n_trades", "avg_profit"]);
    for p in rows {
        grid.add_row(vec![
            p.login.clone(),
            p.total_profit.to_string(),
            p.n_trades.to_string(),
            p.avg_profit.round_dp(4).to_string(),
        ]);
    }
    grid
}
