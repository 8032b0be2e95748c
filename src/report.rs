use crate::{clean::Cleaned, data::LoginProfit};
use std::fmt;

const NO_DATA: &str = "no data";

/// Everything the assessment document talks about. Rendering is done by `Display`,
/// which never fails even when there are no logins at all.
#[derive(Debug)]
pub(crate) struct Report<'a> {
    pub rows: usize,
    pub columns: usize,
    pub logins: usize,
    pub best: Option<&'a LoginProfit>,
    pub worst: Option<&'a LoginProfit>,
    pub dropped_missing: usize,
    pub dropped_duplicates: usize,
    pub artifacts: &'a [&'a str],
}

impl<'a> Report<'a> {
    /// `summary` is expected in descending `total_profit` order: best first, worst last.
    pub fn new(cleaned: &Cleaned, summary: &'a [LoginProfit], artifacts: &'a [&'a str]) -> Self {
        let (rows, columns) = cleaned.table.shape();
        Self {
            rows,
            columns,
            logins: summary.len(),
            best: summary.first(),
            worst: summary.last(),
            dropped_missing: cleaned.dropped_missing,
            dropped_duplicates: cleaned.dropped_duplicates,
            artifacts,
        }
    }
}

struct Standing<'a>(Option<&'a LoginProfit>);

impl fmt::Display for Standing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(p) => write!(
                f,
                "{} with total profit {:.2}",
                p.login,
                p.total_profit.round_dp(2)
            ),
            None => f.write_str(NO_DATA),
        }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Data Assessment Report")?;
        writeln!(f)?;
        writeln!(f, "**Rows after cleaning:** {}  ", self.rows)?;
        writeln!(f, "**Columns:** {}  ", self.columns)?;
        writeln!(f)?;
        writeln!(f, "## Profitability Insights")?;
        writeln!(f, "- Unique logins: {}", self.logins)?;
        writeln!(f, "- Top login: {}", Standing(self.best))?;
        writeln!(f, "- Bottom login: {}", Standing(self.worst))?;
        writeln!(f)?;
        writeln!(f, "## Actions Taken")?;
        writeln!(f, "- Cleaned whitespace in text columns")?;
        writeln!(f, "- Parsed datetime columns (open_time, close_time)")?;
        writeln!(f, "- Converted profit column to numeric")?;
        writeln!(
            f,
            "- Dropped {} rows with missing login/profit",
            self.dropped_missing
        )?;
        writeln!(f, "- Removed {} duplicate rows", self.dropped_duplicates)?;
        writeln!(f)?;
        writeln!(f, "## Files Generated")?;
        for name in self.artifacts {
            writeln!(f, "- {name}")?;
        }
        Ok(())
    }
}
