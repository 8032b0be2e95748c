use crate::data::LoginProfit;

const SUMMARY_HEADER: [&str; 4] = ["login", "total_profit", "n_trades", "avg_profit"];

/// Basic CSV exporter for the per-login summary. The header is written by hand so an
/// empty summary still produces a file with its columns.
pub(crate) fn write_summary<W: std::io::Write>(
    writer: W,
    summary: &[LoginProfit],
) -> Result<(), anyhow::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(SUMMARY_HEADER)?;
    for row in summary {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::write_summary;
    use crate::data::LoginProfit;
    use rust_decimal_macros::dec;

    #[test]
    fn writes_rows_in_order() {
        let summary = [
            LoginProfit {
                login: "1001".into(),
                total_profit: dec!(150.5),
                n_trades: 2,
                avg_profit: dec!(75.25),
            },
            LoginProfit {
                login: "1002".into(),
                total_profit: dec!(-40),
                n_trades: 1,
                avg_profit: dec!(-40),
            },
        ];
        let mut out = Vec::new();
        write_summary(&mut out, &summary).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "login,total_profit,n_trades,avg_profit\n1001,150.5,2,75.25\n1002,-40,1,-40\n"
        );
    }

    #[test]
    fn empty_summary_keeps_header() {
        let mut out = Vec::new();
        write_summary(&mut out, &[]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "login,total_profit,n_trades,avg_profit\n"
        );
    }
}
