use crate::data::{Cell, LoginProfit, Table, Value, LOGIN, PROFIT};
use clap::ValueEnum;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::warn;

/// Running totals for one login while we walk the table.
#[derive(Debug, Default)]
struct Tally {
    login: String,
    total: Decimal,
    count: usize,
    saturated: bool,
}

/// Adds `amount` to `total`, pinning the result to `Decimal::MAX`/`MIN` instead of
/// panicking. The flag tells whether the sum had to be clamped.
pub(crate) fn add_saturating(total: Decimal, amount: Decimal) -> (Decimal, bool) {
    match total.checked_add(amount) {
        Some(sum) => (sum, false),
        None => (total.saturating_add(amount), true),
    }
}

/// Sum of `values` with the same clamping as `add_saturating`.
pub(crate) fn saturating_sum<'a, I>(values: I) -> (Decimal, bool)
where
    I: IntoIterator<Item = &'a Decimal>,
{
    values
        .into_iter()
        .fold((Decimal::ZERO, false), |(total, clamped), v| {
            let (sum, now) = add_saturating(total, *v);
            (sum, clamped || now)
        })
}

/// This is where the profitability numbers come from: group the canonical table by
/// login and compute total/count/mean profit.
///
/// Logins are accumulated in first-appearance order and the final sort is stable, so
/// logins with the same total come out in the order they were first seen. That's what
/// makes two runs over the same file print the exact same rankings, ties included.
///
/// This can't fail. An empty table gives an empty summary, and rows lacking a login or
/// a numeric profit are skipped (there are none in a cleaned table). Decimal has a
/// finite range though (about 7.9e28), so a login whose trades add up past it gets a
/// clamped total and a warning rather than taking the whole run down.
pub(crate) fn profit_per_login(table: &Table) -> Vec<LoginProfit> {
    let (Some(login), Some(profit)) = (table.column(LOGIN), table.column(PROFIT)) else {
        return Vec::new();
    };
    let mut index: HashMap<&Value, usize> = HashMap::new();
    let mut tallies: Vec<Tally> = Vec::new();
    for row in &table.rows {
        let (Cell::Valid(key), Some(amount)) = (&row[login], row[profit].as_number()) else {
            continue;
        };
        let slot = *index.entry(key).or_insert_with(|| {
            tallies.push(Tally {
                login: key.to_string(),
                ..Tally::default()
            });
            tallies.len() - 1
        });
        let tally = &mut tallies[slot];
        let (total, clamped) = add_saturating(tally.total, amount);
        if clamped && !tally.saturated {
            warn!(
                "Total profit of login {} exceeds the representable range; clamped to {total}.",
                tally.login
            );
        }
        tally.total = total;
        tally.saturated |= clamped;
        tally.count += 1;
    }

    let mut summary: Vec<LoginProfit> = tallies
        .into_iter()
        .map(|t| LoginProfit {
            avg_profit: t.total / Decimal::from(t.count),
            login: t.login,
            total_profit: t.total,
            n_trades: t.count,
        })
        .collect();
    summary.sort_by(|a, b| b.total_profit.cmp(&a.total_profit));
    summary
}

/// Display order of the bottom ranking. Either way it holds the same logins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum BottomOrder {
    /// Worst performer first.
    #[default]
    Ascending,
    /// Same order as the summary, worst performer last.
    Descending,
}

/// The `k` best logins; fewer if there aren't that many.
pub(crate) fn top_k(summary: &[LoginProfit], k: usize) -> &[LoginProfit] {
    &summary[..k.min(summary.len())]
}

/// The `k` worst logins, i.e. the tail of the descending summary, presented in `order`.
/// The ascending view is a stable re-sort of that tail, so tied logins keep the order
/// they were first seen in, same as everywhere else.
pub(crate) fn bottom_k(summary: &[LoginProfit], k: usize, order: BottomOrder) -> Vec<&LoginProfit> {
    let tail = &summary[summary.len().saturating_sub(k)..];
    let mut rows: Vec<&LoginProfit> = tail.iter().collect();
    if order == BottomOrder::Ascending {
        rows.sort_by(|a, b| a.total_profit.cmp(&b.total_profit));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::{bottom_k, profit_per_login, saturating_sum, top_k, BottomOrder};
    use crate::{
        clean::clean,
        data::{LoginProfit, Table},
        read::read_table,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;

    fn canonical(csv: &[u8]) -> Table {
        clean(read_table(csv).unwrap()).table
    }

    fn lp(login: &str, total: Decimal, n: usize, avg: Decimal) -> LoginProfit {
        LoginProfit {
            login: login.into(),
            total_profit: total,
            n_trades: n,
            avg_profit: avg,
        }
    }

    fn summary_of(totals: &[i64]) -> Vec<LoginProfit> {
        let mut summary: Vec<LoginProfit> = totals
            .iter()
            .enumerate()
            .map(|(i, t)| lp(&i.to_string(), Decimal::from(*t), 1, Decimal::from(*t)))
            .collect();
        summary.sort_by(|a, b| b.total_profit.cmp(&a.total_profit));
        summary
    }

    #[test]
    fn test_scenario_with_bad_profit_and_duplicate() {
        let table = canonical(b"login,profit\n1,100\n1,abc\n2,-50\n2,-50\n");
        assert_eq!(
            profit_per_login(&table),
            [
                lp("1", dec!(100), 1, dec!(100)),
                lp("2", dec!(-50), 1, dec!(-50)),
            ]
        );
    }

    #[test]
    fn test_sum_count_mean() {
        let table = canonical(b"login,profit,tx\n7,10,1\n8,1,2\n7,-4,3\n7,0.5,4\n");
        assert_eq!(
            profit_per_login(&table),
            [
                lp("7", dec!(6.5), 3, dec!(6.5) / dec!(3)),
                lp("8", dec!(1), 1, dec!(1)),
            ]
        );
    }

    #[test]
    fn test_ties_keep_first_appearance() {
        let table = canonical(b"login,profit\nc,5\na,5\nb,9\nd,5\n");
        let logins: Vec<_> = profit_per_login(&table)
            .into_iter()
            .map(|p| p.login)
            .collect();
        assert_eq!(logins, ["b", "c", "a", "d"]);
    }

    #[test]
    fn test_conservation_and_distinct_count() {
        let table = canonical(
            b"login,profit,tx\n1,10.25,1\n2,-3,2\n1,4,3\n3,0,4\n2,-3.5,5\n4,1e2,6\n",
        );
        let summary = profit_per_login(&table);
        let distinct: HashSet<_> = table.cells(0).collect();
        assert_eq!(summary.len(), distinct.len());
        let grand: Decimal = table.cells(1).filter_map(|c| c.as_number()).sum();
        let totals: Decimal = summary.iter().map(|p| p.total_profit).sum();
        assert_eq!(totals, grand);
        assert_eq!(summary.iter().map(|p| p.n_trades).sum::<usize>(), 6);
    }

    #[test]
    fn test_empty_table() {
        let table = canonical(b"login,profit\nnan,1\n");
        assert!(profit_per_login(&table).is_empty());
    }

    #[test]
    fn test_top_k_shorter_than_k() {
        let summary = summary_of(&[3, 1, 2]);
        assert_eq!(top_k(&summary, 10).len(), 3);
        assert_eq!(top_k(&summary, 2)[0].total_profit, dec!(3));
        assert!(top_k(&[], 10).is_empty());
    }

    #[test]
    fn test_bottom_k_order() {
        let summary = summary_of(&[5, -20, 0, 7, -3]);
        let asc: Vec<_> = bottom_k(&summary, 3, BottomOrder::Ascending)
            .iter()
            .map(|p| p.total_profit)
            .collect();
        assert_eq!(asc, [dec!(-20), dec!(-3), dec!(0)]);
        let desc: Vec<_> = bottom_k(&summary, 3, BottomOrder::Descending)
            .iter()
            .map(|p| p.total_profit)
            .collect();
        assert_eq!(desc, [dec!(0), dec!(-3), dec!(-20)]);
    }

    #[test]
    fn test_bottom_k_ties_keep_first_appearance() {
        let table = canonical(b"login,profit
z,9
a,-5
b,-5
");
        let summary = profit_per_login(&table);
        let logins = |rows: Vec<&LoginProfit>| -> Vec<String> {
            rows.into_iter().map(|p| p.login.clone()).collect()
        };
        assert_eq!(
            logins(bottom_k(&summary, 10, BottomOrder::Ascending)),
            ["a", "b", "z"]
        );
        assert_eq!(
            logins(bottom_k(&summary, 10, BottomOrder::Descending)),
            ["z", "a", "b"]
        );
    }

    #[test]
    fn test_total_past_decimal_range_is_clamped() {
        let table = canonical(
            b"\
login,profit,tx
1,60000000000000000000000000000,a
1,60000000000000000000000000000,b
2,-60000000000000000000000000000,c
2,-60000000000000000000000000000,d
3,5,e
",
        );
        let summary = profit_per_login(&table);
        assert_eq!(
            summary,
            [
                lp("1", Decimal::MAX, 2, Decimal::MAX / dec!(2)),
                lp("3", dec!(5), 1, dec!(5)),
                lp("2", Decimal::MIN, 2, Decimal::MIN / dec!(2)),
            ]
        );
    }

    #[test]
    fn test_saturating_sum() {
        let big = dec!(60000000000000000000000000000);
        assert_eq!(saturating_sum(&[dec!(1.5), dec!(-0.5)]), (dec!(1), false));
        assert_eq!(saturating_sum(&[big, big]), (Decimal::MAX, true));
        assert_eq!(saturating_sum(&Vec::<Decimal>::new()), (Decimal::ZERO, false));
    }

    #[test]
    fn test_top_and_bottom_overlap() {
        let k = 3;
        let big = summary_of(&[9, 8, 7, 6, 5, 4, 3, 2]);
        let top: HashSet<_> = top_k(&big, k).iter().map(|p| &p.login).collect();
        assert!(bottom_k(&big, k, BottomOrder::Ascending)
            .iter()
            .all(|p| !top.contains(&p.login)));

        let small = summary_of(&[3, 2, 1, 0]);
        let top: HashSet<_> = top_k(&small, k).iter().map(|p| &p.login).collect();
        assert!(bottom_k(&small, k, BottomOrder::Ascending)
            .iter()
            .any(|p| top.contains(&p.login)));
    }
}
