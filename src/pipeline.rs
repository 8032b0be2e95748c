use crate::{
    chart::{draw_histogram, draw_ranking, install_font, Histogram, Tone},
    clean::clean,
    compute::{bottom_k, profit_per_login, top_k},
    config::Config,
    console,
    data::{
        ARTIFACTS, BOTTOM_LOGINS_PNG, PROFIT, PROFIT_DISTRIBUTION_PNG, PROFIT_PER_LOGIN_CSV,
        REPORT_MD, TOP_LOGINS_PNG,
    },
    read::load_table,
    report::Report,
    write::write_summary,
};
use rust_decimal::prelude::ToPrimitive;
use std::{fs, path::PathBuf};
use tracing::info;

/// Runs load, clean, aggregate, chart and report once, in that order. Returns the
/// paths of the files written. A load failure aborts before anything is written.
pub fn run(config: &Config) -> Result<Vec<PathBuf>, anyhow::Error> {
    let raw = load_table(&config.input)?;
    let (rows, columns) = raw.shape();
    info!("Dataset loaded successfully: {rows} rows, {columns} columns.");
    info!("Columns: {}", raw.columns.join(", "));
    println!("{}", console::preview(&raw, config.preview_rows));

    let cleaned = clean(raw);
    let table = &cleaned.table;
    info!("{} rows remain after cleaning.", table.rows.len());
    println!("{}", console::describe(table));
    println!("{}", console::missing_counts(table));

    let summary = profit_per_login(table);
    let top = top_k(&summary, config.top_k);
    let bottom = bottom_k(&summary, config.bottom_k, config.bottom_order);
    info!("Top {} logins by total profit:", config.top_k);
    println!("{}", console::ranking(&top.iter().collect::<Vec<_>>()));
    info!("Bottom {} logins by total profit:", config.bottom_k);
    println!("{}", console::ranking(&bottom));

    fs::create_dir_all(&config.output_dir)?;
    let out = |name: &str| config.output_dir.join(name);
    let labelled = install_font(config.font.as_deref());

    let profits: Vec<f64> = table
        .column(PROFIT)
        .into_iter()
        .flat_map(|idx| table.cells(idx))
        .filter_map(|c| c.as_number()?.to_f64())
        .collect();
    let histogram = Histogram::new(&profits, usize::from(config.bins));
    draw_histogram(&out(PROFIT_DISTRIBUTION_PNG), &histogram, labelled)?;

    draw_ranking(
        &out(TOP_LOGINS_PNG),
        &format!("Top {} Logins by Cumulative Profit", config.top_k),
        &top.iter().collect::<Vec<_>>(),
        Tone::Positive,
        labelled,
    )?;
    draw_ranking(
        &out(BOTTOM_LOGINS_PNG),
        &format!("Bottom {} Logins by Cumulative Profit", config.bottom_k),
        &bottom,
        Tone::Negative,
        labelled,
    )?;

    write_summary(fs::File::create(out(PROFIT_PER_LOGIN_CSV))?, &summary)?;

    let report = Report::new(&cleaned, &summary, &ARTIFACTS);
    fs::write(out(REPORT_MD), report.to_string())?;

    let written: Vec<PathBuf> = ARTIFACTS.iter().map(|&name| out(name)).collect();
    info!("Analysis complete. Files generated:");
    for path in &written {
        info!("- {}", path.display());
    }
    Ok(written)
}
