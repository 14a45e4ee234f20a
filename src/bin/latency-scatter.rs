use std::fs;

use anyhow::Context;
use mem_latency::{
    config::{Config, SCATTER_FILE},
    exporter::read_records,
    init_tracing,
    view::scatter_chart_html,
};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env();
    let records = read_records(&config.out_file)?;
    let html = scatter_chart_html(&records);
    fs::write(SCATTER_FILE, html).with_context(|| format!("Failed to write {SCATTER_FILE}"))?;
    info!(records = records.len(), out = SCATTER_FILE, "Wrote scatter chart");
    Ok(())
}
