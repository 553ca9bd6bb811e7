mod cli;

use anyhow::{Context, Result};
use bin_history::config::Config;
use bin_history::history::{clamp_granularity, HistoryPipeline};
use bin_history::status::BinStatus;
use clap::Parser;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplayOutput<'a> {
    status: BinStatus,
    #[serde(flatten)]
    report: &'a bin_history::history::HistoryReport,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,bin_history=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn main() -> Result<()> {
    let args = cli::Args::parse();
    init_tracing();

    let mut config = Config::from_env(args.preferences.as_deref())?;
    if let Some(granularity) = args.granularity {
        config.granularity_seconds = clamp_granularity(granularity);
    }

    let first = std::fs::read(&args.first)
        .with_context(|| format!("failed to read {}", args.first.display()))?;
    let second = std::fs::read(&args.second)
        .with_context(|| format!("failed to read {}", args.second.display()))?;

    let pipeline = HistoryPipeline::new(config.history_config());
    let report = pipeline.run(&first, &second);
    if report.diagnostics.skipped_samples > 0 {
        tracing::warn!(
            skipped = report.diagnostics.skipped_samples,
            "some history records were skipped"
        );
    }
    tracing::info!(
        records = report.records.len(),
        granularity = config.granularity_seconds,
        "bin history reconciled"
    );

    let output = ReplayOutput {
        status: BinStatus::from_report(&report),
        report: &report,
    };
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");

    Ok(())
}
