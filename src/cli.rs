use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "bin-history",
    version,
    about = "Reconcile two saved sensor history payloads into a banded bin history report"
)]
pub struct Args {
    /// History payload of the bin's first sensor.
    #[arg(long)]
    pub first: PathBuf,
    /// History payload of the bin's second sensor.
    #[arg(long)]
    pub second: PathBuf,
    /// Project preferences JSON carrying fillThresholds / batteryThresholds.
    #[arg(long)]
    pub preferences: Option<PathBuf>,
    /// Bucket width in seconds (overrides BIN_HISTORY_GRANULARITY_SECONDS).
    #[arg(long)]
    pub granularity: Option<i64>,
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}
