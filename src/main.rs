use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use dre::{
    Arithmetic, ChunkSource, CodecKind, EstimateConfig, Estimator, Mode, Xxh32,
    DEFAULT_CHECK_INTERVAL,
};

/// Estimates dedup, compression and combined savings of a block device or file in one pass.
#[derive(Parser)]
#[command(name = "dre", version)]
#[command(after_help = "Example: dre DC /dev/sdb 100 4096 1024")]
struct Cli {
    /// Estimation type: D (dedup), C (compression) or DC (dedup+compression)
    mode: String,

    /// Block device or file to scan
    device: PathBuf,

    /// Amount of valid data to scan, in GB
    size_gb: u64,

    /// Chunk size in bytes, e.g. 4096
    unit_size: usize,

    /// Memory budget of the dedup table, in MB
    ram_limit_mb: u64,

    /// Compressor used to size each chunk
    #[arg(long, default_value = "lz4-frame")]
    codec: CodecKind,

    /// Divide exact byte totals instead of truncating them first
    #[arg(long)]
    precise: bool,

    /// Chunks between two checks of the dedup table's footprint
    #[arg(long, default_value_t = DEFAULT_CHECK_INTERVAL)]
    check_interval: u64,

    /// Draw a progress bar on stderr
    #[arg(long)]
    progress: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mode: Mode = cli.mode.parse()?;
    let arithmetic = if cli.precise {
        Arithmetic::Precise
    } else {
        Arithmetic::Legacy
    };
    let config = EstimateConfig::new(cli.size_gb, cli.unit_size, cli.ram_limit_mb)
        .with_check_interval(cli.check_interval)
        .with_arithmetic(arithmetic)
        .with_progress(cli.progress);
    config.validate()?;

    let source = ChunkSource::open(&cli.device, config.unit_size)
        .with_context(|| format!("Failed to open {}", cli.device.display()))?;
    let mut estimator =
        Estimator::from_source(source, config, Xxh32::default(), cli.codec.build());
    let report = estimator
        .run(mode)
        .with_context(|| format!("Failed to estimate {}", cli.device.display()))?;

    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
