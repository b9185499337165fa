use std::fmt;
use std::str::FromStr;

use crate::error::EstimateError;

pub const KB: u64 = 1024;
pub const MB: u64 = 1024 * KB;
pub const GB: u64 = 1024 * MB;

/// How often, in chunks, the membership table's footprint is compared against the budget.
pub const DEFAULT_CHECK_INTERVAL: u64 = 100_000;

/// Which savings to estimate. Selected once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Dedup,
    Compression,
    DedupCompression,
}

impl FromStr for Mode {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "D" | "d" | "dedup" => Ok(Mode::Dedup),
            "C" | "c" | "compression" => Ok(Mode::Compression),
            "DC" | "dc" | "dedup-compression" => Ok(Mode::DedupCompression),
            other => Err(EstimateError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Dedup => "dedup",
            Mode::Compression => "compression",
            Mode::DedupCompression => "dedup-compression",
        };
        f.write_str(name)
    }
}

/// Rounding behaviour of the final percentage arithmetic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Arithmetic {
    /// Truncate the kilobyte and gigabyte totals to integers before dividing, as the
    /// legacy estimator did. The compression saving in GB is `percent * size / 100`
    /// under either variant; the legacy estimator printed the remaining compressed
    /// size in that field instead.
    #[default]
    Legacy,
    /// Divide the exact byte totals.
    Precise,
}

#[derive(Debug, Clone)]
pub struct EstimateConfig {
    pub device_size_gb: u64,
    pub unit_size: usize,
    pub ram_limit_mb: u64,
    pub check_interval: u64,
    pub arithmetic: Arithmetic,
    pub progress: bool,
    block_count: Option<u64>,
}

impl EstimateConfig {
    pub fn new(device_size_gb: u64, unit_size: usize, ram_limit_mb: u64) -> Self {
        EstimateConfig {
            device_size_gb,
            unit_size,
            ram_limit_mb,
            check_interval: DEFAULT_CHECK_INTERVAL,
            arithmetic: Arithmetic::default(),
            progress: false,
            block_count: None,
        }
    }

    /// Scans exactly `block_count` chunks instead of deriving the count from the device size.
    pub fn with_block_count(mut self, block_count: u64) -> Self {
        self.block_count = Some(block_count);
        self
    }

    pub fn with_check_interval(mut self, check_interval: u64) -> Self {
        self.check_interval = check_interval;
        self
    }

    pub fn with_arithmetic(mut self, arithmetic: Arithmetic) -> Self {
        self.arithmetic = arithmetic;
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn block_count(&self) -> u64 {
        match self.block_count {
            Some(count) => count,
            None if self.unit_size == 0 => 0,
            None => self.device_size_gb.saturating_mul(GB) / self.unit_size as u64,
        }
    }

    pub fn ram_limit_bytes(&self) -> u64 {
        self.ram_limit_mb.saturating_mul(MB)
    }

    pub fn validate(&self) -> Result<(), EstimateError> {
        if self.unit_size == 0 {
            return Err(EstimateError::InvalidConfiguration(
                "unit size must be positive",
            ));
        }
        if self.device_size_gb == 0 {
            return Err(EstimateError::InvalidConfiguration(
                "device size must be positive",
            ));
        }
        if self.ram_limit_mb == 0 {
            return Err(EstimateError::InvalidConfiguration(
                "ram limit must be positive",
            ));
        }
        if self.check_interval == 0 {
            return Err(EstimateError::InvalidConfiguration(
                "check interval must be positive",
            ));
        }
        if self.block_count() == 0 {
            return Err(EstimateError::InvalidConfiguration(
                "block count must be positive",
            ));
        }
        Ok(())
    }
}
