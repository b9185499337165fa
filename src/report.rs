use serde::Serialize;

use crate::config::{Arithmetic, EstimateConfig, Mode, GB, KB, MB};

/// Accumulators of one run. Zeroed when a run starts, never in the middle of one.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunningTotals {
    pub chunks_processed: u64,
    pub duplicate_count: u64,
    /// Compressed kilobytes, rounded to four decimals after every addition.
    pub compressed_kb: f64,
    pub compressed_bytes: u64,
    /// Compressed bytes of the chunks that survived deduplication.
    pub dedup_compressed_bytes: u64,
    pub table_resets: u64,
}

impl RunningTotals {
    pub(crate) fn add_compressed(&mut self, size: usize) {
        self.compressed_bytes += size as u64;
        self.compressed_kb = round4(self.compressed_kb + size as f64 / KB as f64);
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Final figures of a run. Which fields are present depends on the mode.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedup_saving_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedup_saving_gb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_saving_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_saving_gb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_reduction_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_reduction_gb: Option<f64>,
}

impl Report {
    pub fn build(mode: Mode, totals: &RunningTotals, config: &EstimateConfig) -> Self {
        let mut report = Report::default();
        if matches!(mode, Mode::Dedup | Mode::DedupCompression) {
            report.dedup(totals, config);
        }
        if matches!(mode, Mode::Compression | Mode::DedupCompression) {
            report.compression(totals, config);
        }
        if mode == Mode::DedupCompression {
            report.reduction(totals, config);
        }
        report
    }

    fn dedup(&mut self, totals: &RunningTotals, config: &EstimateConfig) {
        let duplicates = totals.duplicate_count as f64;
        self.dedup_saving_percent = Some(duplicates / config.block_count() as f64 * 100.0);
        self.dedup_saving_gb = Some(duplicates * config.unit_size as f64 / GB as f64);
    }

    fn compression(&mut self, totals: &RunningTotals, config: &EstimateConfig) {
        let device_gb = config.device_size_gb as f64;
        let stored_fraction = match config.arithmetic {
            Arithmetic::Legacy => totals.compressed_kb.floor() / (device_gb * MB as f64),
            Arithmetic::Precise => totals.compressed_bytes as f64 / (device_gb * GB as f64),
        };
        let percent = 100.0 - stored_fraction * 100.0;
        self.compression_saving_percent = Some(percent);
        self.compression_saving_gb = Some(percent * device_gb / 100.0);
    }

    fn reduction(&mut self, totals: &RunningTotals, config: &EstimateConfig) {
        let device_gb = config.device_size_gb as f64;
        let stored_gb = match config.arithmetic {
            Arithmetic::Legacy => (totals.dedup_compressed_bytes / GB) as f64,
            Arithmetic::Precise => totals.dedup_compressed_bytes as f64 / GB as f64,
        };
        let reduction = device_gb - stored_gb;
        self.total_reduction_gb = Some(reduction);
        self.total_reduction_percent = Some(reduction / device_gb * 100.0);
    }

    /// Present metrics as `(name, value)` pairs, in a fixed order.
    pub fn metrics(&self) -> Vec<(&'static str, f64)> {
        [
            ("dedup_saving_percent", self.dedup_saving_percent),
            ("dedup_saving_gb", self.dedup_saving_gb),
            ("compression_saving_percent", self.compression_saving_percent),
            ("compression_saving_gb", self.compression_saving_gb),
            ("total_reduction_percent", self.total_reduction_percent),
            ("total_reduction_gb", self.total_reduction_gb),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }
}
