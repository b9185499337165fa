use std::io::{Read, Seek};

use indicatif::{ProgressBar, ProgressIterator};

use crate::config::{EstimateConfig, Mode};
use crate::error::EstimateError;
use crate::fingerprint::{Fingerprint, Fingerprinter, Xxh32};
use crate::report::{Report, RunningTotals};
use crate::sizer::{Codec, CompressionSizer, Lz4Frame};
use crate::source::ChunkSource;
use crate::table::{MembershipTable, ResetPolicy};

/// Drives one input through a single sequential pass per run.
///
/// The estimator owns its membership table; separate estimators never share state.
pub struct Estimator<R, F = Xxh32, C = Lz4Frame> {
    source: ChunkSource<R>,
    fingerprinter: F,
    sizer: CompressionSizer<C>,
    table: MembershipTable,
    policy: ResetPolicy,
    config: EstimateConfig,
    totals: RunningTotals,
}

impl<R: Read + Seek> Estimator<R, Xxh32, Lz4Frame> {
    pub fn new(reader: R, config: EstimateConfig) -> Self {
        Self::with_parts(reader, config, Xxh32::default(), Lz4Frame)
    }
}

impl<R, F, C> Estimator<R, F, C>
where
    R: Read + Seek,
    F: Fingerprinter,
    C: Codec,
{
    pub fn with_parts(reader: R, config: EstimateConfig, fingerprinter: F, codec: C) -> Self {
        let source = ChunkSource::new(reader, config.unit_size);
        Self::from_source(source, config, fingerprinter, codec)
    }

    /// Builds an estimator over an already opened source. The source's unit size must
    /// match `config.unit_size`, otherwise [`run`](Self::run) fails.
    pub fn from_source(
        source: ChunkSource<R>,
        config: EstimateConfig,
        fingerprinter: F,
        codec: C,
    ) -> Self {
        let policy = ResetPolicy::new(config.check_interval, config.ram_limit_bytes());
        Estimator {
            source,
            fingerprinter,
            sizer: CompressionSizer::new(codec),
            table: MembershipTable::new(),
            policy,
            config,
            totals: RunningTotals::default(),
        }
    }

    /// Replaces the reset policy derived from the configuration.
    pub fn with_policy(mut self, policy: ResetPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> &EstimateConfig {
        &self.config
    }

    /// Totals of the most recent run.
    pub fn totals(&self) -> &RunningTotals {
        &self.totals
    }

    pub fn run(&mut self, mode: Mode) -> Result<Report, EstimateError> {
        self.config.validate()?;
        if self.source.unit_size() != self.config.unit_size {
            return Err(EstimateError::InvalidConfiguration(
                "chunk source unit size differs from the configured one",
            ));
        }
        let block_count = self.config.block_count();
        log::info!(
            "{mode} estimation over {block_count} chunks of {} bytes, table budget {} MB",
            self.config.unit_size,
            self.config.ram_limit_mb
        );

        self.totals = RunningTotals::default();
        self.table.reset();

        let bar = if self.config.progress {
            ProgressBar::new(block_count)
        } else {
            ProgressBar::hidden()
        };

        let Estimator {
            source,
            fingerprinter,
            sizer,
            table,
            policy,
            totals,
            ..
        } = self;

        for index in (0..block_count).progress_with(bar) {
            if mode != Mode::Compression && policy.enforce(index, table) {
                totals.table_resets += 1;
            }

            let chunk = source.read_chunk(index)?;
            match mode {
                Mode::Dedup => {
                    let fingerprint = fingerprinter.fingerprint(chunk);
                    if is_duplicate(table, fingerprint) {
                        totals.duplicate_count += 1;
                    }
                }
                Mode::Compression => {
                    let size = sizer.compressed_size(chunk)?;
                    totals.add_compressed(size);
                }
                Mode::DedupCompression => {
                    let size = sizer.compressed_size(chunk)?;
                    totals.add_compressed(size);

                    let fingerprint = fingerprinter.fingerprint(chunk);
                    if is_duplicate(table, fingerprint) {
                        totals.duplicate_count += 1;
                    } else {
                        totals.dedup_compressed_bytes += size as u64;
                    }
                }
            }
            totals.chunks_processed += 1;
        }

        log::info!(
            "scanned {} chunks: {} duplicates, {} compressed bytes, {} table resets",
            self.totals.chunks_processed,
            self.totals.duplicate_count,
            self.totals.compressed_bytes,
            self.totals.table_resets
        );
        Ok(Report::build(mode, &self.totals, &self.config))
    }
}

/// Records `fingerprint` and reports whether it was already present.
fn is_duplicate(table: &mut MembershipTable, fingerprint: Fingerprint) -> bool {
    if table.contains(fingerprint) {
        true
    } else {
        table.insert(fingerprint);
        false
    }
}
