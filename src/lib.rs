//! Single-pass estimation of deduplication and compression savings.
//!
//! The input is read once as a sequence of fixed-size chunks. Duplicates are detected with
//! 32-bit fingerprints held in a memory-bounded table that is cleared wholesale when it
//! outgrows its budget, and every chunk is compressed on its own to size it. Both are
//! approximations: dedup savings are a lower bound once the table has been reset, and
//! compression savings ignore cross-chunk redundancy.
//!
//! ```no_run
//! use std::fs::File;
//! use dre::{estimate, EstimateConfig, Mode};
//!
//! fn main() -> Result<(), dre::EstimateError> {
//!     let device = File::open("/dev/sdb")?;
//!     let report = estimate(device, Mode::DedupCompression, EstimateConfig::new(100, 4096, 1024))?;
//!     for (name, value) in report.metrics() {
//!         println!("{name}: {value:.2}");
//!     }
//!     Ok(())
//! }
//! ```

use std::io::{Read, Seek};

mod config;
mod engine;
mod error;
pub mod fingerprint;
mod report;
mod sizer;
mod source;
mod table;

pub use config::{Arithmetic, EstimateConfig, Mode, DEFAULT_CHECK_INTERVAL, GB, KB, MB};
pub use engine::Estimator;
pub use error::EstimateError;
pub use fingerprint::{Fingerprint, Fingerprinter, Xxh32, Xxh3Low32};
pub use report::{Report, RunningTotals};
pub use sizer::{Codec, CodecKind, CompressionSizer, Lz4Block, Lz4Frame};
pub use source::ChunkSource;
pub use table::{MembershipTable, ResetPolicy};

/// Runs one estimation with the default fingerprinter and codec.
pub fn estimate<R: Read + Seek>(
    reader: R,
    mode: Mode,
    config: EstimateConfig,
) -> Result<Report, EstimateError> {
    Estimator::new(reader, config).run(mode)
}
