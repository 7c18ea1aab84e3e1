use std::io;
use std::path::PathBuf;

/// The error type used in this crate.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Could not open trace source {path}: {source}")]
    SourceOpen { path: PathBuf, source: io::Error },

    #[error("Could not determine the size of trace source {path}: {source}")]
    SourceStat { path: PathBuf, source: io::Error },

    #[error("Trace source is too small for a header: {size} bytes, need at least {expected}")]
    TruncatedHeader { size: u64, expected: u64 },

    #[error("Trace source is smaller than its header describes: {size} bytes, need {expected}")]
    TruncatedFile { size: u64, expected: u64 },

    #[error("Could not map trace source {path}: {source}")]
    MapFailed { path: PathBuf, source: io::Error },

    #[error("Header declares {0} per-core histories, more than the supported maximum")]
    LcoreCountOutOfRange(u64),

    #[error("Total trace size described by the header overflows the address space")]
    FileSizeOverflow,

    #[error("Logical core {0} is out of range")]
    LcoreOutOfRange(u16),

    #[error("Spill continuation on lcore {lcore} does not belong to the entry at tsc {tsc}")]
    SpillMismatch { lcore: u16, tsc: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
