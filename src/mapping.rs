use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::{Mmap, MmapOptions};

use crate::constants::*;
use crate::error::Error;
use crate::header::TraceFlags;
use crate::history::HistoryView;

/// Where a trace is read from.
#[derive(Debug, Clone, Copy)]
pub enum TraceSource<'a> {
    /// A regular trace file on the filesystem.
    File(&'a Path),
    /// A POSIX shared-memory object, named the way the producer named it for
    /// `shm_open(3)`. Resolved under `/dev/shm`.
    Shm(&'a str),
}

impl TraceSource<'_> {
    fn path(&self) -> PathBuf {
        match self {
            TraceSource::File(path) => path.to_path_buf(),
            TraceSource::Shm(name) => Path::new("/dev/shm").join(name.trim_start_matches('/')),
        }
    }
}

/// A read-only mapping of a complete trace file, with the header already
/// parsed.
///
/// The mapping happens in two phases because the total file size is only
/// discoverable from header fields: first exactly [`HEADER_SIZE`] bytes are
/// mapped and the per-core count and ring capacity are read, then the header
/// mapping is dropped and the full computed range is mapped. Both mappings
/// are shared and read-only; in SHM mode a concurrently writing producer is
/// tolerated as a best-effort snapshot.
#[derive(Debug)]
pub struct TraceMapping {
    mmap: Mmap,
    flags: TraceFlags,
    history_size: usize,
}

impl TraceMapping {
    pub fn open(source: TraceSource<'_>) -> Result<Self, Error> {
        let path = source.path();
        let file = File::open(&path).map_err(|source| Error::SourceOpen {
            path: path.clone(),
            source,
        })?;
        let file_size = file
            .metadata()
            .map_err(|source| Error::SourceStat {
                path: path.clone(),
                source,
            })?
            .len();
        if file_size < HEADER_SIZE as u64 {
            return Err(Error::TruncatedHeader {
                size: file_size,
                expected: HEADER_SIZE as u64,
            });
        }

        // Phase 1: map only the header and read the fields that size the
        // rest of the file.
        //
        // Safety: the mapping is read-only and shared. A concurrent writer
        // (SHM mode) can change the bytes under us, which the format
        // tolerates; the length never exceeds the file size checked above.
        let header_map = unsafe { MmapOptions::new().len(HEADER_SIZE).map(&file) }.map_err(
            |source| Error::MapFailed {
                path: path.clone(),
                source,
            },
        )?;
        let flags = TraceFlags::parse(&header_map[..])?;
        drop(header_map);

        if flags.num_lcores() > TRACE_MAX_LCORE {
            return Err(Error::LcoreCountOutOfRange(flags.num_lcores()));
        }
        let history_size = (HISTORY_HEADER_SIZE as u64)
            .checked_add(
                flags
                    .num_entries()
                    .checked_mul(ENTRY_SIZE as u64)
                    .ok_or(Error::FileSizeOverflow)?,
            )
            .ok_or(Error::FileSizeOverflow)?;
        let total_size = (HEADER_SIZE as u64)
            .checked_add(
                flags
                    .num_lcores()
                    .checked_mul(history_size)
                    .ok_or(Error::FileSizeOverflow)?,
            )
            .ok_or(Error::FileSizeOverflow)?;
        let total_size = usize::try_from(total_size).map_err(|_| Error::FileSizeOverflow)?;
        let history_size = usize::try_from(history_size).map_err(|_| Error::FileSizeOverflow)?;

        if file_size < total_size as u64 {
            return Err(Error::TruncatedFile {
                size: file_size,
                expected: total_size as u64,
            });
        }

        // Phase 2: map the full range.
        let mmap = unsafe { MmapOptions::new().len(total_size).map(&file) }.map_err(|source| {
            Error::MapFailed {
                path: path.clone(),
                source,
            }
        })?;

        Ok(Self {
            mmap,
            flags,
            history_size,
        })
    }

    /// The parsed header region.
    pub fn flags(&self) -> &TraceFlags {
        &self.flags
    }

    /// The number of per-core histories in the file.
    pub fn num_histories(&self) -> usize {
        self.flags.num_lcores() as usize
    }

    /// The per-core history at a file position (not an lcore id).
    pub fn history(&self, index: usize) -> HistoryView<'_> {
        let start = HEADER_SIZE + index * self.history_size;
        HistoryView::new(&self.mmap[start..start + self.history_size])
    }
}
