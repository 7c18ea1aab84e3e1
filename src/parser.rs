use std::collections::BTreeMap;

use crate::constants::*;
use crate::entry::{ArgValue, ParsedEntry};
use crate::error::Error;
use crate::header::TraceFlags;
use crate::mapping::{TraceMapping, TraceSource};
use crate::objects::ObjectTracker;
use crate::spill::ArgCursor;

/// Orders merged events by timestamp, with the core id as tiebreak. Field
/// order carries the derived lexicographic ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct EntryKey {
    tsc: u64,
    lcore: u16,
}

#[derive(Debug, Clone, Copy)]
struct EntryLocation {
    history: usize,
    slot: usize,
}

/// A parser for per-core ring buffer trace files.
///
/// Construction maps the file, reconstructs every selected ring, and merges
/// all live events into one index ordered by `(tsc, lcore)`.
/// [`next_entry`](Self::next_entry) then yields fully populated entries in
/// global time order; dropping the parser releases the mapping and
/// invalidates all views handed out.
pub struct TraceParser {
    mapping: TraceMapping,
    tsc_offset: u64,
    entries: Vec<(EntryKey, EntryLocation)>,
    cursor: usize,
    tracker: ObjectTracker,
}

impl TraceParser {
    /// Open a trace and merge its events. `lcore` restricts parsing to a
    /// single core; `None` selects all cores.
    pub fn open(source: TraceSource<'_>, lcore: Option<u16>) -> Result<Self, Error> {
        let mapping = TraceMapping::open(source)?;

        let selected = match lcore {
            Some(lcore) if u64::from(lcore) >= TRACE_MAX_LCORE => {
                return Err(Error::LcoreOutOfRange(lcore));
            }
            Some(lcore) => (0..mapping.num_histories())
                .find(|&i| mapping.history(i).lcore() == u64::from(lcore))
                .map(|i| i..i + 1)
                .unwrap_or(0..0),
            None => 0..mapping.num_histories(),
        };

        let mut merged = BTreeMap::new();
        let mut tsc_offset = 0;
        for history_index in selected {
            let history = mapping.history(history_index);
            let Some((first, last)) = history.ring_bounds() else {
                continue;
            };
            let lcore = history.lcore() as u16;

            // The highest per-core oldest timestamp bounds the window where
            // every selected core was recording. Events before it are still
            // yielded; the offset is advisory.
            if history.entry(first).tsc() > tsc_offset {
                tsc_offset = history.entry(first).tsc();
            }

            let mut slot = first;
            loop {
                let entry = history.entry(slot);
                // Spill continuations travel with their owning entry.
                if entry.tpoint_id() != TRACE_MAX_TPOINT_ID {
                    merged.insert(
                        EntryKey {
                            tsc: entry.tsc(),
                            lcore,
                        },
                        EntryLocation {
                            history: history_index,
                            slot,
                        },
                    );
                }
                if slot == last {
                    break;
                }
                slot = history.next_slot(slot);
            }
        }

        Ok(Self {
            mapping,
            tsc_offset,
            entries: merged.into_iter().collect(),
            cursor: 0,
            tracker: ObjectTracker::new(),
        })
    }

    /// The next event in global `(tsc, lcore)` order, or `None` when the
    /// trace is exhausted.
    ///
    /// A spill continuation that fails its integrity check terminates the
    /// stream: the failure is logged and every later call returns `None`.
    pub fn next_entry(&mut self) -> Option<ParsedEntry<'_>> {
        let &(key, location) = self.entries.get(self.cursor)?;
        let history = self.mapping.history(location.history);
        let entry = history.entry(location.slot);

        let mut args = [ArgValue::default(); TRACE_MAX_ARGS];
        let mut num_args = 0;
        let mut object_index = u64::MAX;
        let mut object_start = u64::MAX;

        let tpoint = self.mapping.flags().tpoint(entry.tpoint_id());
        if let Some(tpoint) = tpoint {
            if let Some((index, start)) =
                self.tracker.observe(tpoint, entry.object_id(), entry.tsc())
            {
                object_index = index;
                object_start = start;
            }

            let mut arg_cursor = ArgCursor::new(history, location.slot);
            for (argid, arg) in tpoint.args().iter().enumerate() {
                if let Err(error) = arg_cursor.read_arg(usize::from(arg.size), &mut args[argid]) {
                    log::error!("Failed to parse tracepoint argument: {error}");
                    self.cursor = self.entries.len();
                    return None;
                }
                num_args += 1;
            }
        }

        self.cursor += 1;
        Some(ParsedEntry {
            lcore: key.lcore,
            object_index,
            object_start,
            entry,
            tpoint,
            args,
            num_args,
        })
    }

    /// Tracepoint metadata from the trace header.
    pub fn flags(&self) -> &TraceFlags {
        self.mapping.flags()
    }

    /// The highest per-core oldest live timestamp across the selected
    /// cores. Consumers that want a window covered by every core can
    /// discard events below it.
    pub fn tsc_offset(&self) -> u64 {
        self.tsc_offset
    }

    /// The number of live events in the merged index.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}
