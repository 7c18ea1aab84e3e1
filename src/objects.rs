use std::collections::HashMap;

use crate::constants::*;
use crate::header::Tracepoint;

/// Bookkeeping for one object type: a dense creation-order index and the
/// creation timestamp per object id.
#[derive(Debug, Default)]
struct ObjectStats {
    index: HashMap<u64, u64>,
    start: HashMap<u64, u64>,
    counter: u64,
}

/// Assigns per-object-type indices as creation events are observed and
/// attaches `(index, start)` pairs to events that reference an object.
#[derive(Debug)]
pub(crate) struct ObjectTracker {
    stats: [ObjectStats; TRACE_MAX_OBJECT],
}

impl ObjectTracker {
    pub fn new() -> Self {
        Self {
            stats: std::array::from_fn(|_| ObjectStats::default()),
        }
    }

    /// Record an event against its tracepoint descriptor. Returns the
    /// `(object_index, object_start)` pair to attach, or `None` if the
    /// tracepoint does not reference an object.
    ///
    /// A repeated `new_object` event for the same object id starts a fresh
    /// lifetime: index and start are reassigned.
    pub fn observe(&mut self, tpoint: &Tracepoint, object_id: u64, tsc: u64) -> Option<(u64, u64)> {
        let stats = self.stats.get_mut(usize::from(tpoint.object_type))?;

        if tpoint.new_object {
            stats.index.insert(object_id, stats.counter);
            stats.counter += 1;
            stats.start.insert(object_id, tsc);
        }

        if tpoint.object_type == OBJECT_NONE {
            return None;
        }

        match (stats.index.get(&object_id), stats.start.get(&object_id)) {
            (Some(&index), Some(&start)) => Some((index, start)),
            // The creation event predates the trace window or was lost.
            _ => Some((u64::MAX, u64::MAX)),
        }
    }
}
