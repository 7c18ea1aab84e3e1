use byteorder::{ByteOrder, LittleEndian};

use crate::constants::*;
use crate::entry::EntryView;

/// A borrowed view of one per-core history: the core id, the ring capacity,
/// and the ring slots themselves.
#[derive(Debug, Clone, Copy)]
pub struct HistoryView<'a> {
    data: &'a [u8],
}

impl<'a> HistoryView<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        debug_assert!(data.len() >= HISTORY_HEADER_SIZE);
        Self { data }
    }

    /// The logical core this history was recorded on.
    pub fn lcore(&self) -> u64 {
        LittleEndian::read_u64(&self.data[0..8])
    }

    /// The ring capacity, clamped to the mapped range.
    pub fn num_entries(&self) -> usize {
        let declared = LittleEndian::read_u64(&self.data[8..16]);
        let available = (self.data.len() - HISTORY_HEADER_SIZE) / ENTRY_SIZE;
        usize::try_from(declared)
            .unwrap_or(usize::MAX)
            .min(available)
    }

    /// The slot at a physical ring index.
    pub fn entry(&self, index: usize) -> EntryView<'a> {
        let start = HISTORY_HEADER_SIZE + index * ENTRY_SIZE;
        EntryView::new(&self.data[start..start + ENTRY_SIZE])
    }

    /// The physical index following `index` in ring order.
    pub(crate) fn next_slot(&self, index: usize) -> usize {
        if index + 1 == self.num_entries() {
            0
        } else {
            index + 1
        }
    }

    /// The physical indices of the oldest and newest live entry, or `None`
    /// if nothing was ever recorded on this core.
    ///
    /// The producer does not persist a write pointer, so the ring state is
    /// inferred from slot contents:
    ///
    ///  - Trailing slots with tsc == 0 have never been written. If the ring
    ///    is not completely filled it also never wrapped, and logical order
    ///    is physical order.
    ///  - A completely filled ring may have wrapped at any offset. The
    ///    producer overwrites the oldest slot first and timestamps are
    ///    monotone per core, so the minimum tsc marks the oldest live entry
    ///    and the maximum tsc the newest.
    pub fn ring_bounds(&self) -> Option<(usize, usize)> {
        let num_entries = self.num_entries();
        if num_entries == 0 {
            return None;
        }

        let mut filled = num_entries;
        while filled > 0 && self.entry(filled - 1).tsc() == 0 {
            filled -= 1;
        }
        if filled == 0 || self.entry(0).tsc() == 0 {
            return None;
        }

        if filled < num_entries {
            return Some((0, filled - 1));
        }

        // Ties can only appear at initialization; take the lowest index for
        // the oldest entry and the highest for the newest.
        let mut first = 0;
        let mut last = 0;
        for i in 1..num_entries {
            let tsc = self.entry(i).tsc();
            if tsc < self.entry(first).tsc() {
                first = i;
            }
            if tsc >= self.entry(last).tsc() {
                last = i;
            }
        }
        Some((first, last))
    }
}
