use crate::constants::*;
use crate::entry::{ArgValue, EntryView};
use crate::error::Error;
use crate::history::HistoryView;

/// A cursor over the payload bytes of an event and its spill continuations.
///
/// The first argument bytes live inline in the event entry itself, so the
/// cursor starts on the event viewed as a buffer, at the payload offset
/// where the inline argument region begins. When a buffer's payload is
/// exhausted the cursor advances to the next ring slot, which must be a
/// spill continuation carrying the owning event's timestamp.
pub(crate) struct ArgCursor<'a> {
    history: HistoryView<'a>,
    buffer: EntryView<'a>,
    slot: usize,
    offset: usize,
    tsc: u64,
}

impl<'a> ArgCursor<'a> {
    pub fn new(history: HistoryView<'a>, slot: usize) -> Self {
        let buffer = history.entry(slot);
        Self {
            tsc: buffer.tsc(),
            history,
            buffer,
            slot,
            offset: FIRST_ARG_OFFSET,
        }
    }

    /// Consume `size` payload bytes into `out`, walking spill buffers as
    /// needed. Bytes beyond the output slot capacity are consumed from the
    /// stream but not copied, which keeps the cursor aligned for the next
    /// argument.
    pub fn read_arg(&mut self, size: usize, out: &mut ArgValue) -> Result<(), Error> {
        let mut argoff = 0;
        while argoff < size {
            if self.offset == BUFFER_DATA_SIZE {
                self.advance()?;
            }

            let curlen = (BUFFER_DATA_SIZE - self.offset).min(size - argoff);
            if argoff < TRACE_ARG_SLOT_SIZE {
                let copy = curlen.min(TRACE_ARG_SLOT_SIZE - argoff);
                let data = self.buffer.buffer_data();
                out.data[argoff..argoff + copy]
                    .copy_from_slice(&data[self.offset..self.offset + copy]);
            }

            self.offset += curlen;
            argoff += curlen;
        }

        out.len = size.min(TRACE_ARG_SLOT_SIZE);
        Ok(())
    }

    fn advance(&mut self) -> Result<(), Error> {
        self.slot = self.history.next_slot(self.slot);
        let buffer = self.history.entry(self.slot);
        if buffer.tpoint_id() != TRACE_MAX_TPOINT_ID || buffer.tsc() != self.tsc {
            return Err(Error::SpillMismatch {
                lcore: self.history.lcore() as u16,
                tsc: self.tsc,
            });
        }
        self.offset = 0;
        self.buffer = buffer;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn event_slot(tpoint_id: u16, tsc: u64, inline: &[u8]) -> [u8; ENTRY_SIZE] {
        let mut slot = [0u8; ENTRY_SIZE];
        slot[0..2].copy_from_slice(&tpoint_id.to_le_bytes());
        slot[8..16].copy_from_slice(&tsc.to_le_bytes());
        slot[ENTRY_ARGS_OFFSET..ENTRY_ARGS_OFFSET + inline.len()].copy_from_slice(inline);
        slot
    }

    fn spill_slot(tsc: u64, data: &[u8]) -> [u8; ENTRY_SIZE] {
        let mut slot = [0u8; ENTRY_SIZE];
        slot[0..2].copy_from_slice(&TRACE_MAX_TPOINT_ID.to_le_bytes());
        slot[8..16].copy_from_slice(&tsc.to_le_bytes());
        slot[BUFFER_DATA_OFFSET..BUFFER_DATA_OFFSET + data.len()].copy_from_slice(data);
        slot
    }

    fn history(slots: &[[u8; ENTRY_SIZE]]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&0u64.to_le_bytes());
        data.extend_from_slice(&(slots.len() as u64).to_le_bytes());
        for slot in slots {
            data.extend_from_slice(slot);
        }
        data
    }

    #[test]
    fn inline_argument() {
        let data = history(&[event_slot(1, 100, &[1, 2, 3, 4, 5, 6, 7, 8])]);
        let mut cursor = ArgCursor::new(HistoryView::new(&data), 0);
        let mut out = ArgValue::default();
        cursor.read_arg(8, &mut out).unwrap();
        assert_eq!(out.as_bytes(), &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn argument_spanning_spill_buffer() {
        let data = history(&[
            event_slot(1, 100, &[0xa; 8]),
            spill_slot(100, &[0xb; 16]),
        ]);
        let mut cursor = ArgCursor::new(HistoryView::new(&data), 0);
        let mut out = ArgValue::default();
        cursor.read_arg(24, &mut out).unwrap();
        assert_eq!(&out.as_bytes()[..8], &[0xa; 8]);
        assert_eq!(&out.as_bytes()[8..], &[0xb; 16]);
    }

    #[test]
    fn second_argument_starts_in_spill_buffer() {
        // First argument exactly fills the inline region, so the second
        // argument's first byte comes from the continuation slot.
        let data = history(&[
            event_slot(1, 100, &[0x1; 8]),
            spill_slot(100, &[0x2, 0x2, 0x2, 0x2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]),
        ]);
        let mut cursor = ArgCursor::new(HistoryView::new(&data), 0);
        let mut first = ArgValue::default();
        let mut second = ArgValue::default();
        cursor.read_arg(8, &mut first).unwrap();
        cursor.read_arg(4, &mut second).unwrap();
        assert_eq!(first.as_bytes(), &[0x1; 8]);
        assert_eq!(second.as_bytes(), &[0x2; 4]);
    }

    #[test]
    fn spill_wraps_around_ring_end() {
        let data = history(&[
            spill_slot(100, &[0xc; 16]),
            [0u8; ENTRY_SIZE],
            event_slot(1, 100, &[0xa; 8]),
        ]);
        let mut cursor = ArgCursor::new(HistoryView::new(&data), 2);
        let mut out = ArgValue::default();
        cursor.read_arg(24, &mut out).unwrap();
        assert_eq!(&out.as_bytes()[8..], &[0xc; 16]);
    }

    #[test]
    fn mismatched_timestamp_fails() {
        let data = history(&[
            event_slot(1, 100, &[0xa; 8]),
            spill_slot(101, &[0xb; 16]),
        ]);
        let mut cursor = ArgCursor::new(HistoryView::new(&data), 0);
        let mut out = ArgValue::default();
        assert!(matches!(
            cursor.read_arg(24, &mut out),
            Err(Error::SpillMismatch { tsc: 100, .. })
        ));
    }

    #[test]
    fn non_sentinel_continuation_fails() {
        let data = history(&[
            event_slot(1, 100, &[0xa; 8]),
            event_slot(2, 100, &[0xb; 8]),
        ]);
        let mut cursor = ArgCursor::new(HistoryView::new(&data), 0);
        let mut out = ArgValue::default();
        assert!(cursor.read_arg(24, &mut out).is_err());
    }

    #[test]
    fn oversized_argument_is_consumed_but_truncated() {
        let mut slots = vec![event_slot(1, 100, &[0x1; 8])];
        for _ in 0..4 {
            slots.push(spill_slot(100, &[0x2; 16]));
        }
        // 8 inline + 64 spilled bytes; the argument claims 56 of them.
        let data = history(&slots);
        let mut cursor = ArgCursor::new(HistoryView::new(&data), 0);
        let mut big = ArgValue::default();
        cursor.read_arg(56, &mut big).unwrap();
        assert_eq!(big.as_bytes().len(), TRACE_ARG_SLOT_SIZE);

        // The remaining 16 bytes belong to the next argument; the cursor
        // must land exactly on them despite the truncation.
        let mut next = ArgValue::default();
        cursor.read_arg(16, &mut next).unwrap();
        assert_eq!(next.as_bytes(), &[0x2; 16]);
    }
}
