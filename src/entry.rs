use byteorder::{ByteOrder, LittleEndian};

use crate::constants::*;
use crate::header::Tracepoint;

/// A borrowed view of one 32-byte ring slot.
///
/// The same slot layout serves two purposes, told apart by `tpoint_id` and
/// `tsc`: an event entry, or a spill buffer carrying overflow argument bytes
/// for the immediately preceding event. The view aliases the mapped file and
/// is valid for the lifetime of the parser that produced it.
#[derive(Debug, Clone, Copy)]
pub struct EntryView<'a> {
    data: &'a [u8],
}

impl<'a> EntryView<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        debug_assert_eq!(data.len(), ENTRY_SIZE);
        Self { data }
    }

    pub fn tpoint_id(&self) -> u16 {
        LittleEndian::read_u16(&self.data[0..2])
    }

    /// Reserved owner field, recorded by the producer.
    pub fn owner_id(&self) -> u16 {
        LittleEndian::read_u16(&self.data[2..4])
    }

    /// Reserved size field, recorded by the producer.
    pub fn size(&self) -> u32 {
        LittleEndian::read_u32(&self.data[4..8])
    }

    /// The timestamp of this slot. Zero means the slot has never been
    /// written.
    pub fn tsc(&self) -> u64 {
        LittleEndian::read_u64(&self.data[8..16])
    }

    pub fn object_id(&self) -> u64 {
        LittleEndian::read_u64(&self.data[16..24])
    }

    /// Whether this slot is a spill continuation rather than an event.
    /// A slot with the sentinel tpoint id and a zero tsc is merely
    /// unwritten.
    pub fn is_spill_buffer(&self) -> bool {
        self.tpoint_id() == TRACE_MAX_TPOINT_ID && self.tsc() != 0
    }

    /// The payload region of this slot viewed as a spill buffer. For an
    /// event entry this overlays its `object_id` and `args` fields.
    pub(crate) fn buffer_data(&self) -> &'a [u8] {
        &self.data[BUFFER_DATA_OFFSET..]
    }

    /// The raw bytes of the slot.
    pub fn raw_bytes(&self) -> &'a [u8] {
        self.data
    }
}

/// One fully populated event, yielded by
/// [`TraceParser::next_entry`](crate::TraceParser::next_entry).
#[derive(Debug, Clone)]
pub struct ParsedEntry<'a> {
    /// The logical core whose ring this event was recorded on.
    pub lcore: u16,
    /// Dense per-object-type ordinal of the referenced object, or
    /// `u64::MAX` if the creation event was not observed.
    pub object_index: u64,
    /// Creation timestamp of the referenced object, or `u64::MAX` if the
    /// creation event was not observed.
    pub object_start: u64,
    pub(crate) entry: EntryView<'a>,
    pub(crate) tpoint: Option<&'a Tracepoint>,
    pub(crate) args: [ArgValue; TRACE_MAX_ARGS],
    pub(crate) num_args: usize,
}

impl<'a> ParsedEntry<'a> {
    /// The raw entry backing this event.
    pub fn entry(&self) -> EntryView<'a> {
        self.entry
    }

    /// The descriptor of this event's tracepoint, or `None` if the
    /// tracepoint id falls outside the descriptor table.
    pub fn tpoint(&self) -> Option<&'a Tracepoint> {
        self.tpoint
    }

    pub fn tpoint_id(&self) -> u16 {
        self.entry.tpoint_id()
    }

    pub fn tsc(&self) -> u64 {
        self.entry.tsc()
    }

    pub fn object_id(&self) -> u64 {
        self.entry.object_id()
    }

    /// The reassembled arguments, one slot per declared argument.
    pub fn args(&self) -> &[ArgValue] {
        &self.args[..self.num_args]
    }
}

/// One reassembled argument payload, truncated to
/// [`TRACE_ARG_SLOT_SIZE`] bytes.
#[derive(Debug, Clone, Copy)]
pub struct ArgValue {
    pub(crate) data: [u8; TRACE_ARG_SLOT_SIZE],
    pub(crate) len: usize,
}

impl ArgValue {
    /// The payload bytes that were copied into this slot.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// The first eight payload bytes as a little-endian integer, zero
    /// padded for shorter arguments.
    pub fn as_u64(&self) -> u64 {
        LittleEndian::read_u64(&self.data[..8])
    }

    /// The payload interpreted as a NUL-terminated string.
    pub fn as_str(&self) -> &str {
        let bytes = self.as_bytes();
        let len = memchr::memchr(0, bytes).unwrap_or(bytes.len());
        std::str::from_utf8(&bytes[..len]).unwrap_or("")
    }
}

impl Default for ArgValue {
    fn default() -> Self {
        Self {
            data: [0; TRACE_ARG_SLOT_SIZE],
            len: 0,
        }
    }
}
