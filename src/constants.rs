/// Upper bound on the number of per-core histories in one trace file.
pub const TRACE_MAX_LCORE: u64 = 128;

/// Size of the tracepoint descriptor table in the header. The `u16` value
/// `TRACE_MAX_TPOINT_ID` itself never names a tracepoint; a slot carrying it
/// is either unwritten (tsc == 0) or a spill continuation of the preceding
/// entry (tsc == owning entry's tsc).
pub const TRACE_MAX_TPOINT_ID: u16 = 512;

/// Maximum number of arguments per tracepoint.
pub const TRACE_MAX_ARGS: usize = 5;

/// Number of object types, including [`OBJECT_NONE`].
pub const TRACE_MAX_OBJECT: usize = 16;

/// Object type of tracepoints that do not reference a long-lived object.
pub const OBJECT_NONE: u8 = 0;

/// Capacity of one reassembled argument slot. Argument payloads longer than
/// this are consumed from the spill stream but truncated in the output.
pub const TRACE_ARG_SLOT_SIZE: usize = 40;

pub const TPOINT_NAME_LEN: usize = 24;
pub const ARG_NAME_LEN: usize = 14;

/// On-disk size of one tracepoint descriptor.
pub const TPOINT_DESC_SIZE: usize = 112;

/// On-disk size of one per-argument descriptor within a tracepoint descriptor.
pub const ARG_DESC_SIZE: usize = 16;

/// Byte offset of the tracepoint descriptor table within the header.
pub const HEADER_TPOINT_OFFSET: usize = 24;

/// Total size of the header region. The full file size is
/// `HEADER_SIZE + num_lcores * (HISTORY_HEADER_SIZE + num_entries * ENTRY_SIZE)`
/// and is computable from the header alone.
pub const HEADER_SIZE: usize = HEADER_TPOINT_OFFSET + TRACE_MAX_TPOINT_ID as usize * TPOINT_DESC_SIZE;

/// Size of the fixed part of a per-core history (lcore + ring capacity).
pub const HISTORY_HEADER_SIZE: usize = 16;

/// Size of one ring slot, event entry and spill buffer alike.
pub const ENTRY_SIZE: usize = 32;

/// Byte offset of the inline argument region within an event entry.
pub const ENTRY_ARGS_OFFSET: usize = 24;

/// Byte offset of the payload region within a slot viewed as a spill buffer.
/// The payload overlays the event entry's `object_id` and `args` fields.
pub const BUFFER_DATA_OFFSET: usize = 16;

/// Payload capacity of one spill buffer.
pub const BUFFER_DATA_SIZE: usize = ENTRY_SIZE - BUFFER_DATA_OFFSET;

/// Payload offset at which an event entry's inline arguments begin when the
/// entry is viewed as a spill buffer.
pub const FIRST_ARG_OFFSET: usize = ENTRY_ARGS_OFFSET - BUFFER_DATA_OFFSET;
