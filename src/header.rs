use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::constants::*;

/// The header region of a trace file: global flags plus the tracepoint
/// descriptor table.
///
/// The header has a fixed size ([`HEADER_SIZE`]) and fully determines the
/// size of the rest of the file, which is what makes the two-phase mapping
/// in [`TraceMapping`](crate::TraceMapping) possible.
#[derive(Debug, Clone)]
pub struct TraceFlags {
    /// Timestamp counter ticks per second, as calibrated by the producer.
    pub tsc_rate: u64,
    num_lcores: u64,
    num_entries: u64,
    tpoints: Box<[Tracepoint]>,
}

impl TraceFlags {
    /// Parse the header region from a reader holding at least
    /// [`HEADER_SIZE`] bytes.
    pub fn parse<R: Read>(mut reader: R) -> Result<Self, std::io::Error> {
        let tsc_rate = reader.read_u64::<LittleEndian>()?;
        let num_lcores = reader.read_u64::<LittleEndian>()?;
        let num_entries = reader.read_u64::<LittleEndian>()?;

        let mut tpoints = Vec::with_capacity(TRACE_MAX_TPOINT_ID as usize);
        for _ in 0..TRACE_MAX_TPOINT_ID {
            tpoints.push(Tracepoint::parse(&mut reader)?);
        }

        Ok(Self {
            tsc_rate,
            num_lcores,
            num_entries,
            tpoints: tpoints.into_boxed_slice(),
        })
    }

    /// The number of per-core histories that follow the header.
    pub fn num_lcores(&self) -> u64 {
        self.num_lcores
    }

    /// The ring capacity of every per-core history.
    pub fn num_entries(&self) -> u64 {
        self.num_entries
    }

    /// The descriptor for a tracepoint id, or `None` if the id is outside
    /// the descriptor table (the spill sentinel and anything above it).
    pub fn tpoint(&self, tpoint_id: u16) -> Option<&Tracepoint> {
        self.tpoints.get(usize::from(tpoint_id))
    }

    /// The full descriptor table. Unregistered rows have an empty name and
    /// zero arguments.
    pub fn tpoints(&self) -> &[Tracepoint] {
        &self.tpoints
    }
}

/// A tracepoint descriptor from the header.
#[derive(Debug, Clone)]
pub struct Tracepoint {
    name: [u8; TPOINT_NAME_LEN],
    pub tpoint_id: u16,
    pub owner_type: u8,
    /// Object type referenced by this tracepoint; [`OBJECT_NONE`] if it does
    /// not reference a long-lived object.
    pub object_type: u8,
    /// Whether an event of this tracepoint begins a new object lifetime.
    pub new_object: bool,
    num_args: u8,
    args: [TracepointArgument; TRACE_MAX_ARGS],
}

impl Tracepoint {
    fn parse<R: Read>(mut reader: R) -> Result<Self, std::io::Error> {
        let mut name = [0; TPOINT_NAME_LEN];
        reader.read_exact(&mut name)?;
        let tpoint_id = reader.read_u16::<LittleEndian>()?;
        let owner_type = reader.read_u8()?;
        let object_type = reader.read_u8()?;
        let new_object = reader.read_u8()? != 0;
        let num_args = reader.read_u8()?.min(TRACE_MAX_ARGS as u8);
        let _reserved = reader.read_u16::<LittleEndian>()?;
        let mut args = [TracepointArgument::default(); TRACE_MAX_ARGS];
        for arg in args.iter_mut() {
            *arg = TracepointArgument::parse(&mut reader)?;
        }
        Ok(Self {
            name,
            tpoint_id,
            owner_type,
            object_type,
            new_object,
            num_args,
            args,
        })
    }

    /// The tracepoint name with NUL padding trimmed.
    pub fn name(&self) -> &str {
        trim_name(&self.name)
    }

    /// Whether this descriptor row describes a registered tracepoint.
    pub fn is_registered(&self) -> bool {
        self.name[0] != 0
    }

    /// The declared arguments of this tracepoint.
    pub fn args(&self) -> &[TracepointArgument] {
        &self.args[..usize::from(self.num_args)]
    }
}

/// A single argument declaration within a tracepoint descriptor.
#[derive(Debug, Clone, Copy)]
pub struct TracepointArgument {
    name: [u8; ARG_NAME_LEN],
    pub ty: ArgType,
    /// Total payload size of this argument in bytes. Payloads larger than
    /// the inline region spill into continuation slots.
    pub size: u8,
}

impl TracepointArgument {
    fn parse<R: Read>(mut reader: R) -> Result<Self, std::io::Error> {
        let mut name = [0; ARG_NAME_LEN];
        reader.read_exact(&mut name)?;
        let ty = ArgType(reader.read_u8()?);
        let size = reader.read_u8()?;
        Ok(Self { name, ty, size })
    }

    /// The argument name with NUL padding trimmed.
    pub fn name(&self) -> &str {
        trim_name(&self.name)
    }
}

impl Default for TracepointArgument {
    fn default() -> Self {
        Self {
            name: [0; ARG_NAME_LEN],
            ty: ArgType::INT,
            size: 0,
        }
    }
}

/// The declared rendering type of an argument. Metadata only; the parser
/// never interprets payload bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgType(pub u8);

impl ArgType {
    pub const INT: Self = Self(0);
    pub const PTR: Self = Self(1);
    pub const STR: Self = Self(2);
}

fn trim_name(name: &[u8]) -> &str {
    let len = memchr::memchr(0, name).unwrap_or(name.len());
    std::str::from_utf8(&name[..len]).unwrap_or("")
}
