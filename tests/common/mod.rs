//! Shared helpers that synthesize trace files for the integration tests.

use std::io::Write;

use ring_trace_data::constants::*;
use tempfile::NamedTempFile;

struct TpointDef {
    id: u16,
    name: String,
    object_type: u8,
    new_object: bool,
    args: Vec<(String, u8, u8)>,
}

/// Builds a well-formed trace file slot by slot. Damaged inputs are made by
/// editing the produced bytes before writing them out.
pub struct TraceFileBuilder {
    tsc_rate: u64,
    ring_capacity: u64,
    tpoints: Vec<TpointDef>,
    histories: Vec<(u64, Vec<[u8; ENTRY_SIZE]>)>,
}

impl TraceFileBuilder {
    pub fn new(ring_capacity: u64) -> Self {
        Self {
            tsc_rate: 1_000_000_000,
            ring_capacity,
            tpoints: Vec::new(),
            histories: Vec::new(),
        }
    }

    pub fn tpoint(
        mut self,
        id: u16,
        name: &str,
        object_type: u8,
        new_object: bool,
        args: &[(&str, u8, u8)],
    ) -> Self {
        self.tpoints.push(TpointDef {
            id,
            name: name.to_string(),
            object_type,
            new_object,
            args: args
                .iter()
                .map(|&(name, ty, size)| (name.to_string(), ty, size))
                .collect(),
        });
        self
    }

    /// Add a per-core history. Slots beyond `slots.len()` stay unwritten.
    pub fn core(mut self, lcore: u64, slots: &[[u8; ENTRY_SIZE]]) -> Self {
        assert!(slots.len() as u64 <= self.ring_capacity);
        self.histories.push((lcore, slots.to_vec()));
        self
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&self.tsc_rate.to_le_bytes());
        data.extend_from_slice(&(self.histories.len() as u64).to_le_bytes());
        data.extend_from_slice(&self.ring_capacity.to_le_bytes());

        for id in 0..TRACE_MAX_TPOINT_ID {
            match self.tpoints.iter().find(|t| t.id == id) {
                Some(tpoint) => data.extend_from_slice(&descriptor(tpoint)),
                None => data.extend_from_slice(&[0; TPOINT_DESC_SIZE]),
            }
        }
        assert_eq!(data.len(), HEADER_SIZE);

        for (lcore, slots) in &self.histories {
            data.extend_from_slice(&lcore.to_le_bytes());
            data.extend_from_slice(&self.ring_capacity.to_le_bytes());
            for slot in slots {
                data.extend_from_slice(slot);
            }
            let unwritten = self.ring_capacity as usize - slots.len();
            data.extend_from_slice(&vec![0; unwritten * ENTRY_SIZE]);
        }
        data
    }

    pub fn build(&self) -> NamedTempFile {
        write_file(&self.bytes())
    }
}

pub fn write_file(data: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(data).unwrap();
    file.flush().unwrap();
    file
}

fn descriptor(tpoint: &TpointDef) -> Vec<u8> {
    assert!(tpoint.args.len() <= TRACE_MAX_ARGS);
    let mut buf = Vec::with_capacity(TPOINT_DESC_SIZE);
    let mut name = [0u8; TPOINT_NAME_LEN];
    name[..tpoint.name.len()].copy_from_slice(tpoint.name.as_bytes());
    buf.extend_from_slice(&name);
    buf.extend_from_slice(&tpoint.id.to_le_bytes());
    buf.push(0); // owner_type
    buf.push(tpoint.object_type);
    buf.push(tpoint.new_object as u8);
    buf.push(tpoint.args.len() as u8);
    buf.extend_from_slice(&[0, 0]);
    for i in 0..TRACE_MAX_ARGS {
        let mut arg_name = [0u8; ARG_NAME_LEN];
        let (name, ty, size) = match tpoint.args.get(i) {
            Some((name, ty, size)) => (name.as_str(), *ty, *size),
            None => ("", 0, 0),
        };
        arg_name[..name.len()].copy_from_slice(name.as_bytes());
        buf.extend_from_slice(&arg_name);
        buf.push(ty);
        buf.push(size);
    }
    assert_eq!(buf.len(), TPOINT_DESC_SIZE);
    buf
}

/// An event entry slot with up to eight inline argument bytes.
pub fn event(tpoint_id: u16, tsc: u64, object_id: u64, inline_args: &[u8]) -> [u8; ENTRY_SIZE] {
    assert!(inline_args.len() <= ENTRY_SIZE - ENTRY_ARGS_OFFSET);
    let mut slot = [0u8; ENTRY_SIZE];
    slot[0..2].copy_from_slice(&tpoint_id.to_le_bytes());
    slot[8..16].copy_from_slice(&tsc.to_le_bytes());
    slot[16..24].copy_from_slice(&object_id.to_le_bytes());
    slot[ENTRY_ARGS_OFFSET..ENTRY_ARGS_OFFSET + inline_args.len()].copy_from_slice(inline_args);
    slot
}

/// A spill continuation slot with up to sixteen payload bytes.
pub fn spill(tsc: u64, data: &[u8]) -> [u8; ENTRY_SIZE] {
    assert!(data.len() <= BUFFER_DATA_SIZE);
    let mut slot = [0u8; ENTRY_SIZE];
    slot[0..2].copy_from_slice(&TRACE_MAX_TPOINT_ID.to_le_bytes());
    slot[8..16].copy_from_slice(&tsc.to_le_bytes());
    slot[BUFFER_DATA_OFFSET..BUFFER_DATA_OFFSET + data.len()].copy_from_slice(data);
    slot
}
