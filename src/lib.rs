//! A parser for binary trace files captured by a multi-core runtime.
//!
//! A trace file starts with a fixed header (global flags plus a tracepoint
//! descriptor table) followed by one ring buffer history per logical core.
//! Each ring slot is either an event entry or a spill buffer carrying
//! overflow argument bytes for the entry before it. The producer records no
//! write pointer, so the parser infers each ring's live window from slot
//! timestamps, merges all cores into a single stream ordered by
//! `(timestamp, core)`, tracks object lifecycles, and reassembles argument
//! payloads that were fragmented across spill buffers.
//!
//! The file is memory-mapped read-only in two phases: the header alone is
//! mapped first to learn the full file size, then the complete range is
//! mapped. Entries handed to the caller alias the mapping and stay valid
//! until the parser is dropped.
//!
//! # Example
//!
//! ```
//! use ring_trace_data::{TraceParser, TraceSource};
//!
//! # fn wrapper() -> Result<(), ring_trace_data::Error> {
//! let mut parser = TraceParser::open(TraceSource::File("trace.pid1234".as_ref()), None)?;
//! println!("tsc rate: {}", parser.flags().tsc_rate);
//! println!("synchronized start: {}", parser.tsc_offset());
//!
//! while let Some(entry) = parser.next_entry() {
//!     let name = entry.tpoint().map_or("?", |t| t.name());
//!     println!(
//!         "lcore {} tsc {} {}: {} args",
//!         entry.lcore,
//!         entry.tsc(),
//!         name,
//!         entry.args().len()
//!     );
//! }
//! # Ok(())
//! # }
//! ```

pub mod constants;
mod entry;
mod error;
mod header;
mod history;
mod mapping;
mod objects;
mod parser;
mod spill;

pub use entry::{ArgValue, EntryView, ParsedEntry};
pub use error::Error;
pub use header::{ArgType, TraceFlags, Tracepoint, TracepointArgument};
pub use history::HistoryView;
pub use mapping::{TraceMapping, TraceSource};
pub use parser::TraceParser;
