//! heap - heap graph dump model
//!
//! Typed nodes and references as written by the VM's heap dumper, and the
//! JSON loader for them.

mod load;
mod types;

pub use load::{read_document, DecodeError};
pub use types::{EdgeRecord, GcColor, HeapDump, Node};
