//! Key-value store implementations.
//!
//! - `atomic_json`: single JSON document on disk with atomic writes
//! - `memory`: in-process map, used by tests and dry runs

mod atomic_json;
mod memory;

pub use atomic_json::JsonFileStore;
pub use memory::MemoryStore;
