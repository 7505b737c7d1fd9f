//! # Vigil Storage
//!
//! Backends for the [`Storage`](vigil_protocols::Storage) contract.
//!
//! - [`MemoryStorage`] - Process-local map, lost on restart
//! - [`FileStorage`] - One JSON document per check under a directory

pub mod backoff;
pub mod file;
pub mod memory;

pub use backoff::Backoff;
pub use file::FileStorage;
pub use memory::MemoryStorage;
