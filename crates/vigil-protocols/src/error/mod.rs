//! Error types for the Vigil protocol layer.

mod check;
mod registry;
mod send;
mod storage;

pub use check::*;
pub use registry::*;
pub use send::*;
pub use storage::*;
