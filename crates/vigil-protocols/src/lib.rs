//! # Vigil Protocols
//!
//! Domain types and capability traits shared by every Vigil crate.
//! Contains no scheduling, storage or transport implementations.
//!
//! ## Core Types
//!
//! - [`Check`] - A periodically executed health check and its run state
//! - [`Incident`] - The persisted record of an open failure streak
//! - [`Event`] - One pass of the incident state machine
//! - [`Message`] - A notification handed to senders
//! - [`Handler`] - A named sender bound to checks
//!
//! ## Core Traits
//!
//! - [`Sender`] - Notification delivery capability
//! - [`Storage`] - Incident persistence capability

pub mod check;
pub mod error;
pub mod event;
pub mod handler;
pub mod incident;
pub mod message;
pub mod storage;

pub use check::{Check, CheckDefinition, CheckState, HISTORY_LIMIT};
pub use error::{CheckError, RegistryError, SendError, StorageError};
pub use event::{short_id, Event};
pub use handler::{Handler, Sender};
pub use incident::Incident;
pub use message::{Message, MessageType};
pub use storage::Storage;
