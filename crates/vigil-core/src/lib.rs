//! # Vigil Core
//!
//! The check execution and incident engine.
//!
//! ## Components
//!
//! - [`HandlerRegistry`] - Name-keyed store of configured handlers
//! - [`CheckRunner`] - Executes one check and feeds the result to the processor
//! - [`EventProcessor`] - The incident state machine
//! - [`DeliveryPolicy`] - Decides whether a message reaches the senders
//! - [`Scheduler`] - Runs every check on its own interval until shutdown

pub mod command;
pub mod policy;
pub mod processor;
pub mod registry;
pub mod runner;
pub mod scheduler;

pub use command::CommandSpec;
pub use policy::DeliveryPolicy;
pub use processor::{EventProcessor, Transition, STORAGE_DEADLINE};
pub use registry::HandlerRegistry;
pub use runner::{CheckRunner, Execution, SIGNALLED_STATUS};
pub use scheduler::{OverlapPolicy, Scheduler};
