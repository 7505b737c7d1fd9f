//! # Vigil API
//!
//! HTTP interface for querying incidents and exercising handlers.
//!
//! ```text
//! GET  /                      - Liveness
//! GET  /incidents             - Open incidents
//! GET  /stats                 - Configured handlers and uptime
//! POST /handlers/{name}/send  - Send a manual message through a handler
//! ```

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use routes::create_router;
pub use server::{ApiConfig, ApiServer};
pub use state::AppState;
