//! chai-core library.
//!
//! Core data structures and lifecycle operations for the chai task
//! assistant: the task model with recurrence rules, the file-backed
//! store, and the manager that owns lookup, filtering, and completion.
//!
//! # Conventions
//!
//! - **Errors**: typed [`CoreError`]/[`store::StoreError`] enums inside the
//!   core; `anyhow::Result` only at the config boundary.
//! - **Logging**: use `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod config;
pub mod error;
pub mod manager;
pub mod model;
pub mod store;

pub use error::{CoreError, ErrorCode};
pub use manager::TodoManager;
pub use model::recurrence::{Recurrence, Unit};
pub use model::todo::TodoItem;
pub use store::Store;
