//! Library crate for usertable.
//!
//! This crate exposes the building blocks of the TUI:
//! - Application state, configuration and update loop (`app`)
//! - Command-line interface and headless export (`cli`)
//! - Error and result types (`error`)
//! - CSV/PDF serializers and file delivery (`export`)
//! - Log file setup (`logging`)
//! - User record model (`model`)
//! - Remote fetch of the user list (`remote`)
//! - Filter/sort engine (`search`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `usertable` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod app;
pub mod cli;
pub mod error;
pub mod export;
pub mod logging;
pub mod model;
pub mod remote;
pub mod search;
pub mod ui;

// Re-export commonly used items at the crate root for convenience
/// Convenient error and result types shared across the crate.
pub use error::{DynError, Result};
pub use model::{UserField, UserRecord};
