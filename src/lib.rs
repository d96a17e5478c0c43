//! Library crate for sacco-admin.
//!
//! This crate exposes the building blocks of the back-office console:
//! - REST client, transports and auth calls (`api`)
//! - Application state, pages and the update loop (`app`)
//! - Settings and command-line arguments (`config`)
//! - Generic table, form and dialog state (`table`, `form`, `dialog`)
//! - Query cache and entity services (`query`, `resources`)
//! - Routing, session and notifications (`routes`, `session`, `notify`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `sacco-admin` binary and by tests.
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod app;
pub mod config;
pub mod dialog;
pub mod error;
pub mod form;
pub mod notify;
pub mod query;
pub mod resources;
pub mod routes;
pub mod session;
pub mod table;
pub mod ui;

/// Convenient error and result types shared across the crate.
pub use error::{ApiError, Result};
