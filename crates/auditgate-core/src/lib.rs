//! auditgate core: transport-agnostic audit records, statistics snapshots,
//! and the error surface shared by the gateway and its tooling.
//!
//! This crate intentionally carries no transport or runtime dependencies so it
//! can be reused by clients that consume the observation streams.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `AuditError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod event;

/// Shared result type.
pub use error::{AuditError, Result};
pub use event::{Event, StatSnapshot};
