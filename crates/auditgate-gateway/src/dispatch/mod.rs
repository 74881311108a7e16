//! Dispatcher module exports.
//!
//! Routes admitted unary calls to the registered business services.

pub mod dispatcher;

pub use dispatcher::{Dispatcher, UnaryService};
