//! auditgate gateway library entry.
//!
//! This crate wires the event bus, access policy, statistics aggregation,
//! call interception, and observation streams into one HTTP/WebSocket
//! service. It is consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod bus;
pub mod config;
pub mod dispatch;
pub mod intercept;
pub mod obs;
pub mod ops;
pub mod policy;
pub mod reporters;
pub mod router;
pub mod services;
pub mod stats;
pub mod transport;
