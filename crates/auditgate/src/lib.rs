//! Top-level facade crate for auditgate.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use auditgate_core::*;
}

pub mod gateway {
    pub use auditgate_gateway::*;
}
