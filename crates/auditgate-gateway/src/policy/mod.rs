//! Policy layer (consumer access control).
//!
//! Compiles the configured ACL into per-consumer rule lists that the
//! interceptor consults on every call.

pub mod acl;

pub use acl::{AccessPolicy, AccessRule};
