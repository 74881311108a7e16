//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;

use auditgate_core::error::{AuditError, Result};

pub use schema::{BusSection, GatewayConfig, GatewaySection};

pub const CONFIG_PATH_ENV: &str = "AUDITGATE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "auditgate.yaml";

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| AuditError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| AuditError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Path from `AUDITGATE_CONFIG`, falling back to `auditgate.yaml`.
pub fn config_path() -> String {
    std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}
