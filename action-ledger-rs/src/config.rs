use std::path::PathBuf;

use shared_types_rs::config::AuditConfig;

use crate::error::LedgerError;

/// Ledger location and encryption key.
#[derive(Debug, Clone)]
pub struct ActionLedgerConfig {
    /// Path to the underlying append-only file.
    pub path: PathBuf,
    /// Raw 32-byte encryption key.
    pub key: [u8; 32],
}

impl ActionLedgerConfig {
    pub fn new(path: impl Into<PathBuf>, key: [u8; 32]) -> Self {
        Self {
            path: path.into(),
            key,
        }
    }

    /// Falls back to a fixed development key when no key is configured.
    /// A malformed key is an error rather than a silent fallback.
    pub fn from_audit_config(config: &AuditConfig) -> Result<Self, LedgerError> {
        let key = match config.key_hex.as_deref() {
            Some(hex) => decode_hex_32(hex)?,
            None => {
                log::warn!("audit ledger key not set; using insecure development key");
                insecure_dev_key()
            }
        };

        Ok(Self::new(config.ledger_path.clone(), key))
    }
}

fn insecure_dev_key() -> [u8; 32] {
    [0x42; 32]
}

pub(crate) fn decode_hex_32(s: &str) -> Result<[u8; 32], LedgerError> {
    let s = s.trim();
    if s.len() != 64 || !s.is_ascii() {
        return Err(LedgerError::InvalidKey(format!(
            "expected 64 hex characters, got {}",
            s.len()
        )));
    }

    let mut out = [0u8; 32];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
            .map_err(|e| LedgerError::InvalidKey(e.to_string()))?;
    }
    Ok(out)
}
