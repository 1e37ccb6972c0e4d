use std::sync::Mutex;

use crate::error::LedgerError;
use crate::{AuditEntry, AuditSink};

/// In-process ledger used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemoryLedger {
    fn append(&self, entry: &AuditEntry) -> Result<(), LedgerError> {
        self.entries
            .lock()
            .map_err(|_| LedgerError::Poisoned)?
            .push(entry.clone());
        Ok(())
    }

    fn records(&self) -> Result<Vec<AuditEntry>, LedgerError> {
        Ok(self.entries.lock().map_err(|_| LedgerError::Poisoned)?.clone())
    }
}
