// action-ledger-rs/src/lib.rs
// Append-only audit ledger for the vacation planner.
//
// Every planning request leaves exactly one record, whatever its outcome:
//
// - Append-only on disk, one length-prefixed frame per record
// - Records are encrypted at rest (AES-256-GCM)
// - Each frame participates in a SHA-256 hash chain for tamper detection
// - Queryable by request id after the fact

mod config;
mod error;
mod ledger;
mod memory;

use shared_types_rs::{AuditRecord, PlanResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use config::ActionLedgerConfig;
pub use error::LedgerError;
pub use ledger::ActionLedger;
pub use memory::MemoryLedger;

/// One appended ledger entry: the audit record plus, when available,
/// the full plan result as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub record: AuditRecord,
    pub plan_json: Option<String>,
}

impl AuditEntry {
    pub fn new(record: AuditRecord, plan: Option<&PlanResult>) -> Result<Self, LedgerError> {
        let plan_json = plan.map(serde_json::to_string).transpose()?;
        Ok(Self { record, plan_json })
    }

    pub fn request_id(&self) -> Uuid {
        self.record.request_id
    }

    /// Decode the stored plan result, if one was recorded.
    pub fn plan(&self) -> Result<Option<PlanResult>, LedgerError> {
        self.plan_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(LedgerError::from)
    }
}

/// Destination for audit entries. Appends are atomic per entry and
/// never rewrite earlier entries.
pub trait AuditSink: Send + Sync {
    fn append(&self, entry: &AuditEntry) -> Result<(), LedgerError>;

    /// All entries recorded for `request_id`, in append order.
    fn find(&self, request_id: Uuid) -> Result<Vec<AuditEntry>, LedgerError> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|entry| entry.request_id() == request_id)
            .collect())
    }

    fn records(&self) -> Result<Vec<AuditEntry>, LedgerError>;
}
