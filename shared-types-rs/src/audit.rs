// shared-types-rs/src/audit.rs
// Per-request audit record: stage timings, tool usage and final status.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::plan::PlanStatus;
use crate::tools::ToolName;

/// Pipeline states, in transition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Received,
    Extracting,
    Validating,
    Deciding,
    FetchingTools,
    Generating,
    Recording,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::Extracting => "extracting",
            Stage::Validating => "validating",
            Stage::Deciding => "deciding",
            Stage::FetchingTools => "fetching_tools",
            Stage::Generating => "generating",
            Stage::Recording => "recording",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry and exit time of one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTiming {
    pub entered_at: DateTime<Utc>,
    pub exited_at: DateTime<Utc>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolUsage {
    pub tool: ToolName,
    /// "ok" or the tool error kind.
    pub outcome: String,
    pub latency_ms: u64,
}

/// Written exactly once per request, on every path; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub request_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    /// Redacted and truncated request text.
    pub query_preview: String,
    pub stage_timings: BTreeMap<Stage, StageTiming>,
    pub tool_usage: Vec<ToolUsage>,
    pub final_status: PlanStatus,
    pub error_detail: Option<String>,
}

impl AuditRecord {
    /// Stage name to duration, in pipeline order.
    pub fn stage_durations(&self) -> Vec<(&'static str, u64)> {
        self.stage_timings
            .iter()
            .map(|(stage, timing)| (stage.as_str(), timing.duration_ms))
            .collect()
    }
}
