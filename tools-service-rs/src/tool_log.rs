//! Tool Log
//!
//! Shared record of the tool calls one run has started and the results that
//! came back. The tool manager writes to it as each call finishes, so a run
//! that is cut off mid-fetch can still account for every attempted call.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use shared_types_rs::{ToolErrorKind, ToolName, ToolResult};

#[derive(Debug, Default)]
struct LogState {
    started: Vec<(ToolName, Instant)>,
    finished: Vec<ToolResult>,
}

impl LogState {
    fn is_pending(&self, tool: ToolName) -> bool {
        !self.finished.iter().any(|r| r.tool == tool)
    }
}

/// Cloneable handle; all clones share one log.
#[derive(Debug, Clone, Default)]
pub struct ToolLog {
    state: Arc<Mutex<LogState>>,
}

impl ToolLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, LogState> {
        // A panic while holding the lock leaves the vectors consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn start(&self, tool: ToolName) {
        self.state().started.push((tool, Instant::now()));
    }

    pub(crate) fn finish(&self, result: ToolResult) {
        self.state().finished.push(result);
    }

    /// Tools that were started and have not reported yet.
    pub fn pending(&self) -> Vec<ToolName> {
        let state = self.state();
        state
            .started
            .iter()
            .map(|(tool, _)| *tool)
            .filter(|tool| state.is_pending(*tool))
            .collect()
    }

    /// Results received so far, in tool order.
    pub fn results(&self) -> Vec<ToolResult> {
        let mut results = self.state().finished.clone();
        results.sort_by_key(|r| r.tool);
        results
    }

    /// Settle every pending call with an error of `kind`, then return all
    /// results in tool order. Calling it again adds nothing.
    pub fn close(&self, kind: ToolErrorKind, message: &str) -> Vec<ToolResult> {
        {
            let mut state = self.state();
            let unanswered: Vec<ToolResult> = state
                .started
                .iter()
                .filter(|(tool, _)| state.is_pending(*tool))
                .map(|(tool, since)| ToolResult::error(*tool, since.elapsed().as_millis() as u64, kind, message))
                .collect();
            state.finished.extend(unanswered);
        }
        self.results()
    }
}
