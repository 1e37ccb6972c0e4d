//! Stage clock
//!
//! Tracks entry and exit of each pipeline stage for the audit record.
//! Entering a stage closes the previous one.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use shared_types_rs::{Stage, StageTiming};

#[derive(Debug, Default)]
pub struct StageClock {
    timings: BTreeMap<Stage, StageTiming>,
    current: Option<(Stage, DateTime<Utc>, Instant)>,
}

impl StageClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, stage: Stage) {
        self.exit();
        self.current = Some((stage, Utc::now(), Instant::now()));
    }

    /// Close the open stage, if any.
    pub fn exit(&mut self) {
        if let Some((stage, entered_at, started)) = self.current.take() {
            let exited_at = Utc::now();
            self.timings.insert(
                stage,
                StageTiming {
                    entered_at,
                    exited_at,
                    duration_ms: started.elapsed().as_millis() as u64,
                },
            );
        }
    }

    pub fn current(&self) -> Option<Stage> {
        self.current.as_ref().map(|(stage, _, _)| *stage)
    }

    pub fn timings(&self) -> &BTreeMap<Stage, StageTiming> {
        &self.timings
    }

    pub fn into_timings(mut self) -> BTreeMap<Stage, StageTiming> {
        self.exit();
        self.timings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entering_closes_previous_stage() {
        let mut clock = StageClock::new();
        clock.enter(Stage::Received);
        clock.enter(Stage::Extracting);

        assert_eq!(clock.current(), Some(Stage::Extracting));
        assert!(clock.timings().contains_key(&Stage::Received));
        assert!(!clock.timings().contains_key(&Stage::Extracting));

        let timings = clock.into_timings();
        let extracting = &timings[&Stage::Extracting];
        assert!(extracting.exited_at >= extracting.entered_at);
    }

    #[test]
    fn test_exit_without_open_stage_is_noop() {
        let mut clock = StageClock::new();
        clock.exit();
        assert!(clock.into_timings().is_empty());
    }
}
