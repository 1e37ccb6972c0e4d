//! Metrics sink
//!
//! Owns its own Prometheus recorder instead of installing a global one, so
//! the orchestrator receives it as an injected capability and tests can run
//! isolated sinks side by side. Counters and histograms are atomic; concurrent
//! requests never lose increments.

use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use shared_types_rs::{AuditRecord, PlanStatus, Stage, ToolUsage};

use crate::error::TelemetryError;

pub const REQUESTS_TOTAL: &str = "requests_total";
pub const TOOL_ERRORS_TOTAL: &str = "tool_errors_total";
pub const TOOL_CALLS_TOTAL: &str = "tool_calls_total";
pub const STAGE_DURATION_SECONDS: &str = "stage_duration_seconds";

/// Histogram buckets for stage latencies, 5ms to 60s.
pub const STAGE_BUCKETS: [f64; 12] = [0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 10.0, 30.0, 60.0];

pub struct MetricsSink {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
}

impl MetricsSink {
    pub fn new() -> Result<Self, TelemetryError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(Matcher::Full(STAGE_DURATION_SECONDS.to_string()), &STAGE_BUCKETS)?
            .build_recorder();
        let handle = recorder.handle();

        let sink = Self { recorder, handle };
        sink.describe();
        Ok(sink)
    }

    fn describe(&self) {
        metrics::with_local_recorder(&self.recorder, || {
            describe_counter!(REQUESTS_TOTAL, "Planning requests by final status");
            describe_counter!(TOOL_ERRORS_TOTAL, "Failed tool calls by tool");
            describe_counter!(TOOL_CALLS_TOTAL, "Tool calls by tool and outcome");
            describe_histogram!(STAGE_DURATION_SECONDS, Unit::Seconds, "Time spent per pipeline stage");
        });
    }

    pub fn record_request(&self, status: PlanStatus) {
        metrics::with_local_recorder(&self.recorder, || {
            counter!(REQUESTS_TOTAL, "status" => status.as_str()).increment(1);
        });
    }

    pub fn record_tool_usage(&self, usage: &ToolUsage) {
        let tool = usage.tool.as_str();
        metrics::with_local_recorder(&self.recorder, || {
            counter!(TOOL_CALLS_TOTAL, "tool" => tool, "outcome" => usage.outcome.clone()).increment(1);
            if usage.outcome != "ok" {
                counter!(TOOL_ERRORS_TOTAL, "tool" => tool).increment(1);
            }
        });
    }

    pub fn record_stage(&self, stage: Stage, duration: Duration) {
        metrics::with_local_recorder(&self.recorder, || {
            histogram!(STAGE_DURATION_SECONDS, "stage" => stage.as_str()).record(duration.as_secs_f64());
        });
    }

    /// Records a finished run from its audit record: one request count,
    /// every stage duration and every tool outcome.
    pub fn record_run(&self, record: &AuditRecord) {
        self.record_request(record.final_status);
        for (stage, timing) in &record.stage_timings {
            self.record_stage(*stage, Duration::from_millis(timing.duration_ms));
        }
        for usage in &record.tool_usage {
            self.record_tool_usage(usage);
        }
        log::debug!(
            "metrics recorded for request {} ({})",
            record.request_id,
            record.final_status
        );
    }

    /// Prometheus text exposition of everything recorded so far.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}
