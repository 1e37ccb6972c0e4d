// orchestrator-service-rs/src/pipeline.rs
// Orchestrator state machine:
//
//   Received -> Extracting -> Validating -> Deciding -> FetchingTools
//            -> Generating -> Recording -> Done(status)
//
// Fatal failures (request text, extraction, validation, generation,
// cancellation, deadline) jump straight to Recording with status Failed.
// Tool failures only downgrade the status to PartialSuccess. Every run ends
// with one audit entry and one metrics update.

use std::sync::Arc;
use std::time::Duration;

use action_ledger::{ActionLedger, ActionLedgerConfig, AuditEntry, AuditSink};
use input_validation_rs::{validate_request_text, validate_trip_intent};
use llm_service_rs::{ModelGateway, OllamaGateway};
use log::{debug, error, info, warn};
use serde_json::Value;
use shared_types_rs::{
    AuditRecord, ItineraryDay, PlanRequest, PlanResponse, PlanResult, PlanStatus, PlannerConfig, RawRequest, Stage,
    ToolDecision, ToolErrorKind, ToolUsage, TripIntent,
};
use telemetrist::{preview, MetricsSink, DEFAULT_PREVIEW_CHARS};
use tokio_util::sync::CancellationToken;
use tools_service_rs::{ToolLog, ToolManager};

use crate::decision::DecisionEngine;
use crate::error::OrchestrationError;
use crate::itinerary::ItineraryGenerator;
use crate::prompts::extraction_prompt;
use crate::timings::StageClock;

/// Longest wait for the audit append before the run returns anyway.
const AUDIT_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub model_timeout: Duration,
    pub request_deadline: Duration,
    pub min_request_chars: usize,
    pub max_request_chars: usize,
}

impl PipelineSettings {
    pub fn from_config(config: &PlannerConfig) -> Self {
        Self {
            model_timeout: config.model.timeout(),
            request_deadline: config.pipeline.request_deadline(),
            min_request_chars: config.pipeline.min_request_chars,
            max_request_chars: config.pipeline.max_request_chars,
        }
    }
}

/// Per-run state, filled in as stages complete.
#[derive(Default)]
struct Run {
    clock: StageClock,
    intent: Option<TripIntent>,
    decision: Option<ToolDecision>,
    tool_log: ToolLog,
    itinerary: Vec<ItineraryDay>,
}

/// The planning pipeline. Audit and metrics sinks are injected; they are the
/// only state shared between requests.
pub struct Orchestrator {
    gateway: Arc<dyn ModelGateway>,
    tools: ToolManager,
    decision_engine: DecisionEngine,
    generator: ItineraryGenerator,
    audit: Arc<dyn AuditSink>,
    metrics: Arc<MetricsSink>,
    settings: PipelineSettings,
}

impl Orchestrator {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        tools: ToolManager,
        audit: Arc<dyn AuditSink>,
        metrics: Arc<MetricsSink>,
        config: &PlannerConfig,
    ) -> Self {
        let settings = PipelineSettings::from_config(config);
        Self {
            generator: ItineraryGenerator::new(Arc::clone(&gateway), settings.model_timeout),
            decision_engine: DecisionEngine::from_config(&config.pipeline),
            gateway,
            tools,
            audit,
            metrics,
            settings,
        }
    }

    /// Wire the Ollama gateway, the HTTP tools, the file ledger and a fresh
    /// metrics sink from configuration.
    pub fn from_config(config: &PlannerConfig) -> Result<Self, OrchestrationError> {
        let gateway: Arc<dyn ModelGateway> = Arc::new(OllamaGateway::from_config(&config.model)?);
        let tools = ToolManager::from_config(&config.tools)?;
        let ledger = ActionLedger::open(ActionLedgerConfig::from_audit_config(&config.audit)?)?;
        let metrics = MetricsSink::new()?;

        info!(
            "Orchestrator ready: model {} at {}, ledger {}",
            config.model.model,
            config.model.base_url,
            ledger.path().display()
        );

        Ok(Self::new(gateway, tools, Arc::new(ledger), Arc::new(metrics), config))
    }

    pub fn audit(&self) -> &Arc<dyn AuditSink> {
        &self.audit
    }

    pub fn metrics(&self) -> &MetricsSink {
        &self.metrics
    }

    /// Transport-facing entry point.
    pub async fn plan(&self, request: PlanRequest) -> PlanResponse {
        let result = self.run(request, CancellationToken::new()).await;
        PlanResponse::from(&result)
    }

    /// Run one request to its terminal state. Never fails: every failure is
    /// folded into the returned status and the audit entry.
    pub async fn run(&self, request: PlanRequest, cancel: CancellationToken) -> PlanResult {
        let raw = RawRequest::new(request.request_id, request.request);
        let mut run = Run::default();
        run.clock.enter(Stage::Received);
        debug!("Request {} received", raw.request_id);

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(OrchestrationError::Cancelled),
            _ = tokio::time::sleep(self.settings.request_deadline) => Err(OrchestrationError::DeadlineExceeded),
            outcome = self.drive(&raw, &mut run) => outcome,
        };

        self.finish(&raw, run, outcome).await
    }

    fn enter(&self, raw: &RawRequest, run: &mut Run, stage: Stage) {
        debug!("Request {} entering {}", raw.request_id, stage);
        run.clock.enter(stage);
    }

    async fn drive(&self, raw: &RawRequest, run: &mut Run) -> Result<(), OrchestrationError> {
        let anchor = raw.received_at.date_naive();
        let text = validate_request_text(
            &raw.text,
            self.settings.min_request_chars,
            self.settings.max_request_chars,
        )?;

        self.enter(raw, run, Stage::Extracting);
        let reply = self
            .gateway
            .complete(&extraction_prompt(&text, anchor), self.settings.model_timeout)
            .await?;

        self.enter(raw, run, Stage::Validating);
        let intent = validate_trip_intent(&Value::String(reply), anchor)?;
        info!(
            "Request {}: {} days in {}",
            raw.request_id, intent.duration_days, intent.destination
        );
        run.intent = Some(intent.clone());

        self.enter(raw, run, Stage::Deciding);
        let decision = self.decision_engine.decide(&intent);
        debug!("Request {} decision: {:?}", raw.request_id, decision.reasons);
        run.decision = Some(decision.clone());

        self.enter(raw, run, Stage::FetchingTools);
        let tool_results = self
            .tools
            .execute_logged(&decision, &intent, anchor, &run.tool_log)
            .await;

        self.enter(raw, run, Stage::Generating);
        let itinerary = self.generator.generate(&intent, &tool_results).await?;
        run.itinerary = itinerary;

        Ok(())
    }

    async fn finish(&self, raw: &RawRequest, mut run: Run, outcome: Result<(), OrchestrationError>) -> PlanResult {
        let failed_stage = run.clock.current().unwrap_or(Stage::Received);
        run.clock.enter(Stage::Recording);

        // Calls still in flight when the run was cut off get an error result.
        let tool_results = match &outcome {
            Err(OrchestrationError::DeadlineExceeded) => {
                run.tool_log.close(ToolErrorKind::Timeout, "request deadline exceeded")
            }
            _ => run.tool_log.close(ToolErrorKind::Cancelled, "run cancelled"),
        };

        let tool_failures: Vec<String> = tool_results
            .iter()
            .filter(|r| r.is_error())
            .map(|r| format!("{} ({})", r.tool, r.outcome_label()))
            .collect();

        let (status, error, error_detail) = match outcome {
            Ok(()) if tool_failures.is_empty() => (PlanStatus::Success, None, None),
            Ok(()) => (
                PlanStatus::PartialSuccess,
                None,
                Some(format!("tool failures: {}", tool_failures.join(", "))),
            ),
            Err(e) => {
                warn!("Request {} failed at {}: {}", raw.request_id, failed_stage, e);
                let mut detail = format!("{}: {}", failed_stage, e);
                if !tool_failures.is_empty() {
                    detail.push_str(&format!("; tool failures: {}", tool_failures.join(", ")));
                }
                run.itinerary.clear();
                (PlanStatus::Failed, Some(e.to_string()), Some(detail))
            }
        };

        let tool_usage = tool_results
            .iter()
            .map(|r| ToolUsage {
                tool: r.tool,
                outcome: r.outcome_label().to_string(),
                latency_ms: r.latency_ms,
            })
            .collect();

        let result = PlanResult {
            request_id: raw.request_id,
            trip_intent: run.intent,
            decision: run.decision,
            tool_results,
            itinerary: run.itinerary,
            status,
            error,
        };

        // Recording covers assembling the record; the append runs after the clock stops.
        run.clock.enter(Stage::Done);
        let record = AuditRecord {
            request_id: raw.request_id,
            recorded_at: chrono::Utc::now(),
            query_preview: preview(&raw.text, DEFAULT_PREVIEW_CHARS),
            stage_timings: run.clock.into_timings(),
            tool_usage,
            final_status: status,
            error_detail,
        };

        self.metrics.record_run(&record);
        self.record(&result, record).await;

        info!(
            "Request {} finished: {}{}",
            raw.request_id,
            status,
            result.error.as_deref().map(|e| format!(" ({})", e)).unwrap_or_default()
        );
        result
    }

    /// Best-effort append: a slow or failing ledger is logged, never awaited
    /// past `AUDIT_FLUSH_TIMEOUT`.
    async fn record(&self, result: &PlanResult, record: AuditRecord) {
        let request_id = record.request_id;
        let entry = match AuditEntry::new(record.clone(), Some(result)) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Plan for request {} not stored with its audit record: {}", request_id, e);
                AuditEntry {
                    record,
                    plan_json: None,
                }
            }
        };

        let sink = Arc::clone(&self.audit);
        let append = tokio::task::spawn_blocking(move || sink.append(&entry));

        match tokio::time::timeout(AUDIT_FLUSH_TIMEOUT, append).await {
            Ok(Ok(Ok(()))) => debug!("Audit record written for request {}", request_id),
            Ok(Ok(Err(e))) => error!("Audit append failed for request {}: {}", request_id, e),
            Ok(Err(e)) => error!("Audit task for request {} aborted: {}", request_id, e),
            Err(_) => warn!(
                "Audit append for request {} still pending after {:?}",
                request_id, AUDIT_FLUSH_TIMEOUT
            ),
        }
    }
}
