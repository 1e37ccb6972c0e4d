// orchestrator-service-rs/src/main.rs
// Command-line entry point for the vacation planner.

use std::io::Read;

use action_ledger::{ActionLedger, ActionLedgerConfig, AuditSink};
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use orchestrator::{CancellationToken, Orchestrator};
use serde_json::json;
use shared_types_rs::{PlanRequest, PlanResponse, PlannerConfig};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "orchestrator-service", about = "Plan a vacation from a free-text request")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Plan a trip. Without TEXT, reads a `{"request_id"?, "request"}` JSON body from stdin.
    Plan {
        /// Request text, e.g. "4 days in Barcelona in May, budget 800 EUR"
        text: Vec<String>,
        /// Use this request id instead of generating one
        #[arg(long)]
        request_id: Option<Uuid>,
        /// Print the metrics exposition after the plan
        #[arg(long)]
        metrics: bool,
    },
    /// Print the stored audit entries for a request
    Audit { request_id: Uuid },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = PlannerConfig::load().context("loading planner configuration")?;

    match cli.command {
        Commands::Plan {
            text,
            request_id,
            metrics,
        } => plan(&config, text, request_id, metrics).await,
        Commands::Audit { request_id } => audit(&config, request_id),
    }
}

async fn plan(config: &PlannerConfig, text: Vec<String>, request_id: Option<Uuid>, metrics: bool) -> anyhow::Result<()> {
    let request = if text.is_empty() {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .context("reading request from stdin")?;
        let mut request: PlanRequest = serde_json::from_str(&body).context("parsing request JSON")?;
        if request_id.is_some() {
            request.request_id = request_id;
        }
        request
    } else {
        PlanRequest {
            request_id,
            request: text.join(" "),
        }
    };

    let orchestrator = Orchestrator::from_config(config)?;

    // Ctrl-C stops the run; the audit entry is still flushed.
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cancelling request");
            on_interrupt.cancel();
        }
    });

    let result = orchestrator.run(request, cancel).await;
    println!("{}", serde_json::to_string_pretty(&PlanResponse::from(&result))?);

    if metrics {
        println!("{}", orchestrator.metrics().render());
    }
    Ok(())
}

fn audit(config: &PlannerConfig, request_id: Uuid) -> anyhow::Result<()> {
    let ledger = ActionLedger::open(ActionLedgerConfig::from_audit_config(&config.audit)?)?;
    let entries = ledger.find(request_id)?;
    if entries.is_empty() {
        bail!("no audit record for request {}", request_id);
    }

    for entry in entries {
        let plan = entry.plan()?;
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "record": entry.record,
                "plan": plan,
            }))?
        );
    }
    Ok(())
}
