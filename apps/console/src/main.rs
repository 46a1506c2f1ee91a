use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, CaseOrchestrator, HttpCaseGateway, MetricsAggregator, StatusService,
};
use shared::{domain::Decision, protocol::DecisionSubmission};

#[derive(Parser, Debug)]
#[command(about = "Console client for the PA case review backend")]
struct Cli {
    /// API root, e.g. http://127.0.0.1:8000/api
    #[arg(long)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all cases
    List,
    /// Show one case with its policy context
    Show { id: String },
    /// Run server-side processing for a pending case
    Process { id: String },
    /// Record the reviewer's final decision on a case
    Decide {
        id: String,
        /// approve, deny or pend
        #[arg(long)]
        decision: Decision,
        #[arg(long, default_value = "")]
        notes: String,
        #[arg(long, default_value = "")]
        provider_letter: String,
        #[arg(long, default_value = "")]
        member_letter: String,
    },
    /// Dashboard metrics plus the decided-cases view
    Metrics,
    /// Backend demo-mode status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(url) = cli.server_url {
        settings.server_url = url;
    }
    let gateway = Arc::new(HttpCaseGateway::new(settings.server_url));

    match cli.command {
        Command::List => {
            let orchestrator = CaseOrchestrator::new(gateway);
            orchestrator.fetch_cases().await;
            let state = orchestrator.snapshot();
            if let Some(error) = state.error {
                anyhow::bail!(error);
            }
            for case in &state.cases {
                let decision = case
                    .final_decision
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".into());
                println!(
                    "{}  {:<9}  {:<7}  {}",
                    case.id, case.status, decision, case.title
                );
            }
        }
        Command::Show { id } => {
            let orchestrator = CaseOrchestrator::new(gateway);
            orchestrator.fetch_case(&id).await;
            let state = orchestrator.snapshot();
            if let Some(error) = state.error {
                anyhow::bail!(error);
            }
            if let Some(case) = state.current_case {
                println!("{}", serde_json::to_string_pretty(&case)?);
            }
        }
        Command::Process { id } => {
            let orchestrator = CaseOrchestrator::new(gateway);
            let mut updates = orchestrator.subscribe();
            let run = orchestrator.process_case(&id);
            tokio::pin!(run);
            let mut last_step = String::new();
            loop {
                tokio::select! {
                    _ = &mut run => break,
                    changed = updates.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let step = updates.borrow_and_update().processing_step.clone();
                        if !step.is_empty() && step != last_step {
                            println!("{step}");
                            last_step = step;
                        }
                    }
                }
            }
            let state = orchestrator.snapshot();
            if let Some(error) = state.error {
                anyhow::bail!(error);
            }
            if let Some(case) = state.current_case {
                println!("case {} is now {}", case.id, case.status);
            }
        }
        Command::Decide {
            id,
            decision,
            notes,
            provider_letter,
            member_letter,
        } => {
            let orchestrator = CaseOrchestrator::new(gateway);
            let submission = DecisionSubmission {
                final_decision: decision,
                decision_notes: notes,
                provider_letter,
                member_letter,
            };
            if !orchestrator.submit_decision(&id, &submission).await {
                let state = orchestrator.snapshot();
                anyhow::bail!(state
                    .error
                    .unwrap_or_else(|| "Failed to submit decision".into()));
            }
            let state = orchestrator.snapshot();
            if let Some(case) = state.current_case {
                let decided_at = case.decided_at.as_deref().unwrap_or("-");
                println!("case {} decided at {}", case.id, decided_at);
            }
        }
        Command::Metrics => {
            let aggregator = MetricsAggregator::new(gateway);
            aggregator.fetch_metrics().await;
            let state = aggregator.snapshot();
            if let Some(error) = state.error {
                anyhow::bail!(error);
            }
            if let Some(metrics) = state.metrics {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            }
            println!("decided cases: {}", state.decided_cases.len());
            for case in &state.decided_cases {
                let decision = case
                    .final_decision
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".into());
                println!("  {}  {:<7}  {}", case.id, decision, case.title);
            }
        }
        Command::Status => {
            let service = StatusService::new(gateway);
            service.fetch_status().await;
            let state = service.snapshot();
            println!("demo_mode: {}", state.demo_mode);
        }
    }

    Ok(())
}
