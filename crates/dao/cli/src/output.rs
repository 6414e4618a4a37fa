//! Output formatting utilities

use colored::*;
use dao_engine::{AssetRef, ProposalSnapshot};
use serde::Serialize;
use tabled::{Table, Tabled};

use crate::error::CliResult;
use crate::scenario::{Replay, StepReport};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table format
    #[default]
    Table,
    /// JSON format
    Json,
}

#[derive(Tabled)]
struct StepRow {
    #[tabled(rename = "#")]
    step: usize,
    op: &'static str,
    actor: String,
    proposal: String,
    expected: String,
    outcome: String,
    result: String,
}

impl From<&StepReport> for StepRow {
    fn from(report: &StepReport) -> Self {
        Self {
            step: report.step,
            op: report.op,
            actor: report.actor.to_string(),
            proposal: report
                .proposal
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
            expected: report.expected.clone(),
            outcome: report.outcome.clone(),
            result: if report.passed { "pass" } else { "FAIL" }.to_string(),
        }
    }
}

#[derive(Tabled)]
struct ProposalRow {
    id: u64,
    name: String,
    amount: String,
    recipient: String,
    #[tabled(rename = "for")]
    up_votes: String,
    #[tabled(rename = "against")]
    down_votes: String,
    status: String,
}

impl ProposalRow {
    fn new(snapshot: &ProposalSnapshot, treasury_asset: &AssetRef) -> Self {
        let p = &snapshot.proposal;
        Self {
            id: p.id.get(),
            name: p.name.clone(),
            amount: treasury_asset.format(p.amount),
            recipient: p.recipient.to_string(),
            up_votes: p.up_votes.to_string(),
            down_votes: p.down_votes.to_string(),
            status: format!("{:?}", snapshot.status),
        }
    }
}

/// Print a serializable value as pretty JSON
pub fn print_json<T: Serialize>(data: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Print a replay report in the specified format
pub fn print_replay(replay: &Replay, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(replay),
        OutputFormat::Table => {
            let steps: Vec<StepRow> = replay.steps.iter().map(StepRow::from).collect();
            println!("{}", Table::new(steps));

            if replay.proposals.is_empty() {
                println!("{}", "No proposals".dimmed());
            } else {
                let proposals: Vec<ProposalRow> = replay
                    .proposals
                    .iter()
                    .map(|p| ProposalRow::new(p, &replay.treasury_asset))
                    .collect();
                println!("{}", Table::new(proposals));
            }

            print_info(&format!(
                "Treasury balance: {}",
                replay.treasury_asset.format(replay.treasury_balance)
            ));
            if replay.passed() {
                print_success(&format!("{} steps matched expectations", replay.steps.len()));
            } else {
                print_error(&format!(
                    "{} of {} steps did not match expectations",
                    replay.failures(),
                    replay.steps.len()
                ));
            }
            Ok(())
        }
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}
