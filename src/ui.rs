//! Terminal output: colored one-line summaries, or JSON with `--json`.

use console::Style;
use serde::Serialize;

use crate::error::ReconcileError;
use crate::github::TrackerError;
use crate::reconcile::{Action, Reconciliation, RepoRef, TrackingRecord, provenance};

/// Machine-readable result of `lintrack sync`.
#[derive(Debug, Serialize)]
pub struct SyncReport<'a> {
    pub repository: String,
    pub run_number: u64,
    #[serde(flatten)]
    pub result: &'a Reconciliation,
}

/// Machine-readable result of `lintrack find`.
#[derive(Debug, Serialize)]
pub struct FindReport<'a> {
    pub repository: String,
    pub issue: Option<&'a TrackingRecord>,
    pub recorded_run: Option<u64>,
    pub open_candidates: &'a [u64],
}

pub struct Printer {
    json: bool,
    green: Style,
    red: Style,
    yellow: Style,
    dim: Style,
}

impl Printer {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            dim: Style::new().dim(),
        }
    }

    pub fn sync(&self, repo: &RepoRef, run_number: u64, result: &Reconciliation) {
        if self.json {
            print_json(&SyncReport {
                repository: repo.to_string(),
                run_number,
                result,
            });
            return;
        }
        let mark = match result.action {
            Action::Skipped(_) => self.yellow.apply_to("•"),
            _ => self.green.apply_to("✓"),
        };
        println!("  {mark} {}", summary(result));
    }

    pub fn find(&self, repo: &RepoRef, issue: Option<&TrackingRecord>, open_candidates: &[u64]) {
        let recorded_run = issue.and_then(|i| provenance::decode(&i.body));
        if self.json {
            print_json(&FindReport {
                repository: repo.to_string(),
                issue,
                recorded_run,
                open_candidates,
            });
            return;
        }
        let Some(issue) = issue else {
            println!("  {} No tracking issue in {repo}", self.yellow.apply_to("•"));
            return;
        };
        let run = recorded_run.map_or_else(|| "unknown".to_string(), |n| n.to_string());
        println!(
            "  #{} [{}] {} {}",
            issue.number,
            issue.state,
            issue.title,
            self.dim.apply_to(format!("(run {run}, created {})", issue.created_at))
        );
        if open_candidates.len() > 1 {
            let list: Vec<String> = open_candidates.iter().map(|n| format!("#{n}")).collect();
            println!(
                "  {} Multiple open tracking issues: {}",
                self.yellow.apply_to("!"),
                list.join(", ")
            );
        }
    }

    /// Error summary on stderr, with the failing request when there was one.
    pub fn error(&self, err: &anyhow::Error) {
        eprintln!("  {} {err:#}", self.red.apply_to("✗"));
        let transport = err
            .downcast_ref::<ReconcileError>()
            .and_then(ReconcileError::transport)
            .or_else(|| err.downcast_ref::<TrackerError>());
        let request = transport.and_then(TrackerError::request_line);
        if let Some(request) = request {
            eprintln!("    {}", self.dim.apply_to(request));
        }
    }
}

/// One-line description of what a sync did.
fn summary(result: &Reconciliation) -> String {
    let issue = match result.number {
        Some(n) => format!("issue #{n}"),
        None => "the tracking issue".to_string(),
    };
    match result.action {
        Action::Skipped(reason) => format!("No change: {reason}"),
        Action::Created => format!("Created {issue}"),
        Action::ClosedAndCreated { closed } => {
            format!("Closed issue #{closed} and created {issue}")
        }
        Action::Updated => format!("Updated {issue}"),
        Action::Closed => format!("Closed {issue}"),
    }
}

fn print_json<T: Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}
