use serde::Serialize;
use tracing::{debug, info};

use super::RunContext;
use super::decision::{Decision, SkipReason, decide};
use super::locator::IssueLocator;
use super::writer::{IssueDraft, IssueWriter};
use crate::error::ReconcileError;
use crate::github::IssueTracker;

/// What a reconciliation did to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Created,
    /// Closed issue `closed`, then opened a new one.
    ClosedAndCreated { closed: u64 },
    Updated,
    Closed,
    Skipped(SkipReason),
}

/// Outcome of one reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub action: Action,
    /// Issue that now reflects this run; `None` when nothing was written.
    pub number: Option<u64>,
}

impl Reconciliation {
    fn skipped(reason: SkipReason) -> Self {
        Self {
            action: Action::Skipped(reason),
            number: None,
        }
    }
}

/// Converges the tracker onto one up-to-date tracking issue per job.
pub struct Reconciler<'a, T> {
    tracker: &'a T,
}

impl<'a, T: IssueTracker> Reconciler<'a, T> {
    pub fn new(tracker: &'a T) -> Self {
        Self { tracker }
    }

    /// Locate the current tracking issue, decide, and apply at most one mutation
    /// (two when an open issue is replaced).
    pub async fn reconcile(
        &self,
        ctx: &RunContext,
        creator: &str,
    ) -> Result<Reconciliation, ReconcileError> {
        ctx.validate()?;

        let lookup = IssueLocator::new(self.tracker)
            .locate(&ctx.repo, creator, &ctx.label.name)
            .await?;
        let decision = decide(lookup.record.as_ref(), ctx);
        debug!(?decision, run = ctx.run_number, "reconciliation decision");

        let writer = IssueWriter::new(self.tracker, &ctx.repo);
        let draft = IssueDraft {
            label: &ctx.label,
            title: &ctx.title,
            content: &ctx.content,
            run_number: ctx.run_number,
            assignee: ctx.assignee.as_deref(),
        };

        let outcome = match decision {
            Decision::Skip(reason) => {
                info!(%reason, "leaving tracking issue unchanged");
                Reconciliation::skipped(reason)
            }
            Decision::Create => {
                let created = writer.create(&draft).await?;
                info!(number = created.number, "created issue #{}", created.number);
                Reconciliation {
                    action: Action::Created,
                    number: Some(created.number),
                }
            }
            Decision::CloseThenCreate { close } => {
                writer
                    .update(close, ctx.run_number, &ctx.content, true)
                    .await?;
                info!(number = close, "closed issue #{close}");
                let created = writer.create(&draft).await?;
                info!(number = created.number, "created issue #{}", created.number);
                Reconciliation {
                    action: Action::ClosedAndCreated { closed: close },
                    number: Some(created.number),
                }
            }
            Decision::Update { number, close } => {
                let updated = writer
                    .update(number, ctx.run_number, &ctx.content, close)
                    .await?;
                let action = if close {
                    info!(number = updated.number, "closed issue #{}", updated.number);
                    Action::Closed
                } else {
                    info!(number = updated.number, "updated issue #{}", updated.number);
                    Action::Updated
                };
                Reconciliation {
                    action,
                    number: Some(updated.number),
                }
            }
        };
        Ok(outcome)
    }
}

/// Reconcile and return only the number of the issue that reflects this run.
pub async fn reconcile<T: IssueTracker>(
    tracker: &T,
    ctx: &RunContext,
    creator: &str,
) -> Result<Option<u64>, ReconcileError> {
    Ok(Reconciler::new(tracker).reconcile(ctx, creator).await?.number)
}
