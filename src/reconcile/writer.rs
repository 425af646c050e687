use tracing::debug;

use super::{LabelSpec, RecordState, RepoRef, TrackingRecord, provenance};
use crate::error::ReconcileError;
use crate::github::{IssuePatch, IssueTracker, NewIssue, NewLabel, TrackerError};

/// Everything needed to open a new tracking issue.
#[derive(Debug, Clone, Copy)]
pub struct IssueDraft<'a> {
    pub label: &'a LabelSpec,
    pub title: &'a str,
    pub content: &'a str,
    pub run_number: u64,
    pub assignee: Option<&'a str>,
}

/// Applies the two mutations the reconciler is allowed to make.
pub struct IssueWriter<'a, T> {
    tracker: &'a T,
    repo: &'a RepoRef,
}

impl<'a, T: IssueTracker> IssueWriter<'a, T> {
    pub fn new(tracker: &'a T, repo: &'a RepoRef) -> Self {
        Self { tracker, repo }
    }

    /// Create `label` unless it already exists. An existing label is never recolored.
    pub async fn ensure_label(&self, label: &LabelSpec) -> Result<(), ReconcileError> {
        match self.tracker.get_label(self.repo, &label.name).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                debug!(label = %label.name, color = %label.color, "creating label");
                let new_label = NewLabel {
                    name: label.name.clone(),
                    color: label.color.clone(),
                };
                self.tracker.create_label(self.repo, &new_label).await?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Open a new issue whose body is the content followed by the run marker.
    pub async fn create(&self, draft: &IssueDraft<'_>) -> Result<TrackingRecord, ReconcileError> {
        self.ensure_label(draft.label).await?;

        let issue = NewIssue {
            title: draft.title.to_string(),
            body: provenance::stamp(draft.content, draft.run_number),
            labels: vec![draft.label.name.clone()],
            assignees: draft.assignee.map(|a| vec![a.to_string()]),
        };
        debug!(title = %issue.title, "creating issue");
        let created = self
            .tracker
            .create_issue(self.repo, &issue)
            .await
            .map_err(|e| self.creation_error(e))?;
        debug!(number = created.number, "created issue");
        Ok(created)
    }

    /// Rewrite the body of issue `number` and optionally close it.
    ///
    /// The body is replaced even when closing, so the final snapshot carries
    /// the latest content and run marker. State is never set to open.
    pub async fn update(
        &self,
        number: u64,
        run_number: u64,
        content: &str,
        close: bool,
    ) -> Result<TrackingRecord, ReconcileError> {
        debug!(number, close, "updating issue");
        let patch = IssuePatch {
            body: provenance::stamp(content, run_number),
            state: close.then_some(RecordState::Closed),
        };
        Ok(self.tracker.update_issue(self.repo, number, &patch).await?)
    }

    fn creation_error(&self, err: TrackerError) -> ReconcileError {
        let status = match &err {
            TrackerError::Api { status, .. } => Some(*status),
            _ => None,
        };
        let repo = self.repo.clone();
        match status {
            Some(403) => ReconcileError::PermissionDenied { repo, source: err },
            Some(410) => ReconcileError::IssuesDisabled { repo, source: err },
            Some(404) => ReconcileError::RepositoryNotFound { repo, source: err },
            Some(422) => ReconcileError::InvalidIssue { repo, source: err },
            _ => ReconcileError::Tracker(err),
        }
    }
}
