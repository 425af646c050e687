//! In-memory tracker used by the reconciler's unit tests.

use std::sync::Mutex;

use chrono::{DateTime, Duration, TimeZone, Utc};

use super::{LabelSpec, RecordState, RepoRef, RunContext, TrackingRecord};
use crate::github::{IssuePatch, IssueQuery, IssueTracker, NewIssue, NewLabel, TrackerError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    AuthenticatedUser,
    ListIssues(IssueQuery),
    GetLabel(String),
    CreateLabel(NewLabel),
    CreateIssue(NewIssue),
    UpdateIssue(u64, IssuePatch),
}

pub struct MockTracker {
    issues: Mutex<Vec<TrackingRecord>>,
    calls: Mutex<Vec<Call>>,
    /// `None` means the label exists.
    pub label_status: Option<u16>,
    pub list_status: Option<u16>,
    pub create_issue_status: Option<u16>,
    pub update_status: Option<u16>,
}

fn api_error(method: &str, status: u16) -> TrackerError {
    TrackerError::Api {
        method: method.into(),
        url: "https://api.github.test/mock".into(),
        status,
        message: "mock failure".into(),
    }
}

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// A record created `age_minutes` before [`epoch`].
pub fn record(number: u64, state: RecordState, body: &str, age_minutes: i64) -> TrackingRecord {
    TrackingRecord {
        number,
        state,
        title: "Open Source Policy Issues".into(),
        body: body.into(),
        created_at: epoch() - Duration::minutes(age_minutes),
    }
}

pub fn context(run_number: u64) -> RunContext {
    RunContext {
        repo: RepoRef {
            owner: "a-repo-owner".into(),
            name: "a-repo".into(),
        },
        title: "Open Source Policy Issues".into(),
        label: LabelSpec::new("lintrack", "ff66ff").unwrap(),
        assignee: None,
        content: "Some markdown content here".into(),
        run_number,
        should_close: false,
        force_create: false,
    }
}

impl MockTracker {
    pub fn with_issues(issues: Vec<TrackingRecord>) -> Self {
        Self {
            issues: Mutex::new(issues),
            calls: Mutex::new(Vec::new()),
            label_status: None,
            list_status: None,
            create_issue_status: None,
            update_status: None,
        }
    }

    pub fn empty() -> Self {
        Self::with_issues(Vec::new())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that change tracker state.
    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| {
                matches!(
                    c,
                    Call::CreateLabel(_) | Call::CreateIssue(_) | Call::UpdateIssue(..)
                )
            })
            .collect()
    }

    pub fn issue(&self, number: u64) -> Option<TrackingRecord> {
        self.issues
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.number == number)
            .cloned()
    }

    fn record_call(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl IssueTracker for MockTracker {
    async fn authenticated_user(&self) -> Result<String, TrackerError> {
        self.record_call(Call::AuthenticatedUser);
        Ok("lintrack-bot".into())
    }

    async fn list_issues(
        &self,
        _repo: &RepoRef,
        query: &IssueQuery,
    ) -> Result<Vec<TrackingRecord>, TrackerError> {
        self.record_call(Call::ListIssues(query.clone()));
        if let Some(status) = self.list_status {
            return Err(api_error("GET", status));
        }
        let mut issues = self.issues.lock().unwrap().clone();
        issues.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(issues)
    }

    async fn get_label(&self, _repo: &RepoRef, name: &str) -> Result<(), TrackerError> {
        self.record_call(Call::GetLabel(name.into()));
        match self.label_status {
            Some(status) => Err(api_error("GET", status)),
            None => Ok(()),
        }
    }

    async fn create_label(&self, _repo: &RepoRef, label: &NewLabel) -> Result<(), TrackerError> {
        self.record_call(Call::CreateLabel(label.clone()));
        Ok(())
    }

    async fn create_issue(
        &self,
        _repo: &RepoRef,
        issue: &NewIssue,
    ) -> Result<TrackingRecord, TrackerError> {
        self.record_call(Call::CreateIssue(issue.clone()));
        if let Some(status) = self.create_issue_status {
            return Err(api_error("POST", status));
        }
        let mut issues = self.issues.lock().unwrap();
        let number = issues.iter().map(|r| r.number).max().unwrap_or(0) + 1;
        let created = TrackingRecord {
            number,
            state: RecordState::Open,
            title: issue.title.clone(),
            body: issue.body.clone(),
            created_at: epoch() + Duration::minutes(number as i64),
        };
        issues.push(created.clone());
        Ok(created)
    }

    async fn update_issue(
        &self,
        _repo: &RepoRef,
        number: u64,
        patch: &IssuePatch,
    ) -> Result<TrackingRecord, TrackerError> {
        self.record_call(Call::UpdateIssue(number, patch.clone()));
        if let Some(status) = self.update_status {
            return Err(api_error("PATCH", status));
        }
        let mut issues = self.issues.lock().unwrap();
        let issue = issues
            .iter_mut()
            .find(|r| r.number == number)
            .ok_or_else(|| api_error("PATCH", 404))?;
        issue.body = patch.body.clone();
        if let Some(state) = patch.state {
            issue.state = state;
        }
        Ok(issue.clone())
    }
}
