//! Request and response bodies for the GitHub issues and labels endpoints.
//!
//! Only the fields the reconciler reads or writes are modelled; serde ignores
//! the rest of GitHub's (large) payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reconcile::{RecordState, TrackingRecord};

/// Filter for the issue listing used by the locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueQuery {
    /// Only issues opened by this login.
    pub creator: String,
    /// Only issues carrying this label.
    pub label: String,
}

/// Body of `POST /repos/{owner}/{repo}/issues`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
}

/// Body of `PATCH /repos/{owner}/{repo}/issues/{number}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuePatch {
    pub body: String,
    /// Only ever `Some(Closed)`: the reconciler never reopens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<RecordState>,
}

/// Body of `POST /repos/{owner}/{repo}/labels`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLabel {
    pub name: String,
    pub color: String,
}

/// An issue as returned by the list, create and update endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueResponse {
    pub number: u64,
    pub state: RecordState,
    #[serde(default)]
    pub title: String,
    /// GitHub sends `null` for issues created without a body.
    #[serde(default)]
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Present only when the "issue" is really a pull request.
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl IssueResponse {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

impl From<IssueResponse> for TrackingRecord {
    fn from(issue: IssueResponse) -> Self {
        TrackingRecord {
            number: issue.number,
            state: issue.state,
            title: issue.title,
            body: issue.body.unwrap_or_default(),
            created_at: issue.created_at,
        }
    }
}

/// Minimal view of `GET /user`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticatedUser {
    pub login: String,
}

/// Error payload GitHub attaches to 4xx/5xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_issue_omits_missing_assignees() {
        let issue = NewIssue {
            title: "Open Source Policy Issues".into(),
            body: "content".into(),
            labels: vec!["lintrack".into()],
            assignees: None,
        };
        let json = serde_json::to_value(&issue).unwrap();
        assert!(json.get("assignees").is_none());
        assert_eq!(json["labels"][0], "lintrack");
    }

    #[test]
    fn patch_serializes_closed_state_in_lowercase() {
        let patch = IssuePatch {
            body: "b".into(),
            state: Some(RecordState::Closed),
        };
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"body":"b","state":"closed"}"#);

        let patch = IssuePatch {
            body: "b".into(),
            state: None,
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"body":"b"}"#);
    }

    #[test]
    fn issue_response_deserialize_from_api_format() {
        let api_json = r#"{
            "id": 1296269,
            "number": 7,
            "state": "open",
            "title": "Open Source Policy Issues",
            "body": null,
            "created_at": "2024-03-01T12:00:00Z",
            "user": {"login": "github-actions[bot]"},
            "labels": [{"name": "lintrack"}]
        }"#;
        let issue: IssueResponse = serde_json::from_str(api_json).unwrap();
        assert_eq!(issue.number, 7);
        assert_eq!(issue.state, RecordState::Open);
        assert!(!issue.is_pull_request());

        let record = TrackingRecord::from(issue);
        assert_eq!(record.body, "");
        assert_eq!(record.title, "Open Source Policy Issues");
    }

    #[test]
    fn pull_requests_are_recognized() {
        let api_json = r#"{
            "number": 12,
            "state": "closed",
            "created_at": "2024-03-01T12:00:00Z",
            "pull_request": {"url": "https://api.github.com/repos/o/r/pulls/12"}
        }"#;
        let issue: IssueResponse = serde_json::from_str(api_json).unwrap();
        assert!(issue.is_pull_request());
        assert_eq!(issue.state, RecordState::Closed);
    }
}
