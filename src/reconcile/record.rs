use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ReconcileError;

/// Open/closed state of a tracking issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordState {
    Open,
    Closed,
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordState::Open => write!(f, "open"),
            RecordState::Closed => write!(f, "closed"),
        }
    }
}

/// One issue on the tracker, as seen by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingRecord {
    /// Tracker-assigned issue number.
    pub number: u64,
    pub state: RecordState,
    pub title: String,
    /// Empty when the issue has no body.
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl TrackingRecord {
    pub fn is_open(&self) -> bool {
        self.state == RecordState::Open
    }

    pub fn is_closed(&self) -> bool {
        self.state == RecordState::Closed
    }
}

/// `owner/name` coordinates of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepoRef {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(ReconcileError::InvalidRepo(s.to_string())),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Classification label attached to every tracking issue.
///
/// The color is only used when the label has to be created; an existing
/// label keeps whatever color it already has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSpec {
    pub name: String,
    /// Six lowercase hex digits, no `#`.
    pub color: String,
}

impl LabelSpec {
    pub fn new(name: &str, color: &str) -> Result<Self, ReconcileError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ReconcileError::MissingInput("label name"));
        }
        // The issue search takes a comma-separated label list.
        if name.contains(',') {
            return Err(ReconcileError::InvalidLabelName(name.to_string()));
        }
        let hex = color.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ReconcileError::InvalidLabelColor(color.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            color: hex.to_ascii_lowercase(),
        })
    }
}

/// What the caller wants this invocation to achieve.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub repo: RepoRef,
    pub title: String,
    pub label: LabelSpec,
    pub assignee: Option<String>,
    /// Human-readable scan report; the provenance marker is appended to it.
    pub content: String,
    /// Sequence number of the job run executing now.
    pub run_number: u64,
    /// The scan passed: close the tracking issue if one is open.
    pub should_close: bool,
    /// Always open a fresh issue, closing the current one first.
    pub force_create: bool,
}

impl RunContext {
    /// Reject intents that can never be satisfied, before any tracker call.
    pub fn validate(&self) -> Result<(), ReconcileError> {
        if self.should_close && self.force_create {
            return Err(ReconcileError::ConflictingFlags);
        }
        Ok(())
    }
}
