use thiserror::Error;

use crate::github::TrackerError;
use crate::reconcile::RepoRef;

/// Everything a reconciliation can fail with.
///
/// Contract violations are detected before any tracker call. Issue-creation
/// failures with a well-known cause are remapped to actionable messages;
/// every other tracker failure is passed through untouched so the caller can
/// decide whether to retry.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("cannot both close the tracking issue and force a new one")]
    ConflictingFlags,

    #[error("missing required input: {0}")]
    MissingInput(&'static str),

    #[error("invalid repository `{0}`, expected `owner/name`")]
    InvalidRepo(String),

    #[error("invalid label name `{0}`, label names cannot contain commas")]
    InvalidLabelName(String),

    #[error("invalid label color `{0}`, expected six hex digits such as `fbca04`")]
    InvalidLabelColor(String),

    #[error("the token is not allowed to create issues on {repo}; grant it write access to issues")]
    PermissionDenied {
        repo: RepoRef,
        #[source]
        source: TrackerError,
    },

    #[error("issues are disabled on {repo}; enable them in the repository settings")]
    IssuesDisabled {
        repo: RepoRef,
        #[source]
        source: TrackerError,
    },

    #[error("repository {repo} was not found or is not visible to this token")]
    RepositoryNotFound {
        repo: RepoRef,
        #[source]
        source: TrackerError,
    },

    #[error("GitHub rejected the issue for {repo} as malformed")]
    InvalidIssue {
        repo: RepoRef,
        #[source]
        source: TrackerError,
    },

    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

impl ReconcileError {
    /// The transport failure behind this error, if there was one.
    pub fn transport(&self) -> Option<&TrackerError> {
        match self {
            ReconcileError::PermissionDenied { source, .. }
            | ReconcileError::IssuesDisabled { source, .. }
            | ReconcileError::RepositoryNotFound { source, .. }
            | ReconcileError::InvalidIssue { source, .. } => Some(source),
            ReconcileError::Tracker(source) => Some(source),
            _ => None,
        }
    }
}
