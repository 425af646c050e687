pub mod client;
pub mod error;
pub mod types;

pub use client::{API_URL, GitHubClient, IssueTracker};
pub use error::TrackerError;
pub use types::{IssuePatch, IssueQuery, NewIssue, NewLabel};
