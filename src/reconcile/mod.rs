//! Keeps exactly one tracking issue per scan job up to date.
//!
//! A run flows LOCATE → DECIDE → WRITE: the [`locator`] finds the newest
//! issue a previous run left behind, [`decision::decide`] picks at most one
//! mutation from a fixed rule table, and the [`writer`] applies it. The
//! run-number marker maintained by [`provenance`] is what keeps delayed,
//! out-of-order runs from overwriting newer results.

pub mod controller;
pub mod decision;
pub mod locator;
pub mod provenance;
mod record;
pub mod writer;

#[cfg(test)]
pub(crate) mod mock;

pub use controller::{Action, Reconciler, Reconciliation, reconcile};
pub use decision::{Decision, SkipReason, decide};
pub use locator::{IssueLocator, Lookup};
pub use record::{LabelSpec, RecordState, RepoRef, RunContext, TrackingRecord};
pub use writer::{IssueDraft, IssueWriter};
