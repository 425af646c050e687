use tracing::{debug, warn};

use super::{RepoRef, TrackingRecord};
use crate::error::ReconcileError;
use crate::github::{IssueQuery, IssueTracker};

/// Result of looking up the tracking issue for a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    /// Most recently created match, open or closed.
    pub record: Option<TrackingRecord>,
    /// Numbers of every open match, newest first.
    pub open_candidates: Vec<u64>,
}

impl Lookup {
    /// More than one open issue matched; there should only ever be one.
    pub fn is_ambiguous(&self) -> bool {
        self.open_candidates.len() > 1
    }
}

/// Newest candidate by creation time. Ties keep the tracker's order.
pub fn select_authoritative(mut candidates: Vec<TrackingRecord>) -> Option<TrackingRecord> {
    candidates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    candidates.into_iter().next()
}

/// Open candidates, newest first. Closed ones never count toward ambiguity.
pub fn open_candidates(candidates: &[TrackingRecord]) -> Vec<u64> {
    let mut open: Vec<&TrackingRecord> = candidates.iter().filter(|r| r.is_open()).collect();
    open.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    open.into_iter().map(|r| r.number).collect()
}

/// Finds the tracking issue previous runs left behind.
pub struct IssueLocator<'a, T> {
    tracker: &'a T,
}

impl<'a, T: IssueTracker> IssueLocator<'a, T> {
    pub fn new(tracker: &'a T) -> Self {
        Self { tracker }
    }

    /// Issues opened by `creator` with `label`, reduced to the authoritative one.
    pub async fn locate(
        &self,
        repo: &RepoRef,
        creator: &str,
        label: &str,
    ) -> Result<Lookup, ReconcileError> {
        if creator.trim().is_empty() {
            return Err(ReconcileError::MissingInput("creator identity"));
        }
        if label.trim().is_empty() {
            return Err(ReconcileError::MissingInput("label name"));
        }
        if label.contains(',') {
            return Err(ReconcileError::InvalidLabelName(label.to_string()));
        }

        let query = IssueQuery {
            creator: creator.to_string(),
            label: label.to_string(),
        };
        let candidates = self.tracker.list_issues(repo, &query).await?;
        debug!(%repo, count = candidates.len(), "listed tracking issue candidates");

        let lookup = Lookup {
            open_candidates: open_candidates(&candidates),
            record: select_authoritative(candidates),
        };
        if lookup.is_ambiguous() {
            let numbers: Vec<String> = lookup
                .open_candidates
                .iter()
                .map(|n| format!("#{n}"))
                .collect();
            warn!(
                %repo,
                "found more than one matching open issue: {}; defaulting to the most recent",
                numbers.join(", ")
            );
        }
        Ok(lookup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::RecordState::{Closed, Open};
    use crate::reconcile::mock::{Call, MockTracker, context, record};

    #[test]
    fn newest_candidate_wins_even_when_closed() {
        let newest = record(9, Closed, "", 1);
        let picked = select_authoritative(vec![
            record(7, Open, "", 30),
            newest.clone(),
            record(8, Open, "", 10),
        ]);
        assert_eq!(picked, Some(newest));
    }

    #[test]
    fn ties_keep_tracker_order() {
        let picked = select_authoritative(vec![record(8, Open, "", 5), record(7, Open, "", 5)]);
        assert_eq!(picked.map(|r| r.number), Some(8));
    }

    #[test]
    fn no_candidates_selects_nothing() {
        assert_eq!(select_authoritative(Vec::new()), None);
    }

    #[test]
    fn open_candidates_ignore_closed_issues() {
        let candidates = vec![
            record(9, Closed, "", 1),
            record(7, Open, "", 30),
            record(8, Open, "", 10),
        ];
        assert_eq!(open_candidates(&candidates), vec![8, 7]);
    }

    #[tokio::test]
    async fn locate_returns_single_match() {
        let tracker = MockTracker::with_issues(vec![record(7, Open, "", 10)]);
        let ctx = context(10);
        let lookup = IssueLocator::new(&tracker)
            .locate(&ctx.repo, "lintrack-bot", "lintrack")
            .await
            .unwrap();

        assert_eq!(lookup.record.as_ref().map(|r| r.number), Some(7));
        assert!(!lookup.is_ambiguous());
        assert_eq!(
            tracker.calls(),
            vec![Call::ListIssues(IssueQuery {
                creator: "lintrack-bot".into(),
                label: "lintrack".into(),
            })]
        );
    }

    #[tokio::test]
    async fn locate_flags_multiple_open_issues_but_still_picks_newest() {
        let tracker = MockTracker::with_issues(vec![
            record(7, Open, "", 30),
            record(8, Open, "", 20),
            record(9, Closed, "", 10),
        ]);
        let ctx = context(10);
        let lookup = IssueLocator::new(&tracker)
            .locate(&ctx.repo, "lintrack-bot", "lintrack")
            .await
            .unwrap();

        assert!(lookup.is_ambiguous());
        assert_eq!(lookup.open_candidates, vec![8, 7]);
        assert_eq!(lookup.record.map(|r| r.number), Some(9));
    }

    #[tokio::test]
    async fn one_open_and_one_closed_is_not_ambiguous() {
        let tracker =
            MockTracker::with_issues(vec![record(7, Open, "", 30), record(8, Closed, "", 20)]);
        let ctx = context(10);
        let lookup = IssueLocator::new(&tracker)
            .locate(&ctx.repo, "lintrack-bot", "lintrack")
            .await
            .unwrap();
        assert!(!lookup.is_ambiguous());
    }

    #[tokio::test]
    async fn locate_propagates_tracker_failures() {
        let mut tracker = MockTracker::empty();
        tracker.list_status = Some(404);
        let ctx = context(10);
        let err = IssueLocator::new(&tracker)
            .locate(&ctx.repo, "lintrack-bot", "lintrack")
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Tracker(ref e) if e.is_not_found()));
    }

    #[tokio::test]
    async fn locate_rejects_empty_inputs_without_calling_tracker() {
        let tracker = MockTracker::empty();
        let ctx = context(10);
        let locator = IssueLocator::new(&tracker);

        let err = locator.locate(&ctx.repo, "", "lintrack").await.unwrap_err();
        assert!(matches!(err, ReconcileError::MissingInput("creator identity")));
        let err = locator.locate(&ctx.repo, "bot", " ").await.unwrap_err();
        assert!(matches!(err, ReconcileError::MissingInput("label name")));
        let err = locator.locate(&ctx.repo, "bot", "a,b").await.unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidLabelName(_)));
        assert!(tracker.calls().is_empty());
    }
}
