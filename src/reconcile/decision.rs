use std::fmt;

use serde::Serialize;

use super::{RunContext, TrackingRecord, provenance};

/// Why a run left the tracker untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Asked to close, but no tracking issue exists.
    NothingToClose,
    /// Asked to close, but the newest tracking issue is already closed.
    AlreadyClosed { number: u64 },
    /// The tracking issue was last written by a later run.
    Superseded {
        number: u64,
        recorded: u64,
        current: u64,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NothingToClose => write!(f, "no tracking issue to close"),
            SkipReason::AlreadyClosed { number } => write!(f, "issue #{number} is already closed"),
            SkipReason::Superseded {
                number,
                recorded,
                current,
            } => write!(
                f,
                "issue #{number} was written by run {recorded}, newer than run {current}"
            ),
        }
    }
}

/// The single mutation (if any) a run should apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Skip(SkipReason),
    /// Open a new tracking issue.
    Create,
    /// Close the open issue `close`, then open a new one.
    CloseThenCreate { close: u64 },
    /// Rewrite issue `number` in place, closing it when `close` is set.
    Update { number: u64, close: bool },
}

/// Choose what to do given the newest existing tracking issue.
///
/// Rules are applied in order:
/// 1. Closing with no open issue is a no-op, so closes are idempotent and
///    never resurrect anything.
/// 2. An issue whose marker records a later run than ours is left alone,
///    open or closed. An issue without a marker does not block.
/// 3. Forcing, absence, or a closed issue all lead to a new issue; an
///    open issue that would be replaced is closed first.
/// 4. Otherwise the open issue is updated in place.
///
/// Assumes [`RunContext::validate`] has already passed.
pub fn decide(existing: Option<&TrackingRecord>, ctx: &RunContext) -> Decision {
    if ctx.should_close {
        match existing {
            None => return Decision::Skip(SkipReason::NothingToClose),
            Some(record) if record.is_closed() => {
                return Decision::Skip(SkipReason::AlreadyClosed {
                    number: record.number,
                });
            }
            Some(_) => {}
        }
    }

    if let Some(record) = existing
        && let Some(recorded) = provenance::decode(&record.body)
        && recorded > ctx.run_number
    {
        return Decision::Skip(SkipReason::Superseded {
            number: record.number,
            recorded,
            current: ctx.run_number,
        });
    }

    match existing {
        None => Decision::Create,
        Some(record) if record.is_closed() => Decision::Create,
        Some(record) if ctx.force_create => Decision::CloseThenCreate {
            close: record.number,
        },
        Some(record) => Decision::Update {
            number: record.number,
            close: ctx.should_close,
        },
    }
}
