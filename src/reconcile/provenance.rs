//! Run-number marker embedded at the end of every tracking issue body.
//!
//! The marker is an HTML comment (`<!-- workflow-number:N -->`) so it stays
//! invisible in the rendered issue. Its exact text is part of the protocol:
//! issues written by earlier releases must keep decoding, so the decoder also
//! accepts prefixed tags such as `repolinter-action-workflow-number`.

use std::sync::LazyLock;

use regex::Regex;

const TAG: &str = "workflow-number";

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<!--\s*[\w-]*workflow-number\s*:\s*(\d+)\s*-->")
        .expect("provenance marker pattern is valid")
});

/// The marker for `run_number`, without surrounding newlines.
pub fn encode(run_number: u64) -> String {
    format!("<!-- {TAG}:{run_number} -->")
}

/// Run number recorded in `body`, or `None` when the body carries no usable marker.
///
/// Only the first marker counts. A marker whose number does not fit in a
/// `u64` is treated like a missing one.
pub fn decode(body: &str) -> Option<u64> {
    MARKER
        .captures(body)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// `content` followed by the marker for `run_number`, on its own line.
pub fn stamp(content: &str, run_number: u64) -> String {
    format!("{content}\n{}\n", encode(run_number))
}
