//! Activity Classifier (C3): two-sample capture comparison plus
//! content-pattern rules, producing `ActivityStatus`, `InputFieldStatus`
//! and `WorkerStatus`.
//!
//! The exact "completion marker" and "waiting" substrings are expressed
//! only in prose in the source spec (§4.3); the lists below are this
//! implementation's resolution of that open question (see DESIGN.md).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One rendered snapshot of a pane's visible content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSample {
    pub content: String,
    pub taken_at: DateTime<Utc>,
}

impl CaptureSample {
    pub fn new(content: impl Into<String>, taken_at: DateTime<Utc>) -> Self {
        Self {
            content: content.into(),
            taken_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    NotEvaluated,
    Working,
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFieldStatus {
    NoInputField,
    Empty,
    HasInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Idle,
    Working { details: Option<String> },
    Blocked { reason: Option<String> },
    Done { result: Option<String> },
    Terminated { reason: Option<String> },
    Unknown { last_known: Option<String> },
}

/// Tagless kind of a `WorkerStatus`, used for `PaneCollection::by_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatusKind {
    Idle,
    Working,
    Blocked,
    Done,
    Terminated,
    Unknown,
}

impl WorkerStatus {
    pub fn kind(&self) -> WorkerStatusKind {
        match self {
            Self::Idle => WorkerStatusKind::Idle,
            Self::Working { .. } => WorkerStatusKind::Working,
            Self::Blocked { .. } => WorkerStatusKind::Blocked,
            Self::Done { .. } => WorkerStatusKind::Done,
            Self::Terminated { .. } => WorkerStatusKind::Terminated,
            Self::Unknown { .. } => WorkerStatusKind::Unknown,
        }
    }
}

const GONE_MARKERS: &[&str] = &["no pane", "pane gone"];
const COMPLETION_MARKERS: &[&str] = &["completed", "✓ done"];
const BLOCKED_MARKERS: &[&str] = &["waiting for", "paused", "press any key"];

fn contains_any(haystack_lower: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack_lower.contains(n))
}

/// CRLF -> LF, strip trailing whitespace per line, trim overall.
pub fn normalize(content: &str) -> String {
    let unified = content.replace("\r\n", "\n");
    let lines: Vec<&str> = unified.lines().map(|l| l.trim_end()).collect();
    lines.join("\n").trim().to_string()
}

/// `NotEvaluated` iff `prev` is `None`; otherwise compares normalized content.
pub fn classify_activity(prev: Option<&CaptureSample>, curr: &CaptureSample) -> ActivityStatus {
    match prev {
        None => ActivityStatus::NotEvaluated,
        Some(prev) => {
            if normalize(&prev.content) != normalize(&curr.content) {
                ActivityStatus::Working
            } else {
                ActivityStatus::Idle
            }
        }
    }
}

/// Look at the last three lines of `content` for a box-drawn prompt row
/// (`│ > │`). Fails with `ValidationFailed` if `content` has fewer than
/// three lines.
pub fn detect_input_field(content: &str) -> Result<InputFieldStatus, CoreError> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.len() < 3 {
        return Err(CoreError::ValidationFailed(format!(
            "capture has {} lines, need at least 3 to evaluate the input field",
            lines.len()
        )));
    }
    let last_three = &lines[lines.len() - 3..];
    for line in last_three.iter().rev() {
        if let Some(status) = detect_prompt_row(line) {
            return Ok(status);
        }
    }
    Ok(InputFieldStatus::NoInputField)
}

/// Detect a single box-drawn prompt row and classify the text between
/// the `>` cursor and the row's right border.
fn detect_prompt_row(line: &str) -> Option<InputFieldStatus> {
    let gt_idx = line.find('>')?;
    line[..gt_idx].rfind('│')?;
    let after = &line[gt_idx + '>'.len_utf8()..];
    let right_border_rel = after.find('│')?;
    let between = &after[..right_border_rel];
    if between.trim().is_empty() {
        Some(InputFieldStatus::Empty)
    } else {
        Some(InputFieldStatus::HasInput)
    }
}

/// Deterministic ActivityStatus + content -> WorkerStatus mapping (§4.3).
pub fn derive_worker_status(activity: ActivityStatus, content: &str) -> WorkerStatus {
    let lower = content.to_ascii_lowercase();

    if contains_any(&lower, GONE_MARKERS) {
        return WorkerStatus::Terminated {
            reason: Some("gone".to_string()),
        };
    }

    match activity {
        ActivityStatus::NotEvaluated => WorkerStatus::Unknown { last_known: None },
        ActivityStatus::Idle => {
            if contains_any(&lower, COMPLETION_MARKERS) {
                WorkerStatus::Done {
                    result: Some("completed".to_string()),
                }
            } else {
                WorkerStatus::Idle
            }
        }
        ActivityStatus::Working => {
            if contains_any(&lower, BLOCKED_MARKERS) {
                WorkerStatus::Blocked {
                    reason: Some("waiting".to_string()),
                }
            } else {
                WorkerStatus::Working { details: None }
            }
        }
    }
}
