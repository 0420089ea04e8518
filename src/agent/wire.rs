//! Typed reply shapes for the six roles, plus ledger and outcome types.
//!
//! Each role's expected JSON output is a serde struct parsed at the
//! boundary, so a malformed reply is caught where it arrives instead of
//! deep in the flow. Boundary structs convert into richer enums
//! ([`CommandChoice`], [`Verdict`]) where a sentinel or boolean carries
//! control-flow meaning.

use serde::{Deserialize, Serialize};

use crate::device::DeviceRecord;

/// Raw reply shape from the command finder role.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectedCommandReply {
    /// The chosen command, or the `"None"` sentinel.
    pub selected_command: String,
}

/// The finder's decision, with the sentinel made explicit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandChoice {
    /// A command string drawn from the offered list.
    Selected(String),
    /// No offered command suits the question; grow the pool and retry.
    NoneSuitable,
}

impl From<SelectedCommandReply> for CommandChoice {
    fn from(reply: SelectedCommandReply) -> Self {
        let trimmed = reply.selected_command.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
            Self::NoneSuitable
        } else {
            Self::Selected(trimmed.to_string())
        }
    }
}

/// Raw reply shape from the command validator role.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationReply {
    /// Whether the documentation supports answering the question.
    pub valid_command: bool,
}

/// The validator's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The command's documentation answers the question.
    Valid,
    /// The command was rejected; the finder must try again.
    Invalid,
}

impl From<ValidationReply> for Verdict {
    fn from(reply: ValidationReply) -> Self {
        if reply.valid_command {
            Self::Valid
        } else {
            Self::Invalid
        }
    }
}

/// Raw reply shape from the syntax refiner role.
#[derive(Debug, Clone, Deserialize)]
pub struct PreciseCommandReply {
    /// The exact, directly executable command string.
    pub precise_command: String,
}

/// Raw reply shape from the device resolver role.
///
/// Devices arrive as `[hostname, address]` pairs pulled verbatim from
/// the topology list offered in the prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct DevicesReply {
    /// The resolved device pairs.
    pub devices: Vec<(String, String)>,
}

/// Raw reply shape from the answerer and combiner roles.
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerReply {
    /// The synthesized answer text.
    pub answer: String,
}

/// One per-device record in the question/answer ledger.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerRecord {
    /// Hostname of the device that produced the answer.
    pub device: String,
    /// The question being answered.
    pub question: String,
    /// The per-device answer.
    pub answer: String,
}

/// A successfully resolved question.
#[derive(Debug, Clone)]
pub struct AnsweredQuestion {
    /// The question that was resolved.
    pub question: String,
    /// The validated command, as refined for execution.
    pub command: String,
    /// The combiner's final answer.
    pub answer: String,
    /// Per-device records accumulated for this question.
    pub records: Vec<LedgerRecord>,
    /// Devices skipped because they were unreachable.
    pub unreachable: Vec<DeviceRecord>,
    /// Selection attempts consumed before acceptance.
    pub attempts: u32,
}

/// Outcome of resolving one question.
///
/// A failed resolution is a value, not a process exit: the session
/// records it and continues with the next queued question.
#[derive(Debug, Clone)]
pub enum QuestionOutcome {
    /// The pipeline produced a final answer.
    Answered(AnsweredQuestion),
    /// The candidate pool ceiling was reached without a validated command.
    NoSuitableCommand {
        /// The question that could not be resolved.
        question: String,
        /// Total selection attempts made.
        attempts: u32,
        /// Attempts where the finder returned the `"None"` sentinel.
        sentinel_misses: u32,
        /// Attempts rejected by the validator.
        rejections: u32,
    },
}

impl QuestionOutcome {
    /// The question this outcome belongs to.
    #[must_use]
    pub fn question(&self) -> &str {
        match self {
            Self::Answered(a) => &a.question,
            Self::NoSuitableCommand { question, .. } => question,
        }
    }

    /// The final answer, if the question was resolved.
    #[must_use]
    pub const fn answer(&self) -> Option<&String> {
        match self {
            Self::Answered(a) => Some(&a.answer),
            Self::NoSuitableCommand { .. } => None,
        }
    }
}

/// Accumulated outcomes for a whole multi-question session.
#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    /// Per-question outcomes, in resolution order.
    pub outcomes: Vec<QuestionOutcome>,
}

impl SessionReport {
    /// Question/answer pairs for the questions that resolved.
    #[must_use]
    pub fn qa_pairs(&self) -> Vec<(&str, &str)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.answer().map(|a| (o.question(), a.as_str())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_selected_command_reply() {
        let reply: SelectedCommandReply =
            serde_json::from_str(r#"{"selected_command": "show version"}"#)
                .unwrap_or_else(|_| unreachable!());
        assert_eq!(
            CommandChoice::from(reply),
            CommandChoice::Selected("show version".to_string())
        );
    }

    #[test_case("None" ; "canonical sentinel")]
    #[test_case("none" ; "lowercase")]
    #[test_case("NONE" ; "uppercase")]
    #[test_case("  None  " ; "padded")]
    #[test_case("" ; "empty")]
    fn test_sentinel_maps_to_none_suitable(raw: &str) {
        let reply = SelectedCommandReply {
            selected_command: raw.to_string(),
        };
        assert_eq!(CommandChoice::from(reply), CommandChoice::NoneSuitable);
    }

    #[test]
    fn test_validation_reply_to_verdict() {
        let reply: ValidationReply = serde_json::from_str(r#"{"valid_command": false}"#)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(Verdict::from(reply), Verdict::Invalid);

        let reply: ValidationReply = serde_json::from_str(r#"{"valid_command": true}"#)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(Verdict::from(reply), Verdict::Valid);
    }

    #[test]
    fn test_devices_reply_pairs() {
        let reply: DevicesReply = serde_json::from_str(
            r#"{"devices": [["r1", "10.0.0.1"], ["r2", "10.0.0.2"]]}"#,
        )
        .unwrap_or_else(|_| unreachable!());
        assert_eq!(reply.devices.len(), 2);
        assert_eq!(reply.devices[0].0, "r1");
        assert_eq!(reply.devices[1].1, "10.0.0.2");
    }

    #[test]
    fn test_ledger_record_serializes() {
        let record = LedgerRecord {
            device: "r1".to_string(),
            question: "uptime?".to_string(),
            answer: "3 weeks".to_string(),
        };
        let json = serde_json::to_string(&record).unwrap_or_default();
        assert!(json.contains("\"device\":\"r1\""));
        assert!(json.contains("\"answer\":\"3 weeks\""));
    }

    #[test]
    fn test_session_report_qa_pairs() {
        let report = SessionReport {
            outcomes: vec![
                QuestionOutcome::Answered(AnsweredQuestion {
                    question: "q1".to_string(),
                    command: "show version".to_string(),
                    answer: "a1".to_string(),
                    records: vec![],
                    unreachable: vec![],
                    attempts: 1,
                }),
                QuestionOutcome::NoSuitableCommand {
                    question: "q2".to_string(),
                    attempts: 11,
                    sentinel_misses: 4,
                    rejections: 7,
                },
            ],
        };
        let pairs = report.qa_pairs();
        assert_eq!(pairs, vec![("q1", "a1")]);
    }
}
