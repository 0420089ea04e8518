//! Loaders that turn source corpora into store documents.
//!
//! Two corpora feed the knowledge store: scraped community Q&A threads
//! (a JSON state file) and command reference pages (a text file of
//! `COMMAND:`/`DOCUMENTATION:` entries, one per command).

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::knowledge::Document;
use crate::error::CommandError;

/// Scraped community Q&A state file.
#[derive(Debug, Deserialize)]
struct ForumState {
    questions: BTreeMap<String, ForumQuestion>,
}

/// One scraped thread. Text fields are null for threads the scraper
/// found but never finished pulling.
#[derive(Debug, Deserialize)]
struct ForumQuestion {
    question_url: String,
    question_title: String,
    question_text: Option<String>,
    answer_text: Option<String>,
}

/// Loads a scraped Q&A state file into store documents.
///
/// Each thread becomes one document whose text holds the question and
/// its accepted answer, with the title and URL kept as metadata.
///
/// # Errors
///
/// Returns [`CommandError::Io`] if the file cannot be read, or
/// [`CommandError::InvalidInput`] if it is not a valid state file.
pub fn load_forum_state(path: &Path) -> Result<Vec<Document>, CommandError> {
    let raw = std::fs::read_to_string(path)?;
    let state: ForumState =
        serde_json::from_str(&raw).map_err(|e| CommandError::InvalidInput {
            message: format!("malformed Q&A state file {}: {e}", path.display()),
        })?;

    let documents = state
        .questions
        .into_values()
        .filter_map(|q| match (q.question_text, q.answer_text) {
            (Some(question), Some(answer)) => Some(
                Document::new(format!("QUESTION: {question}\n\nANSWER: {answer}"))
                    .with_metadata("question_title", q.question_title)
                    .with_metadata("question_url", q.question_url),
            ),
            _ => {
                tracing::warn!(
                    title = %q.question_title,
                    "skipping thread without scraped text"
                );
                None
            }
        })
        .collect();
    Ok(documents)
}

/// Loads a command reference file into store documents.
///
/// Topic metadata is derived from the path: the file stem is the child
/// topic and the containing directory the parent topic.
///
/// # Errors
///
/// Returns [`CommandError::Io`] if the file cannot be read, or
/// [`CommandError::InvalidInput`] if no entries can be parsed from it.
pub fn load_command_refs(path: &Path) -> Result<Vec<Document>, CommandError> {
    let raw = std::fs::read_to_string(path)?;
    let child_topic = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent_topic = path
        .parent()
        .and_then(Path::file_name)
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let documents = parse_command_refs(&raw, &child_topic, &parent_topic);
    if documents.is_empty() {
        return Err(CommandError::InvalidInput {
            message: format!(
                "no COMMAND/DOCUMENTATION entries found in {}",
                path.display()
            ),
        });
    }
    Ok(documents)
}

/// Parses `COMMAND:`/`DOCUMENTATION:` entries from reference text.
///
/// Entries whose command cannot be extracted are skipped with a warning
/// rather than aborting the whole file.
#[must_use]
pub fn parse_command_refs(raw: &str, child_topic: &str, parent_topic: &str) -> Vec<Document> {
    let mut documents = Vec::new();
    let mut command: Option<String> = None;
    let mut body: Vec<&str> = Vec::new();

    let mut flush = |command: &mut Option<String>, body: &mut Vec<&str>| {
        if let Some(cmd) = command.take() {
            let text = body.join("\n").trim().to_string();
            documents.push(
                Document::new(format!("COMMAND: {cmd}\n{text}"))
                    .with_metadata("command", cmd)
                    .with_metadata("child_topic", child_topic)
                    .with_metadata("parent_topic", parent_topic),
            );
        }
        body.clear();
    };

    for line in raw.lines() {
        if let Some(rest) = line.strip_prefix("COMMAND:") {
            flush(&mut command, &mut body);
            let extracted = rest.trim().trim_matches('`').trim();
            if extracted.is_empty() {
                tracing::warn!("skipping reference entry with empty command");
                command = None;
            } else {
                command = Some(extracted.to_string());
            }
        } else if let Some(rest) = line.strip_prefix("DOCUMENTATION:") {
            body.push(rest.trim_start());
        } else if command.is_some() {
            body.push(line);
        }
    }
    flush(&mut command, &mut body);
    documents
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_REFS: &str = "COMMAND:```show version```\n\
        DOCUMENTATION:Displays the configuration of the system hardware,\n\
        the software version, and the system uptime.\n\
        COMMAND:```show ip route```\n\
        DOCUMENTATION:Displays the current state of the routing table.\n";

    #[test]
    fn test_parse_command_refs() {
        let documents = parse_command_refs(SAMPLE_REFS, "fundamentals", "ios-xe");
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].metadata("command"), Some("show version"));
        assert_eq!(documents[0].metadata("child_topic"), Some("fundamentals"));
        assert_eq!(documents[0].metadata("parent_topic"), Some("ios-xe"));
        assert!(documents[0].text.contains("system uptime"));
        assert_eq!(documents[1].metadata("command"), Some("show ip route"));
    }

    #[test]
    fn test_parse_skips_empty_command() {
        let raw = "COMMAND:``````\nDOCUMENTATION:orphaned\nCOMMAND:```show clock```\nDOCUMENTATION:time\n";
        let documents = parse_command_refs(raw, "c", "p");
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].metadata("command"), Some("show clock"));
    }

    #[test]
    fn test_load_command_refs_derives_topics_from_path() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let topic_dir = dir.path().join("routing");
        std::fs::create_dir_all(&topic_dir).unwrap_or_else(|_| unreachable!());
        let path = topic_dir.join("ospf.txt");
        std::fs::write(&path, SAMPLE_REFS).unwrap_or_else(|_| unreachable!());

        let documents = load_command_refs(&path).unwrap_or_else(|_| unreachable!());
        assert_eq!(documents[0].metadata("child_topic"), Some("ospf"));
        assert_eq!(documents[0].metadata("parent_topic"), Some("routing"));
    }

    #[test]
    fn test_load_command_refs_rejects_empty_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap_or_else(|_| unreachable!());
        write!(file, "just prose, no entries").unwrap_or_else(|_| unreachable!());
        let result = load_command_refs(file.path());
        assert!(matches!(result, Err(CommandError::InvalidInput { .. })));
    }

    #[test]
    fn test_load_forum_state() {
        let mut file = tempfile::NamedTempFile::new().unwrap_or_else(|_| unreachable!());
        write!(
            file,
            r#"{{"questions": {{"BGP flapping": {{
                "question_url": "https://example.net/t/1",
                "question_title": "BGP flapping",
                "offset": 3,
                "question_text": "Why does my BGP session flap?",
                "answer_text": "Check the hold timer and MTU."
            }}}}}}"#
        )
        .unwrap_or_else(|_| unreachable!());

        let documents = load_forum_state(file.path()).unwrap_or_else(|_| unreachable!());
        assert_eq!(documents.len(), 1);
        assert!(documents[0].text.starts_with("QUESTION:"));
        assert!(documents[0].text.contains("QUESTION: Why does my BGP session flap?"));
        assert!(documents[0].text.contains("ANSWER: Check the hold timer"));
        assert_eq!(
            documents[0].metadata("question_title"),
            Some("BGP flapping")
        );
    }

    #[test]
    fn test_load_forum_state_skips_unscraped_threads() {
        let mut file = tempfile::NamedTempFile::new().unwrap_or_else(|_| unreachable!());
        write!(
            file,
            r#"{{"questions": {{"Pending": {{
                "question_url": "https://example.net/t/2",
                "question_title": "Pending",
                "offset": 0,
                "question_text": null,
                "answer_text": null
            }}}}}}"#
        )
        .unwrap_or_else(|_| unreachable!());

        let documents = load_forum_state(file.path()).unwrap_or_else(|_| unreachable!());
        assert!(documents.is_empty());
    }

    #[test]
    fn test_load_forum_state_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap_or_else(|_| unreachable!());
        write!(file, "[]").unwrap_or_else(|_| unreachable!());
        let result = load_forum_state(file.path());
        assert!(matches!(result, Err(CommandError::InvalidInput { .. })));
    }
}
