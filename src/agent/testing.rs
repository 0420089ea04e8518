//! Shared test doubles for the agent module.

use std::sync::Mutex;

use async_trait::async_trait;

use super::message::{ChatRequest, ChatResponse, TokenUsage};
use super::provider::LlmProvider;
use crate::error::AgentError;

/// Provider double that replays a scripted sequence of replies and
/// records every request it receives.
pub(crate) struct ScriptedProvider {
    replies: Mutex<Vec<String>>,
    pub(crate) requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub(crate) fn new(replies: Vec<&str>) -> Self {
        let mut replies: Vec<String> = replies.into_iter().map(String::from).collect();
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        self.requests
            .lock()
            .unwrap_or_else(|_| unreachable!())
            .push(request.clone());
        let content = self
            .replies
            .lock()
            .unwrap_or_else(|_| unreachable!())
            .pop()
            .ok_or_else(|| AgentError::Orchestration {
                message: "script exhausted".to_string(),
            })?;
        Ok(ChatResponse {
            content,
            usage: TokenUsage::default(),
            finish_reason: Some("stop".to_string()),
        })
    }
}
