//! Device resolver role.
//!
//! Maps the devices a question refers to onto the known inventory.
//! Replies are filtered against the topology: a hostname the model
//! invents is logged and dropped, never executed against.

use super::config::AgentConfig;
use super::prompt::RolePrompt;
use super::provider::LlmProvider;
use super::traits::{RoleAgent, ask_structured};
use super::wire::DevicesReply;
use crate::device::{DeviceRecord, Topology};
use crate::error::AgentError;

/// Resolves question targets to inventory devices.
#[derive(Debug)]
pub struct DeviceResolver {
    model: String,
    max_tokens: u32,
    parse_retries: u32,
    prompt: RolePrompt,
}

impl DeviceResolver {
    /// Creates a resolver from configuration and its role prompt.
    #[must_use]
    pub fn new(config: &AgentConfig, prompt: RolePrompt) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.reply_max_tokens,
            parse_retries: config.max_parse_retries,
            prompt,
        }
    }

    /// Resolves the devices referenced by `question` against `topology`.
    ///
    /// Returned records are drawn from the topology itself, so hostnames
    /// and addresses are always canonical regardless of how the model
    /// spelled them.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API or parse failures.
    pub async fn resolve(
        &self,
        provider: &dyn LlmProvider,
        question: &str,
        topology: &Topology,
    ) -> Result<Vec<DeviceRecord>, AgentError> {
        let listing = topology.prompt_pairs();
        let user_msg = self
            .prompt
            .template
            .render(&[("question", question), ("topology", &listing)])?;
        let (parsed, _reply) = ask_structured::<DevicesReply>(
            self,
            provider,
            &[],
            &user_msg,
            self.parse_retries,
        )
        .await?;

        let mut devices = Vec::new();
        for (hostname, address) in parsed.devices {
            match topology.find(&hostname) {
                Some(record) => {
                    if !devices.contains(record) {
                        devices.push(record.clone());
                    }
                }
                None => tracing::warn!(
                    device = %hostname,
                    address = %address,
                    "resolved device not present in topology, skipping"
                ),
            }
        }
        tracing::debug!(role = self.name(), count = devices.len(), "devices resolved");
        Ok(devices)
    }
}

impl RoleAgent for DeviceResolver {
    fn name(&self) -> &'static str {
        "resolver"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.prompt.system
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::prompt::PromptSet;
    use crate::agent::testing::ScriptedProvider;

    fn resolver() -> DeviceResolver {
        let config = AgentConfig::builder()
            .api_key("test")
            .build()
            .unwrap_or_else(|_| unreachable!());
        DeviceResolver::new(&config, PromptSet::defaults().resolver)
    }

    fn topology() -> Topology {
        Topology::from_devices(vec![
            DeviceRecord {
                hostname: "C8K1".to_string(),
                address: "10.0.0.1".to_string(),
            },
            DeviceRecord {
                hostname: "C8K2".to_string(),
                address: "10.0.0.2".to_string(),
            },
        ])
    }

    #[tokio::test]
    async fn test_resolve_known_devices() {
        let provider = ScriptedProvider::new(vec![
            r#"{"devices": [["C8K1", "10.0.0.1"], ["C8K2", "10.0.0.2"]]}"#,
        ]);
        let devices = resolver()
            .resolve(&provider, "uptime on router 1 and router 2?", &topology())
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].hostname, "C8K1");
    }

    #[tokio::test]
    async fn test_resolve_canonicalizes_case() {
        let provider =
            ScriptedProvider::new(vec![r#"{"devices": [["c8k1", "10.0.0.1"]]}"#]);
        let devices = resolver()
            .resolve(&provider, "uptime on c8k1?", &topology())
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].hostname, "C8K1");
    }

    #[tokio::test]
    async fn test_resolve_drops_unknown_devices() {
        let provider = ScriptedProvider::new(vec![
            r#"{"devices": [["C8K1", "10.0.0.1"], ["ghost", "203.0.113.9"]]}"#,
        ]);
        let devices = resolver()
            .resolve(&provider, "uptime?", &topology())
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].hostname, "C8K1");
    }

    #[tokio::test]
    async fn test_resolve_dedupes_repeats() {
        let provider = ScriptedProvider::new(vec![
            r#"{"devices": [["C8K1", "10.0.0.1"], ["c8k1", "10.0.0.1"]]}"#,
        ]);
        let devices = resolver()
            .resolve(&provider, "uptime on r1?", &topology())
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(devices.len(), 1);
    }
}
