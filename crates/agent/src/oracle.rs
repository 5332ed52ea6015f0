use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use maitred_core::config::{OracleConfig, OracleProvider};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

/// Token cap for closed-set classification and slot extraction replies.
pub const LABEL_REPLY_TOKENS: u32 = 50;
/// Token cap for freeform acknowledge-and-reprompt replies.
pub const CHAT_REPLY_TOKENS: u32 = 200;

/// Black-box prompt→text backend. Implementations may fail; callers that
/// need the non-throwing contract go through [`OracleGateway`].
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}

/// Non-throwing front door to the oracle. Every transport, status, or decode
/// failure degrades to an empty string; the dialogue layer treats an empty
/// reply as "the oracle had nothing to say" and falls back to reprompting.
#[derive(Clone)]
pub struct OracleGateway {
    backend: Arc<dyn Oracle>,
}

impl OracleGateway {
    pub fn new(backend: Arc<dyn Oracle>) -> Self {
        Self { backend }
    }

    pub fn from_config(config: &OracleConfig) -> Result<Self> {
        let backend: Arc<dyn Oracle> = match config.provider {
            OracleProvider::Ollama => Arc::new(OllamaOracle::new(config)?),
            OracleProvider::Groq => Arc::new(GroqOracle::new(config)?),
        };
        Ok(Self::new(backend))
    }

    pub async fn generate(&self, prompt: &str, max_tokens: u32) -> String {
        match self.backend.generate(prompt, max_tokens).await {
            Ok(reply) => reply.trim().to_string(),
            Err(error) => {
                tracing::warn!(
                    event_name = "oracle.generate_failed",
                    error = %error,
                    "oracle call degraded to empty reply"
                );
                String::new()
            }
        }
    }
}

fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("could not build oracle http client")
}

/// Local inference backend speaking the Ollama generate API.
pub struct OllamaOracle {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaOracle {
    pub fn new(config: &OracleConfig) -> Result<Self> {
        Ok(Self {
            http: http_client(config.timeout_secs)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OllamaReply {
    response: Option<String>,
}

#[async_trait]
impl Oracle for OllamaOracle {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": { "temperature": 0, "num_predict": max_tokens },
        });

        let reply: OllamaReply = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .context("ollama request failed")?
            .error_for_status()
            .context("ollama returned an error status")?
            .json()
            .await
            .context("ollama reply was not valid json")?;

        let text = reply.response.unwrap_or_default();
        Ok(text.trim().lines().next().unwrap_or_default().to_string())
    }
}

/// Hosted OpenAI-compatible chat-completions backend.
pub struct GroqOracle {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: SecretString,
}

impl GroqOracle {
    pub fn new(config: &OracleConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .context("groq oracle requires oracle.api_key to be configured")?;

        Ok(Self {
            http: http_client(config.timeout_secs)?,
            endpoint: config.base_url.clone(),
            model: config.model.clone(),
            api_key,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsReply {
    choices: Vec<ChatCompletionsChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsChoice {
    message: ChatCompletionsMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsMessage {
    content: Option<String>,
}

#[async_trait]
impl Oracle for GroqOracle {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": "You are a helpful assistant. Be concise but complete." },
                { "role": "user", "content": prompt },
            ],
            "temperature": 0,
            "max_tokens": max_tokens,
        });

        let reply: ChatCompletionsReply = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .context("groq request failed")?
            .error_for_status()
            .context("groq returned an error status")?
            .json()
            .await
            .context("groq reply was not valid json")?;

        Ok(reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

/// Deterministic backend for tests: records every prompt and pops canned
/// replies in order, returning an empty string once the script runs dry.
#[derive(Default)]
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|reply| reply.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn generate(&self, prompt: &str, _max_tokens: u32) -> Result<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(prompt.to_string());
        Ok(self
            .replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .unwrap_or_default())
    }
}

/// Backend that always fails; exercises the gateway's degradation contract.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingOracle;

#[async_trait]
impl Oracle for FailingOracle {
    async fn generate(&self, _prompt: &str, _max_tokens: u32) -> Result<String> {
        Err(anyhow::anyhow!("oracle backend unreachable"))
    }
}
