//! Generative engine integration (OpenAI-compatible chat completions API)
//! with explicit error handling and a local fallback boundary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info};

use crate::config::EngineConfig;

/// Marker embedded in the report body when generation fails. The report is
/// still delivered; it explains the failure instead of containing analysis.
pub const ANALYSIS_FALLBACK_MARKER: &str = "analysis generation failed";

/// Generation collaborator boundary.
#[allow(async_fn_in_trait)]
pub trait AnalysisEngine {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Client for an OpenAI-compatible chat completions endpoint.
pub struct LLMClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_seconds: u64,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl LLMClient {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        // Builder-level timeout bounds the whole request, body read included;
        // the tokio timeout around send() alone would not cover a server that
        // returns headers and then stalls the body.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("daybrief/0.1.0")
            .build()
            .context("Failed to build HTTP client for the generation engine")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout_seconds: config.timeout_seconds,
        })
    }
}

impl AnalysisEngine for LLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        info!(
            model = %self.model,
            prompt_chars = prompt.len(),
            "requesting analysis from generation engine"
        );

        let response = timeout(
            Duration::from_secs(self.timeout_seconds),
            self.client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request)
                .send(),
        )
        .await
        .map_err(|_| {
            anyhow::anyhow!(
                "generation request timed out after {} seconds",
                self.timeout_seconds
            )
        })?
        .context("generation request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(anyhow::anyhow!(
                "generation API returned {}: {}",
                status,
                body
            ));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("failed to decode generation response")?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| anyhow::anyhow!("generation response contained no content"))?;

        info!(chars = content.len(), "analysis generated");
        Ok(content)
    }
}

/// Run one generation request, absorbing any failure into a fallback body.
///
/// This is a local-recovery boundary: the returned string is always non-empty
/// and usable as a report body, so a generation failure still produces a
/// delivered report that explains itself.
pub async fn run_analysis<E: AnalysisEngine>(engine: &E, prompt: &str) -> String {
    match engine.generate(prompt).await {
        Ok(text) => text,
        Err(err) => {
            error!("analysis generation failed: {err:#}");
            format!("{ANALYSIS_FALLBACK_MARKER}: {err:#}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingEngine;

    impl AnalysisEngine for FailingEngine {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(anyhow::anyhow!("quota exceeded"))
        }
    }

    struct EchoEngine;

    impl AnalysisEngine for EchoEngine {
        async fn generate(&self, prompt: &str) -> Result<String> {
            Ok(format!("analysis of: {prompt}"))
        }
    }

    #[tokio::test]
    async fn test_engine_failure_is_absorbed_into_fallback_body() {
        let body = run_analysis(&FailingEngine, "prompt").await;

        assert!(!body.is_empty());
        assert!(body.contains(ANALYSIS_FALLBACK_MARKER));
        assert!(body.contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_successful_generation_passes_through() {
        let body = run_analysis(&EchoEngine, "market data").await;

        assert_eq!(body, "analysis of: market data");
        assert!(!body.contains(ANALYSIS_FALLBACK_MARKER));
    }

    #[tokio::test]
    async fn test_generation_timeout_covers_a_stalled_body() {
        use crate::config::EngineConfig;
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // Server that answers the headers, promises a body, and stalls.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stall server");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(
                        b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 4096\r\n\r\n",
                    )
                    .await;
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
        });

        let config = EngineConfig {
            api_key: "test-key".to_string(),
            base_url: format!("http://{addr}"),
            model: "gemini-pro".to_string(),
            timeout_seconds: 1,
        };
        let client = LLMClient::new(&config).expect("client");

        let result = timeout(Duration::from_secs(5), client.generate("prompt"))
            .await
            .expect("generate must return within its own timeout, not hang on the body");
        assert!(result.is_err());
    }
}
