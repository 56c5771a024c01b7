use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub engine: EngineConfig,
    pub mail: MailConfig,
    pub pipeline: PipelineConfig,
}

/// Generative engine (OpenAI-compatible chat completions API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub sender: String,
    pub password: String,
    pub recipient: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub provider_base_url: String,
    pub lookback_days: i64,
    pub fetch_timeout_seconds: u64,
    /// Whether a failed report delivery fails the whole run.
    pub fail_on_delivery_error: bool,

    // Pinned run date (set from the CLI, not from env vars)
    #[serde(skip)]
    pub run_date: Option<NaiveDate>,
}

impl Config {
    /// Returns the date the run is anchored to: the pinned date if one was
    /// given on the command line, otherwise today (UTC).
    pub fn effective_run_date(&self) -> NaiveDate {
        self.pipeline
            .run_date
            .unwrap_or_else(|| chrono::Utc::now().date_naive())
    }

    pub fn load() -> Result<Self> {
        // Load .env file - this sets env vars that aren't already set
        dotenv::dotenv().ok();

        // The four required secrets. Missing any of them is fatal before any
        // network activity happens.
        let api_key = env::var("GEMINI_API_KEY")
            .context("GEMINI_API_KEY environment variable is required but not set")?;
        let sender = env::var("EMAIL_USER")
            .context("EMAIL_USER environment variable is required but not set")?;
        let password = env::var("EMAIL_PASSWORD")
            .context("EMAIL_PASSWORD environment variable is required but not set")?;
        let recipient = env::var("TO_EMAIL")
            .context("TO_EMAIL environment variable is required but not set")?;

        let config = Config {
            engine: EngineConfig {
                api_key,
                base_url: env::var("ENGINE_BASE_URL").unwrap_or_else(|_| {
                    "https://generativelanguage.googleapis.com/v1beta/openai".to_string()
                }),
                model: env::var("ENGINE_MODEL").unwrap_or_else(|_| "gemini-pro".to_string()),
                timeout_seconds: env::var("ENGINE_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "120".to_string())
                    .parse()
                    .context("Invalid ENGINE_TIMEOUT_SECONDS value")?,
            },
            mail: MailConfig {
                smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.163.com".to_string()),
                smtp_port: env::var("SMTP_PORT")
                    .unwrap_or_else(|_| "465".to_string())
                    .parse()
                    .context("Invalid SMTP_PORT value")?,
                sender,
                password,
                recipient,
            },
            pipeline: PipelineConfig {
                provider_base_url: env::var("PROVIDER_BASE_URL")
                    .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string()),
                lookback_days: env::var("LOOKBACK_DAYS")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()
                    .context("Invalid LOOKBACK_DAYS value")?,
                fetch_timeout_seconds: env::var("FETCH_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .context("Invalid FETCH_TIMEOUT_SECONDS value")?,
                fail_on_delivery_error: env::var("FAIL_ON_DELIVERY_ERROR")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()
                    .context("Invalid FAIL_ON_DELIVERY_ERROR value (use true/false)")?,
                // Run date is not loaded from env vars - set from the CLI
                run_date: None,
            },
        };

        if config.pipeline.lookback_days < 1 {
            return Err(anyhow::anyhow!(
                "LOOKBACK_DAYS must be at least 1, got {}",
                config.pipeline.lookback_days
            ));
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig {
                api_key: String::new(),
                base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
                model: "gemini-pro".to_string(),
                timeout_seconds: 120,
            },
            mail: MailConfig {
                smtp_host: "smtp.163.com".to_string(),
                smtp_port: 465,
                sender: String::new(),
                password: String::new(),
                recipient: String::new(),
            },
            pipeline: PipelineConfig {
                provider_base_url: "http://127.0.0.1:8080".to_string(),
                lookback_days: 3,
                fetch_timeout_seconds: 30,
                fail_on_delivery_error: false,
                run_date: None,
            },
        }
    }
}
