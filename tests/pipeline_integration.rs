//! End-to-end pipeline tests with stub collaborators at the three external
//! boundaries: series source, generation engine, delivery channel.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::NaiveDate;
use serde_json::json;

use daybrief::config::{Config, EngineConfig, MailConfig, PipelineConfig};
use daybrief::data::{
    DataError, DataResult, FragmentShape, RawResult, Record, RunWindow, SeriesSource, SeriesSpec,
    SERIES,
};
use daybrief::llm::{AnalysisEngine, ANALYSIS_FALLBACK_MARKER};
use daybrief::notify::{DeliveryChannel, Notification, FAILURE_LABEL, REPORT_LABEL};
use daybrief::DailyOrchestrator;

/// Create test configuration with a pinned run date
fn test_config(fail_on_delivery_error: bool) -> Config {
    Config {
        engine: EngineConfig {
            api_key: "test-key".to_string(),
            base_url: "https://engine.invalid/v1".to_string(),
            model: "gemini-pro".to_string(),
            timeout_seconds: 5,
        },
        mail: MailConfig {
            smtp_host: "smtp.invalid".to_string(),
            smtp_port: 465,
            sender: "ops@example.com".to_string(),
            password: "secret".to_string(),
            recipient: "inbox@example.com".to_string(),
        },
        pipeline: PipelineConfig {
            provider_base_url: "http://127.0.0.1:8080".to_string(),
            lookback_days: 3,
            fetch_timeout_seconds: 5,
            fail_on_delivery_error,
            run_date: Some(NaiveDate::from_ymd_opt(2026, 8, 29).expect("valid date")),
        },
    }
}

fn sample_raw(spec: &SeriesSpec) -> RawResult {
    let mut row = Record::new();
    match spec.shape {
        FragmentShape::LastField(field) => {
            row.insert(field.to_string(), json!("5.0"));
        }
        FragmentShape::NameList { field, .. } => {
            row.insert(field.to_string(), json!("AI compute"));
        }
        _ => {
            row.insert("item".to_string(), json!("close"));
            row.insert("value".to_string(), json!(3250.5));
        }
    }
    RawResult { rows: vec![row] }
}

#[derive(Default)]
struct SourceState {
    calls: AtomicUsize,
}

struct StubSource {
    state: Arc<SourceState>,
    failing: HashSet<&'static str>,
}

impl StubSource {
    fn healthy(state: Arc<SourceState>) -> Self {
        Self {
            state,
            failing: HashSet::new(),
        }
    }
}

impl SeriesSource for StubSource {
    async fn fetch(&self, spec: &SeriesSpec, _window: &RunWindow) -> DataResult<RawResult> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(spec.id) {
            return Err(DataError::Api {
                status_code: 503,
                message: "provider unavailable".to_string(),
            });
        }
        Ok(sample_raw(spec))
    }
}

#[derive(Default)]
struct EngineState {
    calls: AtomicUsize,
}

struct StubEngine {
    state: Arc<EngineState>,
    fail: bool,
}

impl AnalysisEngine for StubEngine {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow::anyhow!("engine timeout"));
        }
        Ok(format!(
            "Markets held steady. ({} chars of data reviewed)",
            prompt.len()
        ))
    }
}

#[derive(Default)]
struct NotifierState {
    calls: AtomicUsize,
    sent: Mutex<Vec<Notification>>,
}

struct StubNotifier {
    state: Arc<NotifierState>,
    fail_first: bool,
    fail_all: bool,
}

impl StubNotifier {
    fn healthy(state: Arc<NotifierState>) -> Self {
        Self {
            state,
            fail_first: false,
            fail_all: false,
        }
    }
}

impl DeliveryChannel for StubNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let call = self.state.calls.fetch_add(1, Ordering::SeqCst);
        self.state
            .sent
            .lock()
            .expect("sent lock")
            .push(notification.clone());
        if self.fail_all || (self.fail_first && call == 0) {
            return Err(anyhow::anyhow!("SMTP connection refused"));
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_missing_config_blocks_all_collaborator_calls() {
    for key in ["GEMINI_API_KEY", "EMAIL_USER", "EMAIL_PASSWORD", "TO_EMAIL"] {
        std::env::remove_var(key);
    }

    let source_state = Arc::new(SourceState::default());
    let engine_state = Arc::new(EngineState::default());
    let notifier_state = Arc::new(NotifierState::default());

    // Same guard order as the binary: the pipeline only exists after a
    // successful configuration load. If the load unexpectedly succeeded the
    // stubs would be driven and the zero-call assertions below would fail.
    if let Ok(config) = Config::load() {
        let orchestrator = DailyOrchestrator::new(
            config,
            StubSource::healthy(source_state.clone()),
            StubEngine {
                state: engine_state.clone(),
                fail: false,
            },
            StubNotifier::healthy(notifier_state.clone()),
        );
        let _ = orchestrator.run_to_completion().await;
    }

    assert_eq!(source_state.calls.load(Ordering::SeqCst), 0);
    assert_eq!(engine_state.calls.load(Ordering::SeqCst), 0);
    assert_eq!(notifier_state.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_full_run_delivers_report_to_recipient() {
    let source_state = Arc::new(SourceState::default());
    let engine_state = Arc::new(EngineState::default());
    let notifier_state = Arc::new(NotifierState::default());

    let orchestrator = DailyOrchestrator::new(
        test_config(false),
        StubSource::healthy(source_state.clone()),
        StubEngine {
            state: engine_state.clone(),
            fail: false,
        },
        StubNotifier::healthy(notifier_state.clone()),
    );

    let result = orchestrator.run_to_completion().await;
    assert!(result.is_ok());

    assert_eq!(source_state.calls.load(Ordering::SeqCst), SERIES.len());
    assert_eq!(engine_state.calls.load(Ordering::SeqCst), 1);
    assert_eq!(notifier_state.calls.load(Ordering::SeqCst), 1);

    let sent = notifier_state.sent.lock().expect("sent lock");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "inbox@example.com");
    assert_eq!(sent[0].subject, format!("20260828 {REPORT_LABEL}"));
    assert!(sent[0].body.contains("Markets held steady"));
}

#[tokio::test]
async fn test_failing_optional_series_still_produces_report() {
    let source_state = Arc::new(SourceState::default());
    let engine_state = Arc::new(EngineState::default());
    let notifier_state = Arc::new(NotifierState::default());

    let orchestrator = DailyOrchestrator::new(
        test_config(false),
        StubSource {
            state: source_state.clone(),
            failing: HashSet::from(["lhb"]),
        },
        StubEngine {
            state: engine_state.clone(),
            fail: false,
        },
        StubNotifier::healthy(notifier_state.clone()),
    );

    let result = orchestrator.run_to_completion().await;
    assert!(result.is_ok());

    // Every series was still attempted and the report still went out once
    assert_eq!(source_state.calls.load(Ordering::SeqCst), SERIES.len());
    assert_eq!(notifier_state.calls.load(Ordering::SeqCst), 1);

    let sent = notifier_state.sent.lock().expect("sent lock");
    assert!(sent[0].body.contains("Markets held steady"));
    assert!(!sent[0].body.contains(ANALYSIS_FALLBACK_MARKER));
}

#[tokio::test]
async fn test_engine_failure_delivers_fallback_report() {
    let notifier_state = Arc::new(NotifierState::default());

    let orchestrator = DailyOrchestrator::new(
        test_config(false),
        StubSource::healthy(Arc::new(SourceState::default())),
        StubEngine {
            state: Arc::new(EngineState::default()),
            fail: true,
        },
        StubNotifier::healthy(notifier_state.clone()),
    );

    let result = orchestrator.run_to_completion().await;
    assert!(result.is_ok(), "an absorbed engine failure must not fail the run");

    assert_eq!(notifier_state.calls.load(Ordering::SeqCst), 1);
    let sent = notifier_state.sent.lock().expect("sent lock");
    assert!(!sent[0].body.is_empty());
    assert!(sent[0].body.contains(ANALYSIS_FALLBACK_MARKER));
    assert_eq!(sent[0].recipient, "inbox@example.com");
}

#[tokio::test]
async fn test_delivery_failure_is_best_effort_by_default() {
    let notifier_state = Arc::new(NotifierState::default());

    let orchestrator = DailyOrchestrator::new(
        test_config(false),
        StubSource::healthy(Arc::new(SourceState::default())),
        StubEngine {
            state: Arc::new(EngineState::default()),
            fail: false,
        },
        StubNotifier {
            state: notifier_state.clone(),
            fail_first: false,
            fail_all: true,
        },
    );

    let result = orchestrator.run_to_completion().await;
    assert!(result.is_ok());

    // No failure alert is attempted: the run did not fail
    assert_eq!(notifier_state.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_escalated_delivery_failure_alerts_the_operator() {
    let notifier_state = Arc::new(NotifierState::default());

    let orchestrator = DailyOrchestrator::new(
        test_config(true),
        StubSource::healthy(Arc::new(SourceState::default())),
        StubEngine {
            state: Arc::new(EngineState::default()),
            fail: false,
        },
        StubNotifier {
            state: notifier_state.clone(),
            fail_first: true,
            fail_all: false,
        },
    );

    let result = orchestrator.run_to_completion().await;
    assert!(result.is_err(), "escalation policy must fail the run");

    // First attempt was the report, second the diagnostic alert
    assert_eq!(notifier_state.calls.load(Ordering::SeqCst), 2);
    let sent = notifier_state.sent.lock().expect("sent lock");
    assert_eq!(sent[1].recipient, "ops@example.com");
    assert!(sent[1].subject.contains(FAILURE_LABEL));
    assert!(sent[1].subject.starts_with("20260828"));
    assert!(sent[1].body.contains("report delivery failed"));
}

#[tokio::test]
async fn test_failed_alert_delivery_is_the_end_of_the_chain() {
    let notifier_state = Arc::new(NotifierState::default());

    let orchestrator = DailyOrchestrator::new(
        test_config(true),
        StubSource::healthy(Arc::new(SourceState::default())),
        StubEngine {
            state: Arc::new(EngineState::default()),
            fail: false,
        },
        StubNotifier {
            state: notifier_state.clone(),
            fail_first: false,
            fail_all: true,
        },
    );

    let result = orchestrator.run_to_completion().await;

    // The original failure is reported even though the alert also failed
    assert!(result.is_err());
    assert_eq!(notifier_state.calls.load(Ordering::SeqCst), 2);
}
