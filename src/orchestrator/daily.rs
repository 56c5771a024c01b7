//! Daily review orchestrator
//! Runs the pipeline in strict sequence and owns the top-level failure
//! boundary that redirects a diagnostic alert to the operator.

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::{
    config::Config,
    data::{aggregate, RunWindow, SeriesSource},
    llm::{run_analysis, AnalysisEngine},
    notify::{DeliveryChannel, Notification},
    review::ReviewPrompts,
};

/// Daily review orchestrator, generic over the three collaborator boundaries.
pub struct DailyOrchestrator<S, E, N> {
    config: Config,
    source: S,
    engine: E,
    notifier: N,
}

impl<S, E, N> DailyOrchestrator<S, E, N>
where
    S: SeriesSource,
    E: AnalysisEngine,
    N: DeliveryChannel,
{
    pub fn new(config: Config, source: S, engine: E, notifier: N) -> Self {
        Self {
            config,
            source,
            engine,
            notifier,
        }
    }

    fn window(&self) -> RunWindow {
        RunWindow::for_run_date(
            self.config.effective_run_date(),
            self.config.pipeline.lookback_days,
        )
    }

    /// One full pipeline run: aggregate → prompt → generate → deliver.
    ///
    /// Per-series and generation failures are absorbed at their own
    /// boundaries and degrade the report; an error escaping here is
    /// structural.
    pub async fn run(&self) -> Result<()> {
        let window = self.window();
        info!(
            start = %window.start_compact(),
            end = %window.end_compact(),
            "🌅 starting daily review run"
        );

        info!("📊 aggregating data series...");
        let bundle = aggregate(&self.source, &window).await;

        let prompt = ReviewPrompts::daily_review_prompt(&bundle, &window);

        info!("💡 generating analysis...");
        let body = run_analysis(&self.engine, &prompt).await;

        self.display_report(&window, &body);

        info!("📧 delivering report...");
        let notification = Notification::report(&window, body, &self.config.mail.recipient);
        match self.notifier.send(&notification).await {
            Ok(()) => info!("report delivered to {}", notification.recipient),
            Err(e) if self.config.pipeline.fail_on_delivery_error => {
                return Err(e).context("report delivery failed");
            }
            Err(e) => {
                // Best effort: the analysis was produced and printed above,
                // so a delivery failure alone does not fail the run.
                error!("report delivery failed (continuing): {e:#}");
            }
        }

        info!("✅ daily review run complete");
        Ok(())
    }

    /// Run the pipeline behind the top-level failure boundary.
    ///
    /// On a structural failure this sends a diagnostic alert to the
    /// operator's own address, then returns the original error so the
    /// process exits non-zero. A failed alert delivery is only logged -
    /// it is the end of the failure chain.
    pub async fn run_to_completion(&self) -> Result<()> {
        match self.run().await {
            Ok(()) => Ok(()),
            Err(err) => {
                error!("daily review run failed: {err:#}");

                let alert =
                    Notification::failure_alert(&self.window(), &err, &self.config.mail.sender);
                match self.notifier.send(&alert).await {
                    Ok(()) => info!("failure alert delivered to {}", alert.recipient),
                    Err(alert_err) => {
                        error!("failure alert delivery failed: {alert_err:#}");
                    }
                }

                Err(err)
            }
        }
    }

    fn display_report(&self, window: &RunWindow, body: &str) {
        println!("\n=== DAILY MARKET REVIEW ({}) ===", window.end_compact());
        println!("{body}");
        println!("{}", "=".repeat(50));
    }
}
