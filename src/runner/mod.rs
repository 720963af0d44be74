mod executor;

use crate::scenario::{BrowserOptions, Scenario};
use crate::{Error, EvidenceDir, Result};
use eoka::{Browser, Page};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Outcome of one verification run.
#[derive(Debug)]
pub struct RunReport {
    /// Whether every step completed.
    pub success: bool,
    /// What went wrong, if anything. A single "interaction failed" category;
    /// the message carries the detail.
    pub error: Option<String>,
    /// Number of steps that completed before the run ended.
    pub steps_executed: usize,
    /// Every screenshot written, in capture order (diagnostic one included).
    pub captures: Vec<PathBuf>,
    /// Total wall-clock duration.
    pub duration_ms: u64,
}

/// Drives a headless browser through verification scenarios.
pub struct Runner {
    browser: Browser,
    page: Page,
}

impl Runner {
    /// Launch the browser and open a blank page.
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        let stealth = eoka::StealthConfig {
            headless: options.headless,
            user_agent: options.user_agent.clone(),
            viewport_width: options.viewport.as_ref().map(|v| v.width).unwrap_or(1280),
            viewport_height: options.viewport.as_ref().map(|v| v.height).unwrap_or(720),
            ..Default::default()
        };

        debug!("launching browser (headless: {})", options.headless);
        let browser = Browser::launch_with_config(stealth).await?;
        let page = browser.new_page("about:blank").await?;

        Ok(Self { browser, page })
    }

    /// The page the runner drives (for embedding in other tooling).
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Run a scenario to completion or first failure.
    ///
    /// Step failures never propagate as `Err`: they end the run, trigger the
    /// best-effort diagnostic capture, and come back inside the report. Only
    /// evidence-directory setup errors return `Err`.
    pub async fn run(&mut self, scenario: &Scenario) -> Result<RunReport> {
        let start = Instant::now();
        let mut evidence = EvidenceDir::create(&scenario.evidence.dir)?;

        let (steps_executed, outcome) = self.run_steps(scenario, &mut evidence).await;

        let error = match outcome {
            Ok(()) => None,
            Err(e) => {
                warn!("run failed after {} steps: {}", steps_executed, e);
                self.capture_failure(scenario, &mut evidence).await;
                Some(e.to_string())
            }
        };

        Ok(RunReport {
            success: error.is_none(),
            error,
            steps_executed,
            captures: evidence.into_captures(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn run_steps(
        &self,
        scenario: &Scenario,
        evidence: &mut EvidenceDir,
    ) -> (usize, Result<()>) {
        info!("navigating to: {}", scenario.target.url);
        let goto = tokio::time::timeout(
            Duration::from_millis(scenario.target.timeout_ms),
            self.page.goto(&scenario.target.url),
        );
        match goto.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return (0, Err(e.into())),
            Err(_) => {
                return (
                    0,
                    Err(Error::Timeout(format!(
                        "initial navigation to {} exceeded {}ms",
                        scenario.target.url, scenario.target.timeout_ms
                    ))),
                );
            }
        }

        let mut executed = 0;
        for (i, step) in scenario.steps.iter().enumerate() {
            debug!("step {}: {}", i + 1, step.name());
            if let Err(e) = executor::execute(&self.page, step, evidence).await {
                return (executed, Err(e));
            }
            executed += 1;
        }

        (executed, Ok(()))
    }

    /// Best-effort diagnostic screenshot. Never masks the original failure.
    async fn capture_failure(&self, scenario: &Scenario, evidence: &mut EvidenceDir) {
        let name = scenario
            .failure_capture_name()
            .replace("{timestamp}", &chrono::Utc::now().format("%Y%m%dT%H%M%S").to_string());
        info!("saving diagnostic screenshot: {}", name);
        match self.page.screenshot().await {
            Ok(png) => {
                if let Err(e) = evidence.capture(&name, &png) {
                    warn!("failed to save diagnostic screenshot: {}", e);
                }
            }
            Err(e) => warn!("failed to take diagnostic screenshot: {}", e),
        }
    }

    /// Close the browser. Must run on every exit path.
    pub async fn close(self) -> Result<()> {
        self.browser.close().await?;
        Ok(())
    }
}
