//! # proofshot
//!
//! Scripted browser verification. Describe a checkpointed interaction
//! scenario in YAML, drive a headless browser through it, and keep the
//! screenshots as evidence.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use proofshot::{Runner, Scenario};
//!
//! # #[tokio::main]
//! # async fn main() -> proofshot::Result<()> {
//! let scenario = Scenario::load("scenarios/canvas-start.yaml")?;
//! let mut runner = Runner::launch(&scenario.browser).await?;
//! let report = runner.run(&scenario).await?;
//! println!("passed: {}", report.success);
//! runner.close().await?;
//! # Ok(())
//! # }
//! ```

mod evidence;
mod runner;
mod scenario;

pub use evidence::EvidenceDir;
pub use runner::{RunReport, Runner};
pub use scenario::{
    BrowserOptions, EvidenceConfig, Locator, OnFailure, ParamDef, Params, Scenario, Step, Target,
    Viewport,
};

/// Result type for proofshot operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a scenario or driving the browser.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("scenario error: {0}")]
    Scenario(String),

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("browser error: {0}")]
    Browser(#[from] eoka::Error),

    #[error("step failed: {0}")]
    Step(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("assertion failed: {0}")]
    Assertion(String),
}
