use super::params::{self, ParamDef, Params};
use super::steps::Step;
use crate::{Error, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// A declarative verification scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Name of this scenario.
    pub name: String,

    /// Parameter definitions (optional).
    #[serde(default)]
    pub params: HashMap<String, ParamDef>,

    /// Browser launch options.
    #[serde(default)]
    pub browser: BrowserOptions,

    /// URL the run starts at.
    pub target: Target,

    /// Where screenshots are written.
    #[serde(default)]
    pub evidence: EvidenceConfig,

    /// Steps to execute after the initial navigation.
    #[serde(default)]
    pub steps: Vec<Step>,

    /// Failure handling (optional).
    pub on_failure: Option<OnFailure>,
}

impl Scenario {
    /// Load a scenario from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse_with_params(&content, &Params::new())
    }

    /// Load a scenario from a YAML file with parameters.
    pub fn load_with_params<P: AsRef<Path>>(path: P, params: &Params) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse_with_params(&content, params)
    }

    /// Parse a scenario from a YAML string (no params).
    pub fn parse(yaml: &str) -> Result<Self> {
        Self::parse_with_params(yaml, &Params::new())
    }

    /// Parse a scenario from a YAML string with parameter substitution.
    pub fn parse_with_params(yaml: &str, params: &Params) -> Result<Self> {
        // First pass: parse as Value to pick up the param definitions
        let mut value: serde_yaml::Value = serde_yaml::from_str(yaml)?;

        let defs: HashMap<String, ParamDef> = value
            .get("params")
            .and_then(|v| serde_yaml::from_value(v.clone()).ok())
            .unwrap_or_default();

        // Substitute ${var} everywhere, then deserialize for real
        params::substitute_value(&mut value, params, &defs)?;

        let scenario: Scenario = serde_yaml::from_value(value)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Checkpoint names declared by the scenario's screenshot steps, in order.
    pub fn checkpoint_names(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter_map(|s| match s {
                Step::Screenshot(s) => Some(s.name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Checkpoint name for the diagnostic screenshot taken when the run fails.
    pub fn failure_capture_name(&self) -> &str {
        self.on_failure
            .as_ref()
            .and_then(|f| f.screenshot.as_deref())
            .unwrap_or("error")
    }

    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::Scenario("name is required".into()));
        }
        if self.target.url.is_empty() {
            return Err(Error::Scenario("target.url is required".into()));
        }
        for step in &self.steps {
            Self::validate_step(step)?;
        }
        Ok(())
    }

    fn validate_step(step: &Step) -> Result<()> {
        match step {
            Step::Click(s) | Step::TryClick(s) => {
                if s.locator.is_empty() {
                    return Err(Error::Scenario(format!(
                        "{}: either selector or text must be provided",
                        step.name()
                    )));
                }
            }
            Step::AssertText(s) => match (&s.text, &s.regex) {
                (None, None) => {
                    return Err(Error::Scenario(
                        "assert_text: either text or regex must be provided".into(),
                    ));
                }
                (Some(_), Some(_)) => {
                    return Err(Error::Scenario(
                        "assert_text: specify text or regex, not both".into(),
                    ));
                }
                (None, Some(re)) => {
                    Regex::new(re).map_err(|e| {
                        Error::Scenario(format!("assert_text: invalid regex: {}", e))
                    })?;
                }
                (Some(_), None) => {}
            },
            Step::Screenshot(s) => {
                if s.name.is_empty() {
                    return Err(Error::Scenario("screenshot: name is required".into()));
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Browser launch options.
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserOptions {
    /// Run without a visible window. On by default: verification runs are
    /// meant for CI and scripted checks.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Custom user agent.
    pub user_agent: Option<String>,

    /// Viewport size.
    pub viewport: Option<Viewport>,
}

fn default_headless() -> bool {
    true
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            user_agent: None,
            viewport: None,
        }
    }
}

/// Viewport dimensions.
#[derive(Debug, Clone, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Where a run starts.
#[derive(Debug, Clone, Deserialize)]
pub struct Target {
    /// URL to navigate to.
    pub url: String,

    /// Navigation timeout for the initial load.
    #[serde(default = "default_target_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_target_timeout_ms() -> u64 {
    60_000
}

/// Evidence output location. Files are overwritten on each run.
#[derive(Debug, Clone, Deserialize)]
pub struct EvidenceConfig {
    #[serde(default = "default_evidence_dir")]
    pub dir: String,
}

fn default_evidence_dir() -> String {
    "verification".into()
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            dir: default_evidence_dir(),
        }
    }
}

/// Failure handling.
#[derive(Debug, Clone, Deserialize)]
pub struct OnFailure {
    /// Checkpoint name for the diagnostic screenshot (supports `{timestamp}`).
    pub screenshot: Option<String>,
}
