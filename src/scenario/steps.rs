use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// A target element, addressed by CSS selector or by visible text.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Locator {
    /// CSS selector.
    pub selector: Option<String>,
    /// Visible text of the element to find.
    pub text: Option<String>,
}

impl Locator {
    /// True when neither addressing mode is set.
    pub fn is_empty(&self) -> bool {
        self.selector.is_none() && self.text.is_none()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.selector, &self.text) {
            (Some(s), _) => write!(f, "selector '{}'", s),
            (_, Some(t)) => write!(f, "text '{}'", t),
            _ => write!(f, "unspecified"),
        }
    }
}

/// One step of a verification scenario.
///
/// Steps run in order; the first failure aborts the run and triggers the
/// diagnostic capture.
#[derive(Debug, Clone)]
pub enum Step {
    // Navigation
    Goto(GotoStep),

    // Waiting
    Wait(WaitStep),
    WaitFor(WaitForStep),
    WaitForVisible(WaitForStep),
    WaitForText(WaitForTextStep),
    WaitForUrl(WaitForUrlStep),
    WaitForNetworkIdle(WaitForNetworkIdleStep),

    // Interaction
    Click(ClickStep),
    TryClick(ClickStep),
    ClickAt(ClickAtStep),

    // JavaScript
    Execute(ExecuteStep),

    // Evidence
    Screenshot(ScreenshotStep),
    Log(LogStep),

    // Assertions
    AssertText(AssertTextStep),
    AssertSelector(AssertSelectorStep),
    AssertUrl(AssertUrlStep),
}

impl Step {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Goto(_) => "goto",
            Self::Wait(_) => "wait",
            Self::WaitFor(_) => "wait_for",
            Self::WaitForVisible(_) => "wait_for_visible",
            Self::WaitForText(_) => "wait_for_text",
            Self::WaitForUrl(_) => "wait_for_url",
            Self::WaitForNetworkIdle(_) => "wait_for_network_idle",
            Self::Click(_) => "click",
            Self::TryClick(_) => "try_click",
            Self::ClickAt(_) => "click_at",
            Self::Execute(_) => "execute",
            Self::Screenshot(_) => "screenshot",
            Self::Log(_) => "log",
            Self::AssertText(_) => "assert_text",
            Self::AssertSelector(_) => "assert_selector",
            Self::AssertUrl(_) => "assert_url",
        }
    }
}

const STEP_NAMES: &[&str] = &[
    "goto",
    "wait",
    "wait_for",
    "wait_for_visible",
    "wait_for_text",
    "wait_for_url",
    "wait_for_network_idle",
    "click",
    "try_click",
    "click_at",
    "execute",
    "screenshot",
    "log",
    "assert_text",
    "assert_selector",
    "assert_url",
];

impl<'de> Deserialize<'de> for Step {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(StepVisitor)
    }
}

struct StepVisitor;

impl<'de> Visitor<'de> for StepVisitor {
    type Value = Step;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a step map with a single key")
    }

    fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let key: String = map
            .next_key()?
            .ok_or_else(|| de::Error::custom("expected step type key"))?;

        let step = match key.as_str() {
            "goto" => Step::Goto(map.next_value()?),
            "wait" => Step::Wait(map.next_value()?),
            "wait_for" => Step::WaitFor(map.next_value()?),
            "wait_for_visible" => Step::WaitForVisible(map.next_value()?),
            "wait_for_text" => Step::WaitForText(map.next_value()?),
            "wait_for_url" => Step::WaitForUrl(map.next_value()?),
            "wait_for_network_idle" => Step::WaitForNetworkIdle(map.next_value()?),
            "click" => Step::Click(map.next_value()?),
            "try_click" => Step::TryClick(map.next_value()?),
            "click_at" => Step::ClickAt(map.next_value()?),
            "execute" => Step::Execute(map.next_value()?),
            "screenshot" => Step::Screenshot(map.next_value()?),
            "log" => Step::Log(map.next_value()?),
            "assert_text" => Step::AssertText(map.next_value()?),
            "assert_selector" => Step::AssertSelector(map.next_value()?),
            "assert_url" => Step::AssertUrl(map.next_value()?),
            other => return Err(de::Error::unknown_variant(other, STEP_NAMES)),
        };

        Ok(step)
    }
}

// --- Step payloads ---

fn default_goto_timeout_ms() -> u64 {
    60_000
}
fn default_idle_ms() -> u64 {
    500
}
fn default_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct GotoStep {
    pub url: String,
    #[serde(default = "default_goto_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaitStep {
    pub ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaitForStep {
    pub selector: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaitForTextStep {
    pub text: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaitForUrlStep {
    pub contains: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaitForNetworkIdleStep {
    #[serde(default = "default_idle_ms")]
    pub idle_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClickStep {
    #[serde(flatten)]
    pub locator: Locator,
}

/// Coordinate click, resolved through `document.elementFromPoint`.
///
/// Brittle by nature (viewport-dependent). Prefer `click` with a selector;
/// this exists for flows where the control lives inside a canvas and has no
/// DOM identity of its own.
#[derive(Debug, Clone, Deserialize)]
pub struct ClickAtStep {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteStep {
    pub js: String,
}

/// Capture a named checkpoint into the evidence directory.
#[derive(Debug, Clone, Deserialize)]
pub struct ScreenshotStep {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogStep {
    pub message: String,
}

/// Exactly one of `text` (substring) or `regex` must be set.
#[derive(Debug, Clone, Deserialize)]
pub struct AssertTextStep {
    pub text: Option<String>,
    pub regex: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssertSelectorStep {
    pub selector: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssertUrlStep {
    pub contains: String,
}
