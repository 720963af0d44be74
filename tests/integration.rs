//! Integration tests for the verification runner
//!
//! These tests require Chrome to be installed and available.
//! Run with: cargo test --test integration -- --ignored

use proofshot::{Runner, Scenario};
use std::path::{Path, PathBuf};

/// Check if Chrome is available
fn chrome_available() -> bool {
    eoka::stealth::patcher::find_chrome().is_ok()
}

fn scratch_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("proofshot-it-{}-{}", label, std::process::id()))
}

fn assert_png(path: &Path) {
    let bytes = std::fs::read(path).unwrap_or_else(|e| panic!("missing {}: {}", path.display(), e));
    assert!(bytes.len() > 100, "{} is suspiciously small", path.display());
    assert_eq!(&bytes[0..4], &[0x89, 0x50, 0x4E, 0x47]); // PNG signature
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_successful_run_writes_both_checkpoints() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let dir = scratch_dir("success");
    let yaml = format!(
        r#"
name: "Canvas smoke"
target:
  url: 'data:text/html,<canvas id="game" width="300" height="300"></canvas>'
evidence:
  dir: "{dir}"
steps:
  - wait_for_visible:
      selector: "canvas"
      timeout_ms: 5000
  - screenshot:
      name: "before_start"
  - click:
      selector: "canvas"
  - wait:
      ms: 200
  - screenshot:
      name: "after_start"
"#,
        dir = dir.display()
    );
    let scenario = Scenario::parse(&yaml).expect("Failed to parse scenario");

    let mut runner = Runner::launch(&scenario.browser)
        .await
        .expect("Failed to launch browser");
    let report = runner.run(&scenario).await.expect("Run errored at setup");
    runner.close().await.expect("Failed to close browser");

    assert!(report.success, "report: {:?}", report);
    assert_eq!(report.steps_executed, 5);
    assert_eq!(report.captures.len(), 2);
    assert_png(&dir.join("before_start.png"));
    assert_png(&dir.join("after_start.png"));
    assert!(
        !dir.join("error.png").exists(),
        "no diagnostic capture expected on success"
    );

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_failing_run_writes_diagnostic_capture() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let dir = scratch_dir("failure");
    // Page with no canvas: the readiness wait has to time out.
    let yaml = format!(
        r#"
name: "Missing canvas"
target:
  url: 'data:text/html,<p>no game here</p>'
evidence:
  dir: "{dir}"
steps:
  - wait_for_visible:
      selector: "canvas"
      timeout_ms: 1500
  - screenshot:
      name: "before_start"
on_failure:
  screenshot: "error"
"#,
        dir = dir.display()
    );
    let scenario = Scenario::parse(&yaml).expect("Failed to parse scenario");

    let mut runner = Runner::launch(&scenario.browser)
        .await
        .expect("Failed to launch browser");
    let report = runner.run(&scenario).await.expect("Run errored at setup");
    runner.close().await.expect("Failed to close browser");

    assert!(!report.success);
    assert!(report.error.is_some());
    assert_eq!(report.steps_executed, 0);
    assert_png(&dir.join("error.png"));
    assert!(
        !dir.join("before_start.png").exists(),
        "checkpoint after the failed step must not exist"
    );

    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_click_by_text_and_assertions() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let dir = scratch_dir("click-text");
    let yaml = format!(
        r##"
name: "Start button"
target:
  url: 'data:text/html,<button id="start" onclick="this.textContent = String(27)">Start</button>'
evidence:
  dir: "{dir}"
steps:
  - click:
      text: "Start"
  - wait:
      ms: 100
  - assert_text:
      regex: "\\d+"
  - assert_selector:
      selector: "#start"
"##,
        dir = dir.display()
    );
    let scenario = Scenario::parse(&yaml).expect("Failed to parse scenario");

    let mut runner = Runner::launch(&scenario.browser)
        .await
        .expect("Failed to launch browser");
    let report = runner.run(&scenario).await.expect("Run errored at setup");
    runner.close().await.expect("Failed to close browser");

    assert!(report.success, "report: {:?}", report);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_click_at_coordinate() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let dir = scratch_dir("click-at");
    let yaml = format!(
        r#"
name: "Coordinate click"
target:
  url: 'data:text/html,<style>body {{ margin: 0 }}</style><button style="position:absolute;left:100px;top:300px;width:60px;height:60px" onclick="document.title = String(42)">go</button>'
evidence:
  dir: "{dir}"
steps:
  - click_at:
      x: 128
      y: 330
  - wait:
      ms: 100
"#,
        dir = dir.display()
    );
    let scenario = Scenario::parse(&yaml).expect("Failed to parse scenario");

    let mut runner = Runner::launch(&scenario.browser)
        .await
        .expect("Failed to launch browser");
    let report = runner.run(&scenario).await.expect("Run errored at setup");

    let title = runner.page().title().await.expect("Failed to read title");

    runner.close().await.expect("Failed to close browser");

    assert!(report.success, "report: {:?}", report);
    assert_eq!(title, "42");
    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_click_at_delivers_coordinates() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let dir = scratch_dir("click-at-coords");
    // Canvas-style handler: reads the pointer position instead of relying on
    // a DOM target, like a game reacting to a click inside its canvas.
    let yaml = format!(
        r#"
name: "Coordinate delivery"
target:
  url: 'data:text/html,<body style="margin:0"><script>addEventListener("mousedown", e => document.title = e.clientX + ":" + e.clientY)</script></body>'
evidence:
  dir: "{dir}"
steps:
  - click_at:
      x: 128
      y: 330
  - wait:
      ms: 100
"#,
        dir = dir.display()
    );
    let scenario = Scenario::parse(&yaml).expect("Failed to parse scenario");

    let mut runner = Runner::launch(&scenario.browser)
        .await
        .expect("Failed to launch browser");
    let report = runner.run(&scenario).await.expect("Run errored at setup");

    let title = runner.page().title().await.expect("Failed to read title");

    runner.close().await.expect("Failed to close browser");

    assert!(report.success, "report: {:?}", report);
    assert_eq!(title, "128:330");
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_unreachable_target_reports_failure() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let dir = scratch_dir("unreachable");
    // Nothing listens on this port; navigation fails or times out either way.
    let yaml = format!(
        r#"
name: "Dead server"
target:
  url: "http://127.0.0.1:59999/"
  timeout_ms: 5000
evidence:
  dir: "{dir}"
steps:
  - screenshot:
      name: "before_start"
"#,
        dir = dir.display()
    );
    let scenario = Scenario::parse(&yaml).expect("Failed to parse scenario");

    let mut runner = Runner::launch(&scenario.browser)
        .await
        .expect("Failed to launch browser");
    let report = runner.run(&scenario).await.expect("Run errored at setup");
    runner.close().await.expect("Failed to close browser");

    assert!(!report.success);
    assert_eq!(report.steps_executed, 0);
    std::fs::remove_dir_all(&dir).ok();
}
