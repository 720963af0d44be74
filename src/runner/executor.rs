use crate::scenario::{Locator, Step};
use crate::{Error, EvidenceDir, Result};
use eoka::Page;
use regex::Regex;
use std::time::Duration;
use tracing::{debug, info};

/// Execute a single step on the page.
pub async fn execute(page: &Page, step: &Step, evidence: &mut EvidenceDir) -> Result<()> {
    match step {
        Step::Goto(s) => {
            info!("goto: {}", s.url);
            let nav = tokio::time::timeout(Duration::from_millis(s.timeout_ms), page.goto(&s.url));
            match nav.await {
                Ok(result) => result?,
                Err(_) => {
                    return Err(Error::Timeout(format!(
                        "navigation to {} exceeded {}ms",
                        s.url, s.timeout_ms
                    )));
                }
            }
        }
        Step::Wait(s) => {
            debug!("wait: {}ms", s.ms);
            page.wait(s.ms).await;
        }
        Step::WaitFor(s) => {
            debug!("wait_for: {}", s.selector);
            page.wait_for(&s.selector, s.timeout_ms).await?;
        }
        Step::WaitForVisible(s) => {
            debug!("wait_for_visible: {}", s.selector);
            page.wait_for_visible(&s.selector, s.timeout_ms).await?;
        }
        Step::WaitForText(s) => {
            debug!("wait_for_text: '{}'", s.text);
            page.wait_for_text(&s.text, s.timeout_ms).await?;
        }
        Step::WaitForUrl(s) => {
            debug!("wait_for_url: contains '{}'", s.contains);
            page.wait_for_url_contains(&s.contains, s.timeout_ms).await?;
        }
        Step::WaitForNetworkIdle(s) => {
            debug!(
                "wait_for_network_idle: idle={}ms, timeout={}ms",
                s.idle_ms, s.timeout_ms
            );
            page.wait_for_network_idle(s.idle_ms, s.timeout_ms).await?;
        }
        Step::Click(s) => {
            info!("click: {}", s.locator);
            let selector = resolve_locator(page, &s.locator).await?;
            page.click(&selector).await?;
        }
        Step::TryClick(s) => {
            debug!("try_click: {}", s.locator);
            if let Ok(selector) = resolve_locator(page, &s.locator).await {
                let _ = page.try_click(&selector).await;
            }
        }
        Step::ClickAt(s) => {
            info!("click_at: ({}, {})", s.x, s.y);
            click_at(page, s.x, s.y).await?;
        }
        Step::Execute(s) => {
            debug!("execute: {}...", preview(&s.js));
            page.execute(&s.js).await?;
        }
        Step::Screenshot(s) => {
            info!("screenshot: {}", s.name);
            let png = page.screenshot().await?;
            evidence.capture(&s.name, &png)?;
        }
        Step::Log(s) => {
            info!("[log] {}", s.message);
        }
        Step::AssertText(s) => {
            let body = page.text().await?;
            if let Some(ref needle) = s.text {
                debug!("assert_text: '{}'", needle);
                if !body.contains(needle) {
                    return Err(Error::Assertion(format!("text '{}' not found", needle)));
                }
            } else if let Some(ref pattern) = s.regex {
                debug!("assert_text: /{}/", pattern);
                let re = Regex::new(pattern)
                    .map_err(|e| Error::Scenario(format!("assert_text: invalid regex: {}", e)))?;
                if !re.is_match(&body) {
                    return Err(Error::Assertion(format!(
                        "no text matching /{}/",
                        pattern
                    )));
                }
            }
        }
        Step::AssertSelector(s) => {
            debug!("assert_selector: {}", s.selector);
            if !element_exists(page, &s.selector).await? {
                return Err(Error::Assertion(format!(
                    "no element matching '{}'",
                    s.selector
                )));
            }
        }
        Step::AssertUrl(s) => {
            debug!("assert_url: contains '{}'", s.contains);
            let url = page.url().await?;
            if !url.contains(&s.contains) {
                return Err(Error::Assertion(format!(
                    "url '{}' does not contain '{}'",
                    url, s.contains
                )));
            }
        }
    }
    Ok(())
}

/// Resolve a Locator to a CSS selector.
pub async fn resolve_locator(page: &Page, locator: &Locator) -> Result<String> {
    if let Some(ref sel) = locator.selector {
        return Ok(sel.clone());
    }
    if let Some(ref txt) = locator.text {
        let js = format!(
            r#"(() => {{
    const needle = {needle}.toLowerCase();
    const walker = document.createTreeWalker(document.body, NodeFilter.SHOW_ELEMENT, null);
    while (walker.nextNode()) {{
        const el = walker.currentNode;
        if (!el.matches('a, button, input, select, [role="button"], [onclick]')) continue;
        if (!el.textContent?.trim().toLowerCase().includes(needle)) continue;
        if (el.id) return '#' + el.id;
        const path = [];
        let node = el;
        while (node && node !== document.body) {{
            if (node.id) {{
                path.unshift('#' + node.id);
                break;
            }}
            let part = node.tagName.toLowerCase();
            const siblings = Array.from(node.parentNode?.children || []);
            if (siblings.length > 1) part += ':nth-child(' + (siblings.indexOf(node) + 1) + ')';
            path.unshift(part);
            node = node.parentNode;
        }}
        return path.join(' > ');
    }}
    return null;
}})()"#,
            needle = serde_json::to_string(txt).unwrap()
        );
        let found: Option<String> = page.evaluate(&js).await?;
        if let Some(sel) = found {
            return Ok(sel);
        }
        return Err(Error::Step(format!("element with text '{}' not found", txt)));
    }
    Err(Error::Step("either selector or text must be provided".into()))
}

/// Click whatever element sits at viewport coordinates (x, y).
///
/// Dispatches a full pointer/mouse event sequence carrying the coordinates,
/// so canvas input handlers that read `clientX`/`clientY` see the real
/// position. Depends on the viewport matching the scenario author's
/// assumptions; selector-based `click` is the reliable form.
async fn click_at(page: &Page, x: f64, y: f64) -> Result<()> {
    let js = format!(
        r#"(() => {{
    const el = document.elementFromPoint({x}, {y});
    if (!el) return false;
    const opts = {{
        clientX: {x},
        clientY: {y},
        button: 0,
        bubbles: true,
        cancelable: true,
        view: window,
    }};
    for (const type of ['pointerdown', 'mousedown', 'pointerup', 'mouseup', 'click']) {{
        const ev = type.startsWith('pointer')
            ? new PointerEvent(type, opts)
            : new MouseEvent(type, opts);
        el.dispatchEvent(ev);
    }}
    return true;
}})()"#
    );
    let hit: bool = page.evaluate(&js).await?;
    if !hit {
        return Err(Error::Step(format!("no element at ({}, {})", x, y)));
    }
    Ok(())
}

async fn element_exists(page: &Page, selector: &str) -> Result<bool> {
    let js = format!(
        "!!document.querySelector({})",
        serde_json::to_string(selector).unwrap()
    );
    Ok(page.evaluate(&js).await?)
}

/// First 50 characters of a script for logging, cut on a char boundary.
fn preview(js: &str) -> &str {
    match js.char_indices().nth(50) {
        Some((i, _)) => &js[..i],
        None => js,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_script_untouched() {
        assert_eq!(preview("window.scrollTo(0, 0)"), "window.scrollTo(0, 0)");
    }

    #[test]
    fn test_preview_truncates_at_fifty_chars() {
        let js = "x".repeat(80);
        assert_eq!(preview(&js), "x".repeat(50));
    }

    #[test]
    fn test_preview_multibyte_at_boundary() {
        // 49 ASCII chars followed by multibyte ones: byte 50 falls inside
        // a character, which a naive byte slice would panic on.
        let js = format!("{}ééé", "x".repeat(49));
        assert_eq!(preview(&js), format!("{}é", "x".repeat(49)));
    }
}
