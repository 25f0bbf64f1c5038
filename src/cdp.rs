//! Chrome DevTools Protocol session implementation

use crate::session::PageSession;
use crate::{Error, Result, SessionConfig};
use anyhow::Context;
use headless_chrome::browser::tab::Tab;
use headless_chrome::{Browser, LaunchOptions};
use log::debug;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Resolves to "ready" once `document.fonts.ready` settles, or "timeout"
const FONTS_READY_TEMPLATE: &str = r#"(async function () {
    const timeout = new Promise(function (resolve) {
        setTimeout(function () { resolve('timeout'); }, {{TIMEOUT_MS}});
    });
    const ready = document.fonts ? document.fonts.ready.then(function () { return 'ready'; }) : Promise.resolve('ready');
    return await Promise.race([ready, timeout]);
})()"#;

/// Resolves to "ready" once every running animation has finished, or "timeout"
const ANIMATIONS_DONE_TEMPLATE: &str = r#"(async function () {
    const timeout = new Promise(function (resolve) {
        setTimeout(function () { resolve('timeout'); }, {{TIMEOUT_MS}});
    });
    const running = document.getAnimations ? document.getAnimations() : [];
    const finite = running.filter(function (a) {
        const timing = a.effect && a.effect.getComputedTiming ? a.effect.getComputedTiming() : null;
        return !timing || timing.endTime !== Infinity;
    });
    const done = Promise.all(finite.map(function (a) { return a.finished.catch(function () {}); }))
        .then(function () { return 'ready'; });
    return await Promise.race([done, timeout]);
})()"#;

/// Headless Chrome session over a single tab (uses the `headless_chrome` crate)
pub struct CdpSession {
    browser: Browser,
    tab: Arc<Tab>,
    config: SessionConfig,
}

impl CdpSession {
    /// Evaluate a readiness script and translate "timeout" into `Error::Timeout`
    fn wait_for(&self, template: &str, what: &str, timeout: Duration) -> Result<()> {
        let ms = timeout.as_millis() as u64;
        let script = template.replace("{{TIMEOUT_MS}}", &ms.to_string());
        let result = self
            .tab
            .evaluate(&script, true)
            .with_context(|| format!("Waiting for {} failed", what))?;

        match result.value.as_ref().and_then(|v| v.as_str()) {
            Some("timeout") => Err(Error::Timeout(ms)),
            _ => {
                debug!("{} ready", what);
                Ok(())
            }
        }
    }
}

impl PageSession for CdpSession {
    fn open(config: SessionConfig) -> Result<Self>
    where
        Self: Sized,
    {
        let launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .path(config.chrome_path.clone())
            .build()
            .map_err(|e| Error::Session(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::Session(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::Session(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(Duration::from_millis(config.timeout_ms));

        debug!(
            "browser ready ({}x{}, headless={})",
            config.viewport.width, config.viewport.height, config.headless
        );
        Ok(Self {
            browser,
            tab,
            config,
        })
    }

    fn load_file(&mut self, path: &Path) -> Result<()> {
        let absolute = path.canonicalize().map_err(|e| Error::io(path, e))?;
        let url = url::Url::from_file_path(&absolute)
            .map_err(|_| Error::Session(format!("Not a loadable path: {}", absolute.display())))?;

        self.tab
            .navigate_to(url.as_str())
            .with_context(|| format!("Navigation to {} failed", url))?;
        self.tab
            .wait_until_navigated()
            .context("Wait for navigation failed")?;

        // Late network activity (web fonts, images) after the load event
        std::thread::sleep(Duration::from_millis(self.config.settle_ms));
        Ok(())
    }

    fn wait_for_fonts(&mut self, timeout: Duration) -> Result<()> {
        self.wait_for(FONTS_READY_TEMPLATE, "fonts", timeout)
    }

    fn wait_for_animations(&mut self, timeout: Duration) -> Result<()> {
        self.wait_for(ANIMATIONS_DONE_TEMPLATE, "animations", timeout)
    }

    fn evaluate(&mut self, script: &str) -> Result<serde_json::Value> {
        let result = self.tab.evaluate(script, false).context("Evaluation failed")?;

        // Scripts return JSON.stringify'd payloads to avoid CDP object previews
        match result.value {
            Some(serde_json::Value::String(s)) => Ok(serde_json::from_str(&s)
                .unwrap_or(serde_json::Value::String(s))),
            Some(other) => Ok(other),
            None => Ok(serde_json::Value::Null),
        }
    }

    fn close(self) -> Result<()> {
        // Dropping the browser terminates the child process
        drop(self.tab);
        drop(self.browser);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readiness_scripts_take_the_timeout() {
        for template in [FONTS_READY_TEMPLATE, ANIMATIONS_DONE_TEMPLATE] {
            let script = template.replace("{{TIMEOUT_MS}}", "1500");
            assert!(script.contains("1500"));
            assert!(!script.contains("{{"));
        }
    }

    #[test]
    fn test_cdp_session_creation() {
        // This test requires Chrome to be installed, so we skip it in CI
        if std::env::var("CI").is_ok() {
            return;
        }
        let result = CdpSession::open(SessionConfig::default());
        match result {
            Ok(session) => assert!(session.close().is_ok()),
            Err(e) => eprintln!(
                "Skipping CDP session creation test because Chrome is not available or failed to launch: {}",
                e
            ),
        }
    }
}
