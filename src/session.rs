//! Page automation seam.
//!
//! A [`PageSession`] loads a local document into a real renderer, waits for
//! it to settle and evaluates scripts against it. The snapshot pipeline only
//! ever sees the JSON those scripts return.

use log::warn;
use std::path::Path;
use std::time::Duration;

use crate::{Error, Result, SessionConfig};

/// Core trait for page automation backends
pub trait PageSession {
    /// Start a session with the given configuration
    fn open(config: SessionConfig) -> Result<Self>
    where
        Self: Sized;

    /// Load a local document and wait until navigation settles
    fn load_file(&mut self, path: &Path) -> Result<()>;

    /// Wait for web fonts; `Error::Timeout` when `timeout` elapses first
    fn wait_for_fonts(&mut self, timeout: Duration) -> Result<()>;

    /// Wait for running animations; `Error::Timeout` when `timeout` elapses first
    fn wait_for_animations(&mut self, timeout: Duration) -> Result<()>;

    /// Evaluate a script in the page and return its JSON result
    fn evaluate(&mut self, script: &str) -> Result<serde_json::Value>;

    /// Release the session and its resources
    fn close(self) -> Result<()>;
}

/// A bounded wait that did not finish in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedOut(pub Duration);

/// Run `op` with a time bound.
///
/// `Err(Error::Timeout)` from `op` becomes `Ok(Err(TimedOut))` so callers can
/// log and proceed; every other error still propagates.
pub fn try_with_timeout<T, F>(timeout: Duration, op: F) -> Result<std::result::Result<T, TimedOut>>
where
    F: FnOnce(Duration) -> Result<T>,
{
    match op(timeout) {
        Ok(value) => Ok(Ok(value)),
        Err(Error::Timeout(_)) => Ok(Err(TimedOut(timeout))),
        Err(e) => Err(e),
    }
}

/// Wait for fonts and animations, logging and continuing on timeout
pub fn settle<S: PageSession>(session: &mut S, config: &SessionConfig) -> Result<()> {
    let fonts = Duration::from_millis(config.font_timeout_ms);
    if let Err(TimedOut(t)) = try_with_timeout(fonts, |t| session.wait_for_fonts(t))? {
        warn!("fonts not ready after {}ms, continuing", t.as_millis());
    }

    let animations = Duration::from_millis(config.animation_timeout_ms);
    if let Err(TimedOut(t)) = try_with_timeout(animations, |t| session.wait_for_animations(t))? {
        warn!("animations still running after {}ms, continuing", t.as_millis());
    }
    Ok(())
}

/// Open a session, run `f`, and close the session on every exit path.
///
/// When `f` fails its error wins; a close failure after it is only logged.
pub fn with_session<S, T, F>(config: SessionConfig, f: F) -> Result<T>
where
    S: PageSession,
    F: FnOnce(&mut S) -> Result<T>,
{
    let mut session = S::open(config)?;
    let result = f(&mut session);
    let closed = session.close();
    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            warn!("failed to close session after error: {}", close_err);
            Err(e)
        }
    }
}
