//! Alerts raised by the pollers.

use std::io::Write;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Audible cue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chime {
    /// Two-phase chime for orders waiting on staff
    NewOrder,
    /// One-shot cue when a tracked order is ready
    Celebration,
}

impl Chime {
    pub fn phases(&self) -> usize {
        match self {
            Chime::NewOrder => 2,
            Chime::Celebration => 1,
        }
    }
}

/// Sink for poller alerts
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait Notifier: Send + Sync {
    fn chime(&self, chime: Chime);

    fn toast(&self, message: &str);
}

/// Rings the terminal bell and logs toasts.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn chime(&self, chime: Chime) {
        let mut stdout = std::io::stdout().lock();
        for _ in 0..chime.phases() {
            if let Err(e) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
                tracing::debug!(error = %e, "Terminal bell failed");
                return;
            }
        }
    }

    fn toast(&self, message: &str) {
        tracing::info!(target: "toast", "{}", message);
    }
}
