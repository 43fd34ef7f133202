//! `PaneCommunicator`: key injection into panes over `tmux send-keys`.
//!
//! This crate is a synchronous IO boundary — every wait here is a plain
//! `std::thread::sleep`, not the cancellation token's preemptible sleep.
//! The engine checks the token before dispatching each call; per §5,
//! `send-keys`/`capture-pane` invocations rely on the transport's own
//! deadline, not on mid-call cancellation.

use std::thread::sleep;
use std::time::Duration;

use crate::error::TmuxError;
use crate::executor::TmuxCommandRunner;

const CLEAR_MACRO_GAP: Duration = Duration::from_millis(200);
const STARTUP_GAP: Duration = Duration::from_millis(500);

const INTERACTIVE_SHELLS: &[&str] = &["zsh", "bash", "sh", "fish"];
const STARTUP_INVOCATION: &str = "cld";

/// The subset of a discovered pane `startInteractiveIfAbsent` needs to
/// decide whether to inject the startup invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupCandidate {
    pub pane_id: String,
    pub current_command: String,
}

pub trait PaneCommunicator: Send + Sync {
    /// Injects literal text without pressing Enter.
    fn send_message(&self, pane_id: &str, text: &str) -> Result<(), TmuxError>;

    /// Injects literal text and presses Enter. A `text` of exactly the
    /// single byte `0x1B` is sent as the named `Escape` key instead of
    /// literal text, and Enter is not pressed afterward.
    fn send_command(&self, pane_id: &str, text: &str) -> Result<(), TmuxError>;

    /// The fixed macro: Escape, wait 200ms, Escape, Tab, wait 200ms,
    /// "/clear", wait 200ms, Enter.
    fn send_clear_command(&self, pane_id: &str) -> Result<(), TmuxError>;

    /// Sends a single named tmux key (`"Escape"`, `"Enter"`, `"Tab"`,
    /// `"C-l"`, ...). Used by the Clear Protocol's non-DirectClear
    /// strategies to compose their own sequences with their own
    /// cancellation-aware inter-step waits.
    fn send_key(&self, pane_id: &str, key_name: &str) -> Result<(), TmuxError>;

    /// Best-effort startup injection (§4.8 step 4). Errors for individual
    /// panes are swallowed; this call never fails the caller.
    fn start_interactive_if_absent(&self, panes: &[StartupCandidate]);
}

pub struct TmuxPaneCommunicator<R> {
    runner: R,
}

impl<R: TmuxCommandRunner> TmuxPaneCommunicator<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    fn send_literal(&self, pane_id: &str, text: &str) -> Result<(), TmuxError> {
        self.runner.run(&["send-keys", "-t", pane_id, "-l", "--", text])?;
        Ok(())
    }

    fn send_named(&self, pane_id: &str, key_name: &str) -> Result<(), TmuxError> {
        self.runner.run(&["send-keys", "-t", pane_id, key_name])?;
        Ok(())
    }
}

impl<R: TmuxCommandRunner> PaneCommunicator for TmuxPaneCommunicator<R> {
    fn send_message(&self, pane_id: &str, text: &str) -> Result<(), TmuxError> {
        self.send_literal(pane_id, text)
    }

    fn send_command(&self, pane_id: &str, text: &str) -> Result<(), TmuxError> {
        if text == "\u{1b}" {
            return self.send_named(pane_id, "Escape");
        }
        self.send_literal(pane_id, text)?;
        self.send_named(pane_id, "Enter")
    }

    fn send_clear_command(&self, pane_id: &str) -> Result<(), TmuxError> {
        self.send_named(pane_id, "Escape")?;
        sleep(CLEAR_MACRO_GAP);
        self.send_named(pane_id, "Escape")?;
        self.send_named(pane_id, "Tab")?;
        sleep(CLEAR_MACRO_GAP);
        self.send_literal(pane_id, "/clear")?;
        sleep(CLEAR_MACRO_GAP);
        self.send_named(pane_id, "Enter")
    }

    fn send_key(&self, pane_id: &str, key_name: &str) -> Result<(), TmuxError> {
        self.send_named(pane_id, key_name)
    }

    fn start_interactive_if_absent(&self, panes: &[StartupCandidate]) {
        for candidate in panes {
            if !needs_startup_invocation(&candidate.current_command) {
                continue;
            }
            if self.send_literal(&candidate.pane_id, STARTUP_INVOCATION).is_err() {
                continue;
            }
            sleep(STARTUP_GAP);
            let _ = self.send_named(&candidate.pane_id, "Enter");
        }
    }
}

fn needs_startup_invocation(current_command: &str) -> bool {
    let lower = current_command.to_ascii_lowercase();
    if lower.contains("claude") || lower.contains("cld") {
        return false;
    }
    INTERACTIVE_SHELLS.iter().any(|shell| lower == *shell)
}
