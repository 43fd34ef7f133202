//! Pane content capture.

use crate::error::TmuxError;
use crate::executor::TmuxCommandRunner;

const DEFAULT_CAPTURE_LINES: u32 = 10;

/// Capture the last ~10 lines of a pane's visible content as a single
/// newline-joined string (`tmux capture-pane -t <id> -p -S -10`).
pub fn capture(runner: &impl TmuxCommandRunner, pane_id: &str) -> Result<String, TmuxError> {
    capture_lines(runner, pane_id, DEFAULT_CAPTURE_LINES)
}

pub fn capture_lines(
    runner: &impl TmuxCommandRunner,
    pane_id: &str,
    lines: u32,
) -> Result<String, TmuxError> {
    let start_line = format!("-{lines}");
    runner.run(&["capture-pane", "-p", "-S", &start_line, "-t", pane_id])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_passes_pane_id_and_dash_s_window() {
        struct MockRunner;
        impl TmuxCommandRunner for MockRunner {
            fn run(&self, args: &[&str]) -> Result<String, TmuxError> {
                assert!(args.contains(&"capture-pane"));
                assert!(args.contains(&"-p"));
                assert!(args.contains(&"-10"));
                assert!(args.contains(&"%3"));
                Ok("line 1\nline 2\nline 3".to_string())
            }
        }
        let content = capture(&MockRunner, "%3").expect("should capture");
        assert_eq!(content, "line 1\nline 2\nline 3");
    }

    #[test]
    fn capture_lines_uses_custom_window() {
        struct MockRunner;
        impl TmuxCommandRunner for MockRunner {
            fn run(&self, args: &[&str]) -> Result<String, TmuxError> {
                assert!(args.contains(&"-50"));
                Ok(String::new())
            }
        }
        capture_lines(&MockRunner, "%0", 50).expect("should capture");
    }

    #[test]
    fn capture_propagates_command_failure() {
        struct FailingRunner;
        impl TmuxCommandRunner for FailingRunner {
            fn run(&self, _args: &[&str]) -> Result<String, TmuxError> {
                Err(TmuxError::CommandFailed("no such pane".to_string()))
            }
        }
        let err = capture(&FailingRunner, "%9").unwrap_err();
        assert!(matches!(err, TmuxError::CommandFailed(_)));
    }
}
