//! `TmuxPaneInfo`, the `list-panes` format string, and its parser.
//!
//! The wire record carries all 15 fields named in the discovery contract;
//! `to_raw_pane` projects the 4 fields the core domain actually needs.

use tmux_monitor_core::RawPane;

use crate::error::TmuxError;
use crate::executor::TmuxCommandRunner;

/// Pipe-delimited format string for `tmux list-panes -F`, 15 fields.
pub const LIST_PANES_FORMAT: &str = "#{pane_id}|#{pane_active}|#{pane_current_command}|#{pane_title}|#{session_name}|#{window_index}|#{window_name}|#{pane_index}|#{pane_tty}|#{pane_pid}|#{pane_current_path}|#{window_zoomed_flag}|#{pane_width}|#{pane_height}|#{pane_start_command}";

const FIELD_COUNT: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TmuxPaneInfo {
    pub pane_id: String,
    pub active: String,
    pub current_command: String,
    pub title: String,
    pub session_name: String,
    pub window_index: String,
    pub window_name: String,
    pub pane_index: String,
    pub tty: String,
    pub pid: String,
    pub current_path: String,
    pub zoomed: String,
    pub width: String,
    pub height: String,
    pub start_command: String,
}

impl TmuxPaneInfo {
    /// Project down to the subset the core domain's `Pane` is built from.
    pub fn to_raw_pane(&self) -> RawPane {
        RawPane {
            pane_id: self.pane_id.clone(),
            active: self.active.clone(),
            current_command: self.current_command.clone(),
            title: self.title.clone(),
        }
    }
}

/// Execute `tmux list-panes -F <FORMAT>`, optionally scoped to one session,
/// and parse the output. An empty session name targets every session
/// (`-a`).
pub fn discover_panes(
    runner: &impl TmuxCommandRunner,
    session_name: Option<&str>,
) -> Result<Vec<TmuxPaneInfo>, TmuxError> {
    let output = match session_name {
        Some(session) => runner.run(&["list-panes", "-t", session, "-F", LIST_PANES_FORMAT])?,
        None => runner.run(&["list-panes", "-a", "-F", LIST_PANES_FORMAT])?,
    };
    parse_list_panes_output(&output)
}

pub fn parse_list_panes_output(output: &str) -> Result<Vec<TmuxPaneInfo>, TmuxError> {
    let mut panes = Vec::new();
    for (idx, line) in output.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        panes.push(parse_line(trimmed, idx + 1)?);
    }
    Ok(panes)
}

fn parse_line(line: &str, line_num: usize) -> Result<TmuxPaneInfo, TmuxError> {
    let parts: Vec<&str> = line.split('|').collect();
    if parts.len() < FIELD_COUNT {
        return Err(TmuxError::ParseError {
            line_num,
            detail: format!(
                "expected {FIELD_COUNT} pipe-separated fields, got {}",
                parts.len()
            ),
        });
    }

    Ok(TmuxPaneInfo {
        pane_id: parts[0].to_string(),
        active: parts[1].to_string(),
        current_command: parts[2].to_string(),
        title: parts[3].to_string(),
        session_name: parts[4].to_string(),
        window_index: parts[5].to_string(),
        window_name: parts[6].to_string(),
        pane_index: parts[7].to_string(),
        tty: parts[8].to_string(),
        pid: parts[9].to_string(),
        current_path: parts[10].to_string(),
        zoomed: parts[11].to_string(),
        width: parts[12].to_string(),
        height: parts[13].to_string(),
        start_command: parts[14].to_string(),
    })
}
