//! tmux-monitor-tmux: the synchronous tmux IO boundary. Wraps
//! `std::process::Command` invocations of `tmux list-panes`,
//! `capture-pane` and `send-keys` behind mock-injectable traits so the
//! engine can be driven and tested without a real tmux server.

pub mod capture;
pub mod communicator;
pub mod error;
pub mod executor;
pub mod pane_info;

pub use capture::{capture, capture_lines};
pub use communicator::{PaneCommunicator, StartupCandidate, TmuxPaneCommunicator};
pub use error::TmuxError;
pub use executor::{TmuxCommandRunner, TmuxExecutor};
pub use pane_info::{discover_panes, parse_list_panes_output, TmuxPaneInfo, LIST_PANES_FORMAT};
