//! CLI surface (spec §6 / §9). Parses the accepted options and turns
//! them into an engine-ready `MonitoringOptions`. The engine crate never
//! sees argv directly — it only consumes the config record this module
//! builds.

use chrono::{DateTime, Local, NaiveTime, TimeZone, Utc};
use clap::Parser;
use tmux_monitor_engine::{
    MonitoringOptions, DEFAULT_CYCLE_INTERVAL_MS, DEFAULT_MAX_CAPTURE_RETRIES,
    DEFAULT_MAX_CLEAR_RETRIES, DEFAULT_MAX_RUNTIME_MS,
};

#[derive(Parser)]
#[command(
    name = "tmux-monitor",
    about = "Supervises a tmux session: classifies pane activity, clears idle panes, reports status"
)]
pub struct Cli {
    /// Run one monitoring cycle and exit, instead of looping continuously.
    #[arg(long = "onetime", short = 'o')]
    pub onetime: bool,

    /// Scheduled start time, `HH:MM` in the local wall clock. A time
    /// already in the past today is treated as "start immediately".
    #[arg(long = "time", short = 't', value_name = "HH:MM")]
    pub time: Option<String>,

    /// Path to an instruction file consulted by the startup-injection
    /// step (contract only; the core does not read its contents).
    #[arg(long = "instruction", short = 'i', value_name = "PATH")]
    pub instruction: Option<std::path::PathBuf>,

    /// Run the Clear Protocol against eligible panes this cycle, then exit.
    #[arg(long)]
    pub clear: bool,

    /// Administrative one-shot: clear every pane in the session regardless
    /// of role or status, bypassing the Monitoring Engine entirely.
    #[arg(long = "clear-all")]
    pub clear_all: bool,

    /// Administrative one-shot: kill every pane but the active one,
    /// bypassing the Monitoring Engine entirely.
    #[arg(long = "kill-all-panes")]
    pub kill_all_panes: bool,

    /// Inject the startup invocation into blank interactive shells this
    /// cycle, then exit.
    #[arg(long = "start-claude")]
    pub start_claude: bool,

    /// Scope discovery to a single tmux session instead of every session.
    #[arg(long)]
    pub session: Option<String>,

    /// Seconds between monitoring cycles in continuous mode.
    #[arg(long = "cycle-interval-secs", default_value_t = DEFAULT_CYCLE_INTERVAL_MS / 1000)]
    pub cycle_interval_secs: u64,

    /// Hard wall-clock runtime cap, in hours, measured from the scheduled
    /// (or actual) start.
    #[arg(long = "max-runtime-hours", default_value_t = DEFAULT_MAX_RUNTIME_MS / 3_600_000)]
    pub max_runtime_hours: u64,

    /// Log what the Clear Protocol would do without sending any keys.
    #[arg(long = "dry-run-clear")]
    pub dry_run_clear: bool,
}

impl Cli {
    /// Builds the engine's `MonitoringOptions` from parsed arguments.
    /// Fails only if `--time` cannot be parsed as `HH:MM`.
    pub fn to_monitoring_options(&self) -> anyhow::Result<MonitoringOptions> {
        let scheduled_start = match &self.time {
            Some(raw) => Some(parse_scheduled_time(raw)?),
            None => None,
        };

        Ok(MonitoringOptions {
            continuous: !self.onetime,
            scheduled_start,
            instruction_file: self.instruction.clone(),
            kill_all_panes: self.kill_all_panes,
            clear_panes: self.clear,
            clear_all_panes: self.clear_all,
            start_interactive: self.start_claude,
            cycle_interval_ms: self.cycle_interval_secs * 1000,
            max_runtime_ms: self.max_runtime_hours * 3_600_000,
            max_capture_retries: DEFAULT_MAX_CAPTURE_RETRIES,
            max_clear_retries: DEFAULT_MAX_CLEAR_RETRIES,
            session: self.session.clone(),
            dry_run_clear: self.dry_run_clear,
        })
    }
}

/// Parses `HH:MM` against today's local date. A result already in the
/// past is still returned as-is — the engine's `sleep_until` treats a
/// past instant as "start immediately" (§9 open question, fixed here).
fn parse_scheduled_time(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    let naive_time = NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|e| anyhow::anyhow!("invalid --time value {raw:?}, expected HH:MM: {e}"))?;
    let today = Local::now().date_naive();
    let naive = today.and_time(naive_time);
    let local = Local
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| anyhow::anyhow!("ambiguous local time for --time {raw:?}"))?;
    Ok(local.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_time_of_day() {
        let parsed = parse_scheduled_time("09:30").expect("valid HH:MM");
        let local = parsed.with_timezone(&Local);
        assert_eq!(local.format("%H:%M").to_string(), "09:30");
    }

    #[test]
    fn rejects_malformed_time() {
        assert!(parse_scheduled_time("9:30am").is_err());
        assert!(parse_scheduled_time("25:00").is_err());
    }

    #[test]
    fn clear_flag_forces_one_shot_via_monitoring_options() {
        let cli = Cli {
            onetime: false,
            time: None,
            instruction: None,
            clear: true,
            clear_all: false,
            kill_all_panes: false,
            start_claude: false,
            session: None,
            cycle_interval_secs: 30,
            max_runtime_hours: 4,
            dry_run_clear: false,
        };
        let opts = cli.to_monitoring_options().unwrap();
        assert!(opts.is_one_shot());
    }
}
