//! tmux-monitor: supervisor binary. Parses CLI arguments, wires the
//! tmux IO boundary and the Monitoring Engine together, and owns the
//! process's exit code and signal handling — none of which the engine
//! crate concerns itself with.

use std::sync::Arc;

use clap::Parser;
use tmux_monitor_core::CancellationToken;
use tmux_monitor_engine::{Engine, EngineOutcome};
use tmux_monitor_tmux::{TmuxCommandRunner, TmuxExecutor, TmuxPaneCommunicator};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    init_logging();

    let runner = Arc::new(TmuxExecutor::default());

    if args.kill_all_panes {
        return run_kill_all_panes(&runner, args.session.as_deref());
    }
    if args.clear_all {
        return run_clear_all(&runner, args.session.as_deref());
    }

    let options = args.to_monitoring_options()?;
    let communicator = Arc::new(TmuxPaneCommunicator::new(TmuxExecutor::default()));
    let token = CancellationToken::new();

    let shutdown_token = token.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        shutdown_token.cancel("signal received");
    });

    let engine = Engine::new(runner, communicator, options, token);
    match engine.run().await {
        Ok(EngineOutcome::Cancelled { reason }) => {
            tracing::info!(reason, "tmux-monitor stopped: cancelled");
            Ok(())
        }
        Ok(EngineOutcome::RuntimeLimitExceeded) => {
            tracing::info!("tmux-monitor stopped: runtime limit exceeded");
            Ok(())
        }
        Ok(EngineOutcome::OneShotCompleted) => {
            tracing::info!("tmux-monitor finished one-shot run");
            Ok(())
        }
        Err(err) => {
            tracing::error!(%err, "tmux-monitor stopped: fatal error");
            Err(anyhow::anyhow!(err))
        }
    }
}

fn init_logging() {
    let filter = std::env::var("LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, watching ctrl-c only");
                ctrl_c.await.ok();
                return;
            }
        };
        tokio::select! {
            _ = ctrl_c => tracing::info!("received ctrl-c"),
            _ = sigterm.recv() => tracing::info!("received SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        tracing::info!("received ctrl-c");
    }
}

/// Administrative one-shot (§6, §9): kills every pane but the active one
/// in the target session, bypassing the Monitoring Engine entirely.
fn run_kill_all_panes(runner: &TmuxExecutor, session: Option<&str>) -> anyhow::Result<()> {
    let panes = tmux_monitor_tmux::discover_panes(runner, session)?;
    for pane in &panes {
        if pane.active == "1" {
            continue;
        }
        runner.execute_raw(&["kill-pane", "-t", pane.pane_id.as_str()])?;
        tracing::info!(pane = %pane.pane_id, "killed pane");
    }
    Ok(())
}

/// Administrative one-shot (§6, §9): sends the clear macro to every pane
/// in the target session regardless of role or status, bypassing the
/// Monitoring Engine's eligibility rules entirely.
fn run_clear_all(runner: &TmuxExecutor, session: Option<&str>) -> anyhow::Result<()> {
    let panes = tmux_monitor_tmux::discover_panes(runner, session)?;
    let communicator = TmuxPaneCommunicator::new(TmuxExecutor::default());
    for pane in &panes {
        use tmux_monitor_tmux::PaneCommunicator;
        communicator.send_clear_command(&pane.pane_id)?;
        tracing::info!(pane = %pane.pane_id, "sent clear macro");
    }
    Ok(())
}
