use std::net::IpAddr;
use std::thread;

use clap::Parser;
use osc_visualiser_core::config::DEFAULT_PORT;
use osc_visualiser_core::{
    AppConfig, CancelToken, CrosstermTerminal, EventIngest, IntervalClock, OscListener, Scheduler,
    SharedState,
};
use tracing_subscriber::EnvFilter;

fn main() -> osc_visualiser_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::live_defaults().with_listen(cli.ip, cli.port);
    config.validate()?;

    run_live(&config)
}

fn run_live(config: &AppConfig) -> osc_visualiser_core::Result<()> {
    let state = SharedState::new(&config.render);

    // Bind before touching the terminal so a busy port is reported on a
    // normal screen.
    let listener = OscListener::bind(config.listen.socket_addr(), EventIngest::new(state.clone()))
        .map_err(|err| {
            tracing::error!(%err, "cannot start OSC listener");
            err
        })?;
    tracing::info!(addr = %listener.local_addr(), "listening for OSC events");

    let terminal = CrosstermTerminal::enter()?;
    let clock = IntervalClock::new(config.render.tick_interval());
    let mut scheduler = Scheduler::new(state, terminal, clock, config.render.clone());
    // SIGINT/SIGTERM end the loop like a quit key, so the terminal is still
    // restored and the listener stopped below.
    if let Err(err) = cancel_on_signal(scheduler.cancel_token()) {
        tracing::warn!(%err, "cannot watch for termination signals");
    }
    let outcome = scheduler.run();

    // Restores the terminal before the listener goes away.
    drop(scheduler);
    listener.stop();
    let summary = outcome?;
    tracing::info!(ticks = summary.ticks, reason = ?summary.reason, "shut down cleanly");
    Ok(())
}

/// Cancels `token` from a background thread once the process is asked to
/// terminate.
fn cancel_on_signal(token: CancelToken) -> std::io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    thread::Builder::new()
        .name("signal-watch".to_string())
        .spawn(move || match runtime.block_on(shutdown_signal()) {
            Ok(()) => {
                tracing::info!("termination signal received, stopping render loop");
                token.cancel();
            }
            Err(err) => tracing::warn!(%err, "signal handler failed"),
        })?;
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

fn init_tracing() {
    // stdout belongs to the renderer; logs go to stderr.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "OSC ASCII visualiser for TidalCycles", long_about = None)]
struct Cli {
    /// IP address to listen on.
    #[arg(long, default_value = "0.0.0.0")]
    ip: IpAddr,
    /// UDP port to listen on (6010 is Tidal's default).
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,
}
