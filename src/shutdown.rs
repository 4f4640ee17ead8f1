use tokio::task::JoinHandle;
use tracing::{info, warn};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
#[cfg(windows)]
use tokio::signal::windows::{ctrl_break, ctrl_c};

/// Exit status after an interrupt, as shells report it for SIGINT
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Exit the process when the user interrupts it.
///
/// Both blocking waits (the OAuth redirect and the console prompt) run on the
/// blocking pool, so this task gets to run while they are pending.
pub fn watch_for_interrupt() -> JoinHandle<()> {
    tokio::spawn(async {
        match wait_for_signal().await {
            Ok(name) => {
                info!("Received {}, aborting", name);
                eprintln!("\nInterrupted.");
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
            Err(e) => warn!("Could not install signal handlers: {}", e),
        }
    })
}

/// Platform-specific signal handling implementation
#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => Ok("SIGTERM"),
        _ = sigint.recv() => Ok("SIGINT"),
    }
}

/// Platform-specific signal handling implementation
#[cfg(windows)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    let mut ctrlc = ctrl_c()?;
    let mut ctrlbreak = ctrl_break()?;

    tokio::select! {
        _ = ctrlc.recv() => Ok("Ctrl+C"),
        _ = ctrlbreak.recv() => Ok("Ctrl+Break"),
    }
}
