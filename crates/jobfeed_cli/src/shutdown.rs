use console::Term;
use jobfeed::sync::StopSignal;

/// Set up the Ctrl+C handler for graceful shutdown.
///
/// The first Ctrl+C triggers `stop`: in-flight fetches drain and the current
/// page becomes the resume point. A second Ctrl+C exits immediately.
pub(crate) fn setup_shutdown_handler(stop: StopSignal) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            return;
        }

        let is_tty = Term::stdout().is_term();
        if is_tty {
            eprintln!("\n\nShutdown requested, finishing current page...");
            eprintln!("Press Ctrl+C again to force quit.");
        } else {
            tracing::warn!("Shutdown requested, finishing current page");
        }

        stop.trigger();

        // Wait for second Ctrl+C for force quit
        if tokio::signal::ctrl_c().await.is_ok() {
            if is_tty {
                eprintln!("Force quit!");
            }
            std::process::exit(130);
        }
    });
}
