use anyhow::Result;
use iot_portal::app::App;
use iot_portal::cli;
use std::sync::Arc;
use tokio::runtime::Runtime;

fn main() -> Result<()> {
    // Process CLI arguments first (before logging init for cleaner output)
    let runtime_options = match cli::process_cli() {
        cli::CliResult::Exit(code) => {
            if code == 0 {
                return Ok(());
            }
            std::process::exit(code);
        }
        cli::CliResult::Continue(options) => options,
    };
    // Route log::info!() etc. to the debug log file (mirrored to stderr when RUST_LOG is set).
    // --log-level wins, then RUST_LOG, then the config level (applied in App::new).
    iot_portal::debug::init_log_bridge(runtime_options.log_level);

    log::info!("Starting iot-portal {}", iot_portal::VERSION);

    // Create Tokio runtime for request tasks and the console loop
    let runtime = Arc::new(Runtime::new()?);

    let result = App::new(Arc::clone(&runtime), runtime_options).and_then(App::run);

    // Drop the runtime explicitly so in-flight blocking requests cannot hold
    // the process open past their timeout.
    log::info!("Shutting down runtime");
    if let Ok(rt) = Arc::try_unwrap(runtime) {
        rt.shutdown_timeout(std::time::Duration::from_secs(2));
    }

    match result {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("iot-portal: error: {e:#}");
            Err(e)
        }
    }
}
