//! kvfetch CLI Application
//!
//! Fetches the secrets named in `config.yml` (or `SECRET_MAP`) from Azure Key
//! Vault and writes them to `secrets.yaml`.

// The final status line is the one intentional stdout write
#![allow(clippy::print_stdout, clippy::print_stderr)]

use kvfetch::cli::{self, Cli, EXIT_OK, EXIT_RUNTIME, exit_code_for, render_error};
use kvfetch::logging;
use kvfetch_azure::AzureConnector;

fn main() {
    // NOTE: Using eprintln! in panic hook is intentional - tracing infrastructure
    // may be corrupted during a panic, so we use the most reliable output method.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();
    logging::init(cli.log_level, cli.log_format);

    let exit_code = run_with_tokio(&cli);
    std::process::exit(exit_code);
}

/// Create a single-threaded runtime and run the pipeline on it
fn run_with_tokio(cli: &Cli) -> i32 {
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Fatal error: Failed to create tokio runtime: {e}");
            return EXIT_RUNTIME;
        }
    };

    match rt.block_on(kvfetch::run(cli, &AzureConnector::new())) {
        Ok(path) => {
            println!("Secrets have been written to {}", path.display());
            EXIT_OK
        }
        Err(err) => {
            render_error(&err);
            exit_code_for(&err)
        }
    }
}
