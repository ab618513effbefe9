/// Conduit CLI
///
/// Validates and runs pipeline models from the command line. The process exit
/// status is 0 when every pipeline succeeded and 1 otherwise.

use conduit_core::cli;

#[tokio::main]
async fn main() {
    match cli::run_cli().await {
        Ok(exit) => std::process::exit(exit.code()),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
