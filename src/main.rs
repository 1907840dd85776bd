//! dbx-bridge - Databricks catalog metadata and SQL samples as JSON.

use dbx_bridge::cli::Cli;
use dbx_bridge::{app, logging, output};
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    logging::init_stderr_logging();

    let cli = Cli::parse_args();

    match app::run(&cli)
        .await
        .and_then(|document| output::render(&document))
    {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!("{}: {}", e.category(), e);
            println!("{}", output::error_document(&e));
            std::process::exit(1);
        }
    }
}
