use clap::Parser;

use app::{cli, telemetry};

#[tokio::main]
async fn main() {
    telemetry::init();
    let cli = cli::Cli::parse();

    if let Err(err) = cli::execute(cli).await {
        tracing::error!(error = %err, "command failed");
        eprintln!("{err}");
        std::process::exit(2);
    }
}
