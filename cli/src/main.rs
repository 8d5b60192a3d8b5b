use std::process::ExitCode;

use clap::Parser;
use dirwatch_cli::{Cli, init_logging, run};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:?}");
            ExitCode::from(2)
        }
    }
}
