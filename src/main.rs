use chatstream::cli::{parse_args, run_cli_command};
use chatstream::config::ClientConfig;
use chatstream::logging::init_logging;

use color_eyre::Result;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging();

    let command = parse_args(std::env::args());
    run_cli_command(command, ClientConfig::from_env()).await
}
