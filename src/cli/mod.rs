//! CLI module for chatstream.
//!
//! - Argument parsing
//! - Version display
//! - Session commands (`login`, `logout`, `whoami`)
//! - Chat commands (`conversations`, `chat`, `render`)
//!
//! # Usage
//!
//! ```ignore
//! use chatstream::cli::{parse_args, run_cli_command};
//! use chatstream::config::ClientConfig;
//!
//! let command = parse_args(std::env::args());
//! if let Err(e) = run_cli_command(command, ClientConfig::from_env()).await {
//!     eprintln!("Error: {}", e);
//!     std::process::exit(1);
//! }
//! ```

pub mod args;
pub mod chat;
pub mod session;
pub mod version;

pub use args::{parse_args, CliCommand, USAGE};
pub use chat::{handle_chat, handle_conversations, handle_render};
pub use session::{handle_login, handle_logout, handle_whoami};
pub use version::{version_line, VERSION};

use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::ApiError;

/// Report an API failure with its user-facing text on top.
pub(crate) fn api_failure(err: ApiError) -> color_eyre::eyre::Report {
    let message = err.user_message();
    color_eyre::eyre::Report::new(err).wrap_err(message)
}

/// Run a parsed command, writing results to stdout.
pub async fn run_cli_command(command: CliCommand, config: ClientConfig) -> Result<()> {
    let mut stdout = std::io::stdout();

    match command {
        CliCommand::Version => println!("{}", version_line()),
        CliCommand::Help => println!("{}", USAGE),
        CliCommand::Invalid(reason) => return Err(eyre!("{}\n\n{}", reason, USAGE)),
        CliCommand::Render { path } => handle_render(&path, &mut stdout)?,
        command => {
            let api = ApiClient::from_config(config)?;
            match command {
                CliCommand::Login { username, password } => {
                    handle_login(&api, &username, &password, &mut stdout).await?
                }
                CliCommand::Logout => handle_logout(&api, &mut stdout).await?,
                CliCommand::WhoAmI => handle_whoami(&api, &mut stdout).await?,
                CliCommand::Conversations => handle_conversations(&api, &mut stdout).await?,
                CliCommand::Chat {
                    conversation,
                    message,
                } => {
                    handle_chat(&api, conversation.as_deref(), &message, &mut stdout).await?;
                }
                other => return Err(eyre!("unsupported command: {:?}", other)),
            }
        }
    }
    Ok(())
}
