//! Command-line argument parsing for the chatstream CLI.

use std::path::PathBuf;

/// Usage text printed by `--help` and after a parse error.
pub const USAGE: &str = "\
usage: chatstream <command>

commands:
  login <username> <password>            sign in and store the session
  logout                                 sign out and forget the session
  whoami                                 show the signed-in user
  conversations                          list conversations
  chat [--conversation <id>] <message>   send a message and stream the reply
  render <file>                          render a markdown file to HTML
  --version, -V                          show version information";

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    Login { username: String, password: String },
    Logout,
    WhoAmI,
    Conversations,
    /// Send a message and stream the reply to stdout
    Chat {
        conversation: Option<String>,
        message: String,
    },
    /// Render a markdown file to HTML on stdout
    Render { path: PathBuf },
    /// Arguments that do not form a command
    Invalid(String),
}

/// Parse command-line arguments and return the appropriate command.
///
/// # Examples
///
/// ```
/// use chatstream::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["chatstream".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    // Skip the program name
    let mut args = args.skip(1);
    let Some(command) = args.next() else {
        return CliCommand::Help;
    };
    let rest: Vec<String> = args.collect();

    match command.as_str() {
        "--version" | "-V" => CliCommand::Version,
        "--help" | "-h" | "help" => CliCommand::Help,
        "login" => match rest.as_slice() {
            [username, password] => CliCommand::Login {
                username: username.clone(),
                password: password.clone(),
            },
            _ => CliCommand::Invalid("login expects <username> <password>".to_string()),
        },
        "logout" => no_operands(rest, CliCommand::Logout),
        "whoami" => no_operands(rest, CliCommand::WhoAmI),
        "conversations" => no_operands(rest, CliCommand::Conversations),
        "chat" => parse_chat(rest),
        "render" => match rest.as_slice() {
            [path] => CliCommand::Render { path: path.into() },
            _ => CliCommand::Invalid("render expects <file>".to_string()),
        },
        other => CliCommand::Invalid(format!("unknown command: {}", other)),
    }
}

fn no_operands(rest: Vec<String>, command: CliCommand) -> CliCommand {
    if rest.is_empty() {
        command
    } else {
        CliCommand::Invalid(format!("unexpected argument: {}", rest[0]))
    }
}

/// `chat [--conversation <id>] <message...>`; message words are joined.
fn parse_chat(rest: Vec<String>) -> CliCommand {
    let mut conversation = None;
    let mut words = Vec::new();
    let mut iter = rest.into_iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--conversation" | "-c" => match iter.next() {
                Some(id) => conversation = Some(id),
                None => {
                    return CliCommand::Invalid("--conversation expects an id".to_string());
                }
            },
            _ => words.push(arg),
        }
    }

    let message = words.join(" ");
    if message.trim().is_empty() {
        return CliCommand::Invalid("chat expects a message".to_string());
    }
    CliCommand::Chat {
        conversation,
        message,
    }
}
