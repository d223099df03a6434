pub mod logging;

use crate::config::{ENV_API_BASE_URL, ENV_AUTH_VARIANT, ENV_SESSION_FILE, ENV_TIMEOUT_MS};
use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ArgAction, ColorChoice, Command,
};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_VARIANT: &str = "variant";
pub const ARG_SESSION_FILE: &str = "session-file";
pub const ARG_TIMEOUT_MS: &str = "timeout-ms";
pub const ARG_USERNAME: &str = "username";
pub const ARG_PASSWORD: &str = "password";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let command = Command::new("console-session")
        .about("Session and authorized requests for the lab consoles")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new(ARG_API_URL)
                .long("api-url")
                .help("Backend base URL")
                .env(ENV_API_BASE_URL)
                .global(true),
        )
        .arg(
            Arg::new(ARG_VARIANT)
                .long("variant")
                .help("Authentication variant")
                .long_help(
                    "Authentication variant: `token` sends `Authorization: Token <t>`, `jwt` sends `Authorization: Bearer <access>`.",
                )
                .env(ENV_AUTH_VARIANT)
                .global(true)
                .value_parser(["token", "jwt", "bearer"]),
        )
        .arg(
            Arg::new(ARG_SESSION_FILE)
                .long("session-file")
                .help("File holding the persisted session")
                .env(ENV_SESSION_FILE)
                .global(true)
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            Arg::new(ARG_TIMEOUT_MS)
                .long("timeout-ms")
                .help("Request timeout in milliseconds")
                .env(ENV_TIMEOUT_MS)
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .subcommand(
            credentials(Command::new("login").about("Sign in and store the session token")),
        )
        .subcommand(
            credentials(Command::new("register").about("Create an account and sign in"))
                .arg(Arg::new("first-name").long("first-name").help("First name"))
                .arg(Arg::new("last-name").long("last-name").help("Last name"))
                .arg(Arg::new("email").long("email").help("Email address")),
        )
        .subcommand(Command::new("logout").about("Sign out and erase the stored session"))
        .subcommand(
            Command::new("whoami")
                .about("Show the signed-in user")
                .arg(
                    Arg::new("cached")
                        .long("cached")
                        .help("Print the cached profile without calling the backend")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("status").about("Show session state and configuration"))
        .subcommand(
            Command::new("open")
                .about("Navigate to a console route through the guard")
                .arg(
                    Arg::new("route")
                        .help("Route path, e.g. /clients?page=2")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("request")
                .about("Send an authorized request to the backend")
                .arg(
                    Arg::new("method")
                        .help("HTTP method")
                        .required(true)
                        .ignore_case(true)
                        .value_parser(["GET", "POST", "PUT", "PATCH", "DELETE"]),
                )
                .arg(
                    Arg::new("path")
                        .help("Path below the base URL, or an absolute URL")
                        .required(true),
                )
                .arg(
                    Arg::new("data")
                        .short('d')
                        .long("data")
                        .help("JSON request body"),
                ),
        );

    logging::with_args(command)
}

fn credentials(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_USERNAME)
                .short('u')
                .long("username")
                .help("Account username")
                .env("CONSOLE_USERNAME")
                .required(true),
        )
        .arg(
            Arg::new(ARG_PASSWORD)
                .short('p')
                .long("password")
                .help("Account password (read from stdin when omitted)")
                .env("CONSOLE_PASSWORD")
                .hide_env_values(true),
        )
}
