//! Command-line argument dispatch.
//!
//! Parses validated CLI arguments into an [`Action`], resolving the shared
//! configuration (defaults, environment, then flags) once per invocation.

use crate::cli::actions::{account, request, Action};
use crate::cli::commands::{
    ARG_API_URL, ARG_PASSWORD, ARG_SESSION_FILE, ARG_TIMEOUT_MS, ARG_USERNAME, ARG_VARIANT,
};
use crate::config::AppConfig;
use anyhow::{anyhow, Context, Result};
use reqwest::Method;
use secrecy::SecretString;
use std::path::PathBuf;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if the configuration is invalid or required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let config = config(matches)?;

    let (name, sub) = matches
        .subcommand()
        .context("missing subcommand, see --help")?;

    let action = match name {
        "login" => Action::Login(account::LoginArgs {
            username: required(sub, ARG_USERNAME)?,
            password: password(sub),
            config,
        }),
        "register" => Action::Register(account::RegisterArgs {
            username: required(sub, ARG_USERNAME)?,
            password: password(sub),
            first_name: optional(sub, "first-name"),
            last_name: optional(sub, "last-name"),
            email: optional(sub, "email"),
            config,
        }),
        "logout" => Action::Logout(config),
        "whoami" => Action::Whoami {
            cached: sub.get_flag("cached"),
            config,
        },
        "status" => Action::Status(config),
        "open" => Action::Open {
            route: required(sub, "route")?,
            config,
        },
        "request" => {
            let method = required(sub, "method")?;
            let method = Method::from_bytes(method.to_uppercase().as_bytes())
                .with_context(|| format!("invalid HTTP method: {method}"))?;
            let data = sub
                .get_one::<String>("data")
                .map(|raw| serde_json::from_str(raw))
                .transpose()
                .context("--data must be valid JSON")?;
            Action::Request(request::Args {
                path: required(sub, "path")?,
                method,
                data,
                config,
            })
        }
        other => return Err(anyhow!("unknown subcommand: {other}")),
    };

    Ok(action)
}

/// Defaults and environment first, then explicit flags.
fn config(matches: &clap::ArgMatches) -> Result<AppConfig> {
    let mut config = AppConfig::load().context("invalid console configuration")?;

    if let Some(url) = matches.get_one::<String>(ARG_API_URL) {
        config.api_base_url.clone_from(url);
    }
    if let Some(variant) = matches.get_one::<String>(ARG_VARIANT) {
        config.variant = variant.parse()?;
    }
    if let Some(timeout_ms) = matches.get_one::<u64>(ARG_TIMEOUT_MS) {
        config.timeout_ms = *timeout_ms;
    }
    if let Some(path) = matches.get_one::<PathBuf>(ARG_SESSION_FILE) {
        config.session_file.clone_from(path);
    }

    config.validate()?;
    Ok(config)
}

fn required(matches: &clap::ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .with_context(|| format!("missing required argument: {id}"))
}

fn optional(matches: &clap::ArgMatches, id: &str) -> String {
    matches.get_one::<String>(id).cloned().unwrap_or_default()
}

fn password(matches: &clap::ArgMatches) -> Option<SecretString> {
    matches
        .get_one::<String>(ARG_PASSWORD)
        .map(|value| SecretString::from(value.clone()))
}
