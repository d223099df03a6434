use super::console::{report, Console};
use crate::config::AppConfig;
use anyhow::{Context, Result};
use reqwest::Method;
use serde_json::Value;

#[derive(Debug)]
pub struct Args {
    pub config: AppConfig,
    pub method: Method,
    pub path: String,
    pub data: Option<Value>,
}

/// Execute the request action.
/// # Errors
/// Returns an error if the request fails or the backend answers with a non-2xx status.
pub async fn execute(args: Args) -> Result<()> {
    let console = Console::open(&args.config)?;

    let result = console
        .api
        .request(args.method, &args.path, args.data.as_ref())
        .await;

    match result {
        Ok(Some(payload)) => {
            let rendered =
                serde_json::to_string_pretty(&payload).context("Failed to render response")?;
            println!("{rendered}");
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(err) => {
            if err.is_auth_failure() && console.location().is_some() {
                eprintln!("Session expired or rejected, sign in again with `login`");
            }
            Err(report(&err))
        }
    }
}
