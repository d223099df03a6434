pub mod account;
pub mod console;
pub mod navigate;
pub mod request;

// Internal "interpreter" for `Action`.
// The match lives in `run` so this module stays a plain list of actions.
mod run;

use crate::config::AppConfig;

#[derive(Debug)]
pub enum Action {
    Login(account::LoginArgs),
    Register(account::RegisterArgs),
    Logout(AppConfig),
    Whoami { config: AppConfig, cached: bool },
    Status(AppConfig),
    Open { config: AppConfig, route: String },
    Request(request::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
