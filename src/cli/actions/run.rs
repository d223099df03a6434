use super::{account, navigate, request, Action};
use anyhow::Result;

pub(super) async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Login(args) => account::login(args).await,
        Action::Register(args) => account::register(args).await,
        Action::Logout(config) => account::logout(&config),
        Action::Whoami { config, cached } => account::whoami(&config, cached).await,
        Action::Status(config) => navigate::status(&config),
        Action::Open { config, route } => navigate::open(&config, &route),
        Action::Request(args) => request::execute(args).await,
    }
}
