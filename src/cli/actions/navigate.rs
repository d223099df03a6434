use super::console::Console;
use crate::config::AppConfig;
use crate::navigation::route::LOGIN_PATH;
use anyhow::Result;

/// Execute the status action.
/// # Errors
/// Returns an error if the console cannot be wired from `config`.
pub fn status(config: &AppConfig) -> Result<()> {
    let console = Console::open(config)?;
    let session = &console.session;

    println!("backend:       {}", console.api.base_url());
    println!("variant:       {}", session.variant());
    println!("session file:  {}", config.session_file.display());
    println!(
        "authenticated: {}",
        if session.is_authenticated() { "yes" } else { "no" }
    );
    if let Some(profile) = console.auth.cached_profile() {
        println!("user:          {}", profile.username);
    }
    if let Some(path) = session.return_path() {
        println!("return path:   {path}");
    }
    Ok(())
}

/// Execute the open action.
/// # Errors
/// Returns an error if `route` is not a console route.
pub fn open(config: &AppConfig, route: &str) -> Result<()> {
    let console = Console::open(config)?;
    let landed = console.router.open(route)?;

    println!("{landed}");
    if landed.normalized_path() == LOGIN_PATH && !console.session.is_authenticated() {
        eprintln!("Sign in with `login` to continue to {route}");
    }
    Ok(())
}
