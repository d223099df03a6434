use super::console::{report, Console};
use crate::auth::{LoginRequest, RegisterRequest};
use crate::config::AppConfig;
use anyhow::{bail, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::io::{BufRead, Write};

#[derive(Debug)]
pub struct LoginArgs {
    pub config: AppConfig,
    pub username: String,
    pub password: Option<SecretString>,
}

#[derive(Debug)]
pub struct RegisterArgs {
    pub config: AppConfig,
    pub username: String,
    pub password: Option<SecretString>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Execute the login action.
/// # Errors
/// Returns an error if the password cannot be read or the backend rejects the credentials.
pub async fn login(args: LoginArgs) -> Result<()> {
    let console = Console::open(&args.config)?;
    let request = LoginRequest {
        password: resolve_password(args.password)?,
        username: args.username,
    };

    let landed = console.auth.login(&request).await.map_err(|e| report(&e))?;
    println!("Signed in as {}, continuing to {landed}", request.username);
    Ok(())
}

/// Execute the register action.
/// # Errors
/// Returns an error if registration or the follow-up sign-in fails.
pub async fn register(args: RegisterArgs) -> Result<()> {
    let console = Console::open(&args.config)?;
    let request = RegisterRequest {
        password: resolve_password(args.password)?,
        username: args.username,
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
    };

    let landed = console
        .auth
        .register(&request)
        .await
        .map_err(|e| report(&e))?;
    println!("Registered {}, continuing to {landed}", request.username);
    Ok(())
}

/// Execute the logout action.
/// # Errors
/// Returns an error if the session file cannot be cleared.
pub fn logout(config: &AppConfig) -> Result<()> {
    let console = Console::open(config)?;
    console
        .auth
        .logout()
        .with_context(|| format!("Failed to clear {}", config.session_file.display()))?;
    println!("Signed out");
    Ok(())
}

/// Execute the whoami action.
/// # Errors
/// Returns an error if there is no session or the profile request fails.
pub async fn whoami(config: &AppConfig, cached: bool) -> Result<()> {
    let console = Console::open(config)?;

    let profile = if cached {
        console
            .auth
            .cached_profile()
            .context("No cached profile, run `whoami` without --cached")?
    } else {
        if !console.session.is_authenticated() {
            bail!("Not signed in");
        }
        console.auth.profile().await.map_err(|e| report(&e))?
    };

    println!("{} ({})", profile.display_name(), profile.username);
    if !profile.email.is_empty() {
        println!("{}", profile.email);
    }
    Ok(())
}

/// Uses the provided password or prompts for one on stdin.
fn resolve_password(password: Option<SecretString>) -> Result<SecretString> {
    if let Some(password) = password {
        return Ok(password);
    }

    eprint!("Password: ");
    std::io::stderr().flush().context("Failed to write prompt")?;
    read_password(std::io::stdin().lock())
}

fn read_password(mut input: impl BufRead) -> Result<SecretString> {
    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    let password = SecretString::from(line.trim_end_matches(['\r', '\n']).to_string());
    if password.expose_secret().is_empty() {
        bail!("Password is required");
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_password_strips_line_ending() -> Result<()> {
        let password = read_password("s3cret pass\r\n".as_bytes())?;
        assert_eq!(password.expose_secret(), "s3cret pass");
        Ok(())
    }

    #[test]
    fn read_password_rejects_empty_input() {
        assert!(read_password("\n".as_bytes()).is_err());
        assert!(read_password("".as_bytes()).is_err());
    }

    #[test]
    fn explicit_password_skips_prompt() -> Result<()> {
        let password = resolve_password(Some(SecretString::from("pw".to_string())))?;
        assert_eq!(password.expose_secret(), "pw");
        Ok(())
    }
}
