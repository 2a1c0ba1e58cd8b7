//! Shopkeep CLI - command-line access to the back office API

mod commands;
mod config;
mod logging;
mod state_dir;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Command;
use shopkeep_client::{
    ApiClient, ClientConfig, FileTokenStore, MemoryTokenStore, Persistence, RouteGuard, Session,
    TokenStore,
};
use state_dir::StateDir;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{Level, debug, error, info};

#[derive(Parser)]
#[command(name = "shopkeep")]
#[command(about = "Command-line access to the Shopkeep API")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Configuration file path
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// Directory for configuration and session state
    #[arg(long, global = true, env = "SHOPKEEP_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Keep the session in memory for this run only; stored state is neither read nor written
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Access token to use for this run; implies --ephemeral
    #[arg(long, global = true, env = "SHOPKEEP_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.clone().into());

    let state_dir = cli
        .state_dir
        .clone()
        .map_or_else(StateDir::new, StateDir::with_override);

    if let Command::Config { output } = &cli.command {
        let output = output.clone().unwrap_or_else(|| state_dir.config_file());
        config::generate_default_config(&output)?;
        println!("Wrote {}", output.display());
        return Ok(());
    }

    let config_path = cli
        .config
        .clone()
        .or_else(|| Some(state_dir.config_file()).filter(|path| path.exists()));
    let config = match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            ClientConfig::from_file(&path)?
        }
        None => ClientConfig::from_env()?,
    };
    debug!(api_base = %config.api_base, "Using API base");

    let persistence = persistence(
        cli.ephemeral,
        cli.token.as_deref(),
        &state_dir.session_dir(),
        &config.token_key,
    )?;

    let session = Arc::new(
        Session::new(persistence)
            .with_token_key(config.token_key.as_str())
            .with_login_path(config.login_path.as_str()),
    );
    let client = ApiClient::from_config(&config, session.clone())?;
    let guard = RouteGuard::new(session);
    let mut redirects = guard.redirects();

    let signing_out = matches!(cli.command, Command::Logout);
    let result = commands::run(cli.command, &client, &guard).await;

    if !signing_out {
        if let Some(login) = redirects.try_next() {
            eprintln!("Session ended ({login}); run `shopkeep login` to sign in again");
        }
    }

    if let Err(e) = result {
        error!("Command failed: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}

/// Token storage for this run
///
/// An explicit token is held in memory so guarded commands can run without
/// a stored session.
fn persistence(
    ephemeral: bool,
    token: Option<&str>,
    session_dir: &Path,
    token_key: &str,
) -> Result<Persistence> {
    if !ephemeral && token.is_none() {
        return Ok(Persistence::available(FileTokenStore::new(session_dir)));
    }

    let store = MemoryTokenStore::new();
    if let Some(token) = token {
        store.set(token_key, token)?;
    }
    Ok(Persistence::available(store))
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopkeep_client::GuardDecision;

    fn guarded(persistence: Persistence) -> (Arc<Session>, RouteGuard) {
        let session = Arc::new(Session::new(persistence).with_token_key("token"));
        (session.clone(), RouteGuard::new(session))
    }

    #[test]
    fn token_flag_seeds_an_in_memory_session() {
        let dir = tempfile::tempdir().unwrap();
        let session_dir = dir.path().join("session");

        let persistence = persistence(false, Some("abc123"), &session_dir, "token").unwrap();
        let (session, guard) = guarded(persistence);

        assert_eq!(guard.check("/items"), GuardDecision::Allow);
        assert_eq!(session.token().as_deref(), Some("abc123"));

        session.logout();
        assert!(!session_dir.exists());
    }

    #[test]
    fn ephemeral_ignores_stored_session() {
        let dir = tempfile::tempdir().unwrap();
        let session_dir = dir.path().join("session");
        FileTokenStore::new(&session_dir).set("token", "stored").unwrap();

        let persistence = persistence(true, None, &session_dir, "token").unwrap();
        let (session, guard) = guarded(persistence);

        assert_eq!(guard.check("/items"), GuardDecision::Redirect("/login".to_string()));
        assert_eq!(session.token(), None);
    }

    #[test]
    fn default_uses_the_stored_session() {
        let dir = tempfile::tempdir().unwrap();
        let session_dir = dir.path().join("session");
        FileTokenStore::new(&session_dir).set("token", "stored").unwrap();

        let persistence = persistence(false, None, &session_dir, "token").unwrap();
        let (session, guard) = guarded(persistence);

        assert_eq!(guard.check("/items"), GuardDecision::Allow);
        assert_eq!(session.token().as_deref(), Some("stored"));
    }
}
