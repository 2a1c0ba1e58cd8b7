//! Subcommands of the `shopkeep` binary

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use serde_json::Value;
use shopkeep_client::{
    ApiClient, DEFAULT_UPLOAD_FIELD, GuardDecision, Query, RouteGuard, UploadFile,
};
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and remember the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SHOPKEEP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session token
    Logout,
    /// Show the signed-in user
    Whoami,
    /// GET a resource
    Get {
        path: String,
        /// Query parameter as key=value, repeatable
        #[arg(short, long = "query", value_parser = parse_pair)]
        query: Vec<(String, String)>,
    },
    /// POST a JSON body
    Post {
        path: String,
        #[arg(short, long)]
        data: Option<String>,
    },
    /// PUT a JSON body
    Put {
        path: String,
        #[arg(short, long)]
        data: Option<String>,
    },
    /// PATCH a JSON body
    Patch {
        path: String,
        #[arg(short, long)]
        data: Option<String>,
    },
    /// DELETE a resource
    Delete { path: String },
    /// Upload a file as multipart form data
    Upload {
        path: String,
        file: PathBuf,
        #[arg(long, default_value = DEFAULT_UPLOAD_FIELD)]
        field: String,
    },
    /// Generate a default configuration file
    Config {
        /// Output file path (defaults to the platform config directory)
        output: Option<PathBuf>,
    },
}

impl Command {
    /// API path the command navigates to, if it needs a session
    fn guarded_path(&self) -> Option<&str> {
        match self {
            Self::Login { .. } | Self::Logout | Self::Config { .. } => None,
            Self::Whoami => Some("/me"),
            Self::Get { path, .. }
            | Self::Post { path, .. }
            | Self::Put { path, .. }
            | Self::Patch { path, .. }
            | Self::Delete { path }
            | Self::Upload { path, .. } => Some(path.as_str()),
        }
    }
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))
}

fn parse_body(data: Option<&str>) -> Result<Value> {
    data.map_or(Ok(Value::Null), |data| {
        serde_json::from_str(data).context("--data is not valid JSON")
    })
}

fn print(value: Option<&Value>) -> Result<()> {
    if let Some(value) = value {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// Run one command against the API
pub async fn run(command: Command, client: &ApiClient, guard: &RouteGuard) -> Result<()> {
    if let Some(path) = command.guarded_path() {
        if let GuardDecision::Redirect(login) = guard.check(path) {
            bail!("Not signed in (redirected to {login}); run `shopkeep login` first");
        }
    }

    match command {
        Command::Login { email, password } => {
            let user = client.login(&email, &password).await?;
            println!("Signed in as {} ({:?})", user.full_name, user.role);
        }
        Command::Logout => {
            client.session().logout();
            println!("Signed out");
        }
        Command::Whoami => {
            let user = client.current_user().await?;
            println!("{} <{}> {:?}", user.full_name, user.email, user.role);
        }
        Command::Get { path, query } => {
            let query: Query = query.into_iter().collect();
            let value: Option<Value> = client.get(&path, query).await?;
            print(value.as_ref())?;
        }
        Command::Post { path, data } => {
            let value: Option<Value> = client.post(&path, &parse_body(data.as_deref())?).await?;
            print(value.as_ref())?;
        }
        Command::Put { path, data } => {
            let value: Option<Value> = client.put(&path, &parse_body(data.as_deref())?).await?;
            print(value.as_ref())?;
        }
        Command::Patch { path, data } => {
            let value: Option<Value> = client.patch(&path, &parse_body(data.as_deref())?).await?;
            print(value.as_ref())?;
        }
        Command::Delete { path } => {
            let value: Option<Value> = client.delete(&path).await?;
            print(value.as_ref())?;
        }
        Command::Upload { path, file, field } => {
            let file = UploadFile::from_path(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let value: Value = client.upload(&path, file, &field).await?;
            print(Some(&value))?;
        }
        Command::Config { .. } => bail!("`config` does not talk to the API"),
    }

    Ok(())
}
