//! voltmarket server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `VOLTMARKET__*` environment variables, opens the SQLite store, and serves
//! the JSON API.
//!
//! # Bootstrapping an administrator
//!
//! Administrators cannot self-register. Create the first one with:
//!
//! ```text
//! echo 's3cret-pass' | voltmarket create-admin --email root@example.com --username root
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use voltmarket_api::{AppState, ServerConfig, auth, mail::Mailer};
use voltmarket_core::{
  market::MarketStore as _,
  user::{NewUser, Role, normalize_email},
};
use voltmarket_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "voltmarket electronics marketplace server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (the default).
  Serve,
  /// Create an administrator account; the password is read from stdin.
  CreateAdmin {
    #[arg(long)]
    email:    String,
    #[arg(long)]
    username: String,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("VOLTMARKET").separator("__"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  if server_cfg.jwt_secret.trim().is_empty() {
    anyhow::bail!("jwt_secret must be set (config file or VOLTMARKET__JWT_SECRET)");
  }

  // Expand `~` in the database path.
  let database_path = expand_tilde(&server_cfg.database_path);

  let store = SqliteStore::open(&database_path)
    .await
    .with_context(|| format!("failed to open store at {database_path:?}"))?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(store, server_cfg).await,
    Command::CreateAdmin { email, username } => create_admin(store, email, username).await,
  }
}

async fn serve(store: SqliteStore, server_cfg: ServerConfig) -> anyhow::Result<()> {
  let mailer = Mailer::from_config(&server_cfg.mail).context("failed to configure mail")?;
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  let state = AppState::new(store, server_cfg, mailer);
  let app = voltmarket_api::router(state).layer(TraceLayer::new_for_http());

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn create_admin(
  store: SqliteStore,
  email: String,
  username: String,
) -> anyhow::Result<()> {
  let password = rpassword_or_stdin()?;
  if password.chars().count() < 8 {
    anyhow::bail!("password must be at least 8 characters");
  }
  let password_hash =
    auth::hash_password(&password).map_err(|e| anyhow::anyhow!("{e}"))?;

  let (user, _) = store
    .create_user(NewUser {
      email: normalize_email(&email),
      username,
      first_name: String::new(),
      last_name: String::new(),
      role: Role::Admin,
      password_hash,
      store: None,
    })
    .await
    .context("failed to create administrator")?;

  tracing::info!(user_id = %user.id, email = %user.email, "administrator created");
  println!("{}", user.id);
  Ok(())
}

/// Read a password from stdin (no echo).
fn rpassword_or_stdin() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
