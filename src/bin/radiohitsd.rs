use clap::{Parser, Subcommand};
use radiohits::db::{DatabaseBackend, SqliteBackend};
use radiohits::server::{Daemon, SiteConfig};
use radiohits::site::auth;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "radiohitsd", about = "Radio Hits site server", version)]
struct Args {
  #[arg(long, env = "RADIOHITS_SQLITE_PATH")]
  sqlite: Option<String>,
  #[arg(short, long)]
  port: Option<u16>,
  #[arg(long)]
  host: Option<String>,
  #[arg(short, long)]
  config: Option<String>,
  #[arg(long)]
  log_level: Option<String>,
  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the site (default)
  Serve,
  /// Create an account that can manage entries
  CreateUser {
    #[arg(long)]
    username: String,
    #[arg(long, env = "RADIOHITS_PASSWORD")]
    password: String,
  },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
  let args = Args::parse();

  // Load config: explicit path > auto-detect > defaults
  let mut config = if let Some(path) = &args.config {
    SiteConfig::from_file(path)?
  } else {
    SiteConfig::find_and_load()?.unwrap_or_default()
  };

  // CLI args override config file
  if let Some(path) = args.sqlite {
    config.sqlite.path = path;
  }
  if let Some(port) = args.port {
    config.server.port = port;
  }
  if let Some(host) = args.host {
    config.server.host = host;
  }
  if let Some(level) = args.log_level {
    config.logging.level = level;
  }

  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let backend: Arc<dyn DatabaseBackend> = Arc::new(SqliteBackend::new(&config.sqlite.path).await?);

  match args.command.unwrap_or(Command::Serve) {
    Command::CreateUser { username, password } => create_user(backend, &username, &password).await,
    Command::Serve => serve(config, backend).await,
  }
}

async fn create_user(
  backend: Arc<dyn DatabaseBackend>,
  username: &str,
  password: &str,
) -> Result<(), anyhow::Error> {
  let username = username.trim();
  if username.is_empty() || password.is_empty() {
    anyhow::bail!("username and password must not be empty");
  }
  backend.init_schema().await?;
  if backend.get_user_by_username(username).await?.is_some() {
    anyhow::bail!("user '{}' already exists", username);
  }
  let hash = auth::hash_password(password).map_err(|e| anyhow::anyhow!("{}", e))?;
  let user = backend.create_user(username, &hash).await?;
  tracing::info!(id = user.id, username = %user.username, "User created");
  Ok(())
}

async fn serve(config: SiteConfig, backend: Arc<dyn DatabaseBackend>) -> Result<(), anyhow::Error> {
  let daemon = Arc::new(Daemon::new(config, backend));
  let daemon_clone = daemon.clone();

  // Handle shutdown signals (SIGINT, SIGTERM)
  tokio::spawn(async move {
    shutdown_signal().await;
    daemon_clone.shutdown();
  });

  daemon.run().await?;
  tracing::info!("Shutdown complete");
  Ok(())
}

async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!("Failed to install Ctrl+C handler: {}", e);
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(e) => {
        tracing::error!("Failed to install SIGTERM handler: {}", e);
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => tracing::info!("Received SIGINT"),
    _ = terminate => tracing::info!("Received SIGTERM"),
  }
}
