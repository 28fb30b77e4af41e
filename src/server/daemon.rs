use std::sync::Arc;
use tokio::sync::broadcast;

use super::SiteConfig;
use crate::db::DatabaseBackend;
use crate::site::SiteServer;

pub struct Daemon {
  config: SiteConfig,
  backend: Arc<dyn DatabaseBackend>,
  shutdown_tx: broadcast::Sender<()>,
}

impl Daemon {
  pub fn new(config: SiteConfig, backend: Arc<dyn DatabaseBackend>) -> Self {
    let (shutdown_tx, _) = broadcast::channel(1);
    Self {
      config,
      backend,
      shutdown_tx,
    }
  }

  /// Trigger graceful shutdown of the site server
  pub fn shutdown(&self) {
    tracing::info!("Initiating graceful shutdown...");
    let _ = self.shutdown_tx.send(());
  }

  /// Runs until [`Daemon::shutdown`] is called and in-flight requests drain
  pub async fn run(&self) -> Result<(), anyhow::Error> {
    tracing::info!("Initializing database schema...");
    self.backend.init_schema().await?;
    tracing::info!(path = %self.config.sqlite.path, "Database schema initialized");

    let site = SiteServer::new(
      self.backend.clone(),
      self.config.clone(),
      self.shutdown_tx.subscribe(),
    );
    site.run(&self.config.address()).await
  }
}
