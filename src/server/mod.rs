mod config;
mod daemon;

pub use config::{
  AuthSection, LoggingSection, PagesSection, ServerSection, SiteConfig, SqliteSection,
};
pub use daemon::Daemon;
