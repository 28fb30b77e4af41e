// Delete confirmation dialog (native core, DOM binding behind the csr feature)
pub mod dialog;

// Server-side modules (only compiled with server feature)
#[cfg(feature = "server")]
pub mod db;
#[cfg(feature = "server")]
pub mod server;
#[cfg(feature = "server")]
pub mod site;
#[cfg(feature = "server")]
pub mod types;
