//! # cables-cli
//!
//! Exports patches from [cables.gl](https://cables.gl) and installs them
//! locally, as a library and as the `cables` command line tool.
//!
//! ## What it does
//!
//! - **Export** - asks the cables server to package a patch and downloads
//!   the resulting zip archive
//! - **Install** - extracts the archive into a destination directory, or
//!   keeps it as a zip when asked to
//! - **Code only** - fetches the compiled ops of one or more patches as a
//!   single `ops.js`
//! - **Deploy** - uploads an exported directory to a static host
//!
//! Credentials live in `~/.cablesrc` and are managed through
//! [`ConfigStore`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use cables_cli::{CablesClient, ExportOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut options = ExportOptions::new("pQpie9");
//!     options.destination = Some("my-patch".to_string());
//!
//!     let mut client = CablesClient::new()?;
//!     let final_dir = client.export(&options).await?;
//!     println!("exported to {}", final_dir.display());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Export pipeline client
pub mod client;
/// Credential store backed by `.cablesrc`
pub mod config;
/// Deployment to static hosting providers
pub mod deploy;
/// Archive download and size probing
pub mod download;
/// Error types
pub mod error;
/// Local installation of downloaded exports
pub mod install;
/// Export options
pub mod options;
/// Export query string assembly
pub mod query;
/// Talking to the cables export API
pub mod request;

// Re-export commonly used types
pub use client::{CablesClient, Stage};
pub use config::{CONFIG_FILENAME, ConfigStore};
pub use deploy::{DeployProvider, NetlifyDeployer};
pub use error::{Error, Result};
pub use options::{AssetMode, DEV_URL, ExportOptions, PROD_URL};
pub use request::{ExportLogEntry, ExportResponse};
