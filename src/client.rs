//! The export pipeline

use crate::config::ConfigStore;
use crate::deploy::{DeployProvider, NetlifyDeployer};
use crate::download::{archive_stem, fetch_archive};
use crate::error::{Error, Result};
use crate::install::{
    install_archive, install_code, resolve_code_destination, resolve_export_destination,
};
use crate::options::ExportOptions;
use crate::query::build_query;
use crate::request::{request_code, request_export};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Pipeline stage of a running export, surfaced through log events
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Asking the service to build the export
    Requesting,
    /// Streaming the packaged archive to disk
    Downloading,
    /// Extracting or renaming the archive into place
    Installing,
    /// Pipeline completed
    Done,
}

fn enter_stage(stage: Stage) {
    debug!(stage = ?stage, "pipeline stage");
}

/// Client for exporting, downloading and deploying patches
///
/// Owns the HTTP client, the credential store and the working directory all
/// pipeline stages share. Each operation runs the linear request, download,
/// install chain to completion or to its first error; nothing is retried and
/// a failed run leaves no resumable state behind.
///
/// # Examples
///
/// ```no_run
/// use cables_cli::{CablesClient, ExportOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut client = CablesClient::new()?;
///     let final_dir = client.export(&ExportOptions::new("pQpie9")).await?;
///     println!("exported to {}", final_dir.display());
///     Ok(())
/// }
/// ```
pub struct CablesClient {
    http: reqwest::Client,
    store: ConfigStore,
    work_dir: PathBuf,
}

impl CablesClient {
    /// Creates a client with the credential store from `~/.cablesrc` and the
    /// process working directory.
    pub fn new() -> Result<Self> {
        Self::with_store(ConfigStore::load()?)
    }

    /// Creates a client around an explicit credential store.
    pub fn with_store(store: ConfigStore) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            store,
            work_dir: std::env::current_dir()?,
        })
    }

    /// Redirects where temporary archives and derived destinations go.
    #[must_use]
    pub fn in_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// The credential store this client reads keys from.
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Mutable access to the credential store, for frontends that capture
    /// keys interactively.
    pub fn store_mut(&mut self) -> &mut ConfigStore {
        &mut self.store
    }

    /// Exports a patch and installs the result locally.
    ///
    /// Runs the full pipeline: request the server-side export, stream the
    /// archive into the working directory, then extract it into the resolved
    /// destination (or move the archive there when
    /// [`no_extract`](ExportOptions::no_extract) is set).
    ///
    /// Returns the final directory when extracted, the archive path when not.
    ///
    /// # Errors
    ///
    /// Fails without touching the network when the patch id is missing or no
    /// API key is available. Every later failure maps onto one [`Error`]
    /// variant; the temporary archive stays behind if extraction fails.
    pub async fn export(&mut self, options: &ExportOptions) -> Result<PathBuf> {
        options.validate()?;
        let api_key = self.resolve_api_key(options)?;
        let base_url = options.base_url();

        enter_stage(Stage::Requesting);
        let query = build_query(options);
        let response =
            request_export(&self.http, base_url, &options.patch_id, &query, &api_key).await?;

        enter_stage(Stage::Downloading);
        let download_url = format!("{}{}", base_url, response.path);
        let temp_file = fetch_archive(&self.http, &download_url, &self.work_dir).await?;

        enter_stage(Stage::Installing);
        let stem = archive_stem(&download_url);
        let final_dir =
            resolve_export_destination(&self.work_dir, options.destination.as_deref(), &stem);
        let final_path = install_archive(&temp_file, &final_dir, &stem, !options.no_extract)?;

        enter_stage(Stage::Done);
        Ok(final_path)
    }

    /// Fetches the compiled source of a patch and writes it as `ops.js`.
    ///
    /// The patch id may be a comma-separated list to request a combined
    /// build. Returns the path of the written file.
    pub async fn export_code(&mut self, options: &ExportOptions) -> Result<PathBuf> {
        options.validate()?;
        let api_key = self.resolve_api_key(options)?;
        let base_url = options.base_url();

        enter_stage(Stage::Requesting);
        let code = request_code(&self.http, base_url, &options.patch_id, &api_key).await?;

        enter_stage(Stage::Installing);
        let final_dir = resolve_code_destination(&self.work_dir, options.destination.as_deref());
        let final_path = install_code(&code, &final_dir)?;

        enter_stage(Stage::Done);
        Ok(final_path)
    }

    /// Deploys an exported directory to Netlify.
    ///
    /// `site_id` identifies the site at the provider; `source_dir` defaults
    /// to the working directory. Returns the URL of the deployed site.
    pub async fn deploy(&self, site_id: &str, source_dir: Option<&Path>) -> Result<String> {
        self.deploy_with(&NetlifyDeployer::new(), site_id, source_dir)
            .await
    }

    /// Deploys through an explicit provider implementation.
    pub async fn deploy_with(
        &self,
        provider: &dyn DeployProvider,
        site_id: &str,
        source_dir: Option<&Path>,
    ) -> Result<String> {
        if site_id.trim().is_empty() {
            return Err(Error::Deploy {
                message: "no site id set, nothing to deploy to".into(),
            });
        }

        let source_dir = match source_dir {
            Some(dir) => dir.to_path_buf(),
            None => {
                info!(dir = %self.work_dir.display(), "no source directory given, deploying the working directory");
                self.work_dir.clone()
            }
        };
        let token = match self.store.netlify_token() {
            Some(token) => token.to_string(),
            None => {
                return Err(Error::ConfigMissing {
                    credential: "Netlify access token".into(),
                });
            }
        };

        provider.deploy(site_id, &source_dir, &token).await
    }

    /// The API key for this run.
    ///
    /// An explicit per-call key overrides the stored one and is persisted
    /// immediately; otherwise the stored key is used.
    fn resolve_api_key(&mut self, options: &ExportOptions) -> Result<String> {
        if let Some(key) = options.api_key.as_deref().filter(|k| !k.is_empty()) {
            self.store.set_api_key(key);
            self.store.save()?;
            return Ok(key.to_string());
        }
        match self.store.api_key() {
            Some(key) => Ok(key.to_string()),
            None => Err(Error::ConfigMissing {
                credential: "API key".into(),
            }),
        }
    }
}
