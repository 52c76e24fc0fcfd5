//! Deploying exported patches to static hosting providers

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::io::Cursor;
use std::path::Path;
use tracing::info;
use walkdir::WalkDir;

/// Base URL of the Netlify REST API
const NETLIFY_API_URL: &str = "https://api.netlify.com/api/v1";

/// A static hosting provider that accepts an exported patch directory
///
/// The one implementation today is [`NetlifyDeployer`]; the trait keeps the
/// upload mechanics out of the pipeline so other providers can slot in.
#[async_trait]
pub trait DeployProvider: Send + Sync {
    /// Uploads `source_dir` to the site identified by `site_id`.
    ///
    /// Returns the public URL of the deployed site.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read, the upload fails,
    /// or the provider rejects the deploy; the provider's message is carried
    /// in [`Error::Deploy`].
    async fn deploy(&self, site_id: &str, source_dir: &Path, token: &str) -> Result<String>;

    /// Human-readable provider name for logging
    fn name(&self) -> &'static str;
}

/// Deploys a directory to Netlify as a single zip upload
#[derive(Clone, Debug)]
pub struct NetlifyDeployer {
    http: reqwest::Client,
    api_url: String,
}

impl NetlifyDeployer {
    /// Creates a deployer talking to the public Netlify API.
    pub fn new() -> Self {
        Self::with_api_url(NETLIFY_API_URL)
    }

    /// Creates a deployer against an explicit API base URL.
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
        }
    }
}

impl Default for NetlifyDeployer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeployProvider for NetlifyDeployer {
    async fn deploy(&self, site_id: &str, source_dir: &Path, token: &str) -> Result<String> {
        let payload = pack_directory(source_dir)?;
        info!(site = site_id, bytes = payload.len(), "uploading deploy");

        let url = format!("{}/sites/{}/deploys", self.api_url, site_id);
        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {token}"))
            .header("Content-Type", "application/zip")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(Error::Deploy {
                message: format!("netlify answered {}: {}", status.as_u16(), body),
            });
        }

        let deploy: serde_json::Value = serde_json::from_str(&body).map_err(|e| Error::Deploy {
            message: format!("unreadable deploy response: {e}"),
        })?;
        let deployed_url = site_url(&deploy).ok_or_else(|| Error::Deploy {
            message: "deploy response carries no site url".into(),
        })?;

        info!(url = deployed_url, "deploy finished");
        Ok(deployed_url.to_string())
    }

    fn name(&self) -> &'static str {
        "netlify"
    }
}

/// The public URL of a deploy, preferring the https one.
fn site_url(deploy: &serde_json::Value) -> Option<&str> {
    deploy
        .get("ssl_url")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            deploy
                .get("url")
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
        })
}

/// Packs a directory tree into an in-memory zip archive for upload.
fn pack_directory(source_dir: &Path) -> Result<Vec<u8>> {
    let zip_err = |e: zip::result::ZipError| Error::Deploy {
        message: format!("failed to pack {}: {}", source_dir.display(), e),
    };

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Deploy {
            message: format!("cannot read {}: {}", source_dir.display(), e),
        })?;
        let path = entry.path();
        if path == source_dir {
            continue;
        }
        let relative = path.strip_prefix(source_dir).map_err(|e| Error::Deploy {
            message: format!("cannot relativize {}: {}", path.display(), e),
        })?;
        // zip entry names always use forward slashes
        let name = relative.to_string_lossy().replace('\\', "/");

        if entry.file_type().is_dir() {
            writer.add_directory(name, options).map_err(zip_err)?;
        } else {
            writer.start_file(name, options).map_err(zip_err)?;
            let mut file = std::fs::File::open(path)?;
            std::io::copy(&mut file, &mut writer)?;
        }
    }

    let cursor = writer.finish().map_err(zip_err)?;
    Ok(cursor.into_inner())
}
