//! Export requests against the cables service API

use crate::error::{Error, Result};
use serde::Deserialize;
use tracing::{error, info, warn};

/// Server-returned descriptor of a finished export
#[derive(Clone, Debug, Deserialize)]
pub struct ExportResponse {
    /// Download path of the packaged export, relative to the service base URL
    pub path: String,

    /// Build log collected by the server while exporting
    #[serde(default)]
    pub log: Option<Vec<ExportLogEntry>>,
}

/// One line of the server's export build log
#[derive(Clone, Debug, Deserialize)]
pub struct ExportLogEntry {
    /// Severity of the entry; entries without a level are not surfaced
    #[serde(default)]
    pub level: Option<String>,

    /// The log text
    #[serde(default)]
    pub text: String,
}

/// Requests a server-side export of the given patch.
///
/// Sends GET `<base>/api/project/<id>/export?<query>` with the API key in the
/// `apikey` header, maps the response status onto [`Error`] and re-emits any
/// leveled server log lines before handing the descriptor back. Only a 200
/// counts as success; no retries are performed.
pub async fn request_export(
    http: &reqwest::Client,
    base_url: &str,
    patch_id: &str,
    query: &str,
    api_key: &str,
) -> Result<ExportResponse> {
    let url = format!("{base_url}/api/project/{patch_id}/export?{query}");
    info!(url = %url, "requesting export");

    let response = http.get(&url).header("apikey", api_key).send().await?;
    let status = response.status().as_u16();
    if status != 200 {
        return Err(map_status(status, patch_id, response).await);
    }

    let export: ExportResponse = response.json().await?;
    if let Some(entries) = &export.log {
        for entry in entries {
            surface_log_entry(entry);
        }
    }
    Ok(export)
}

/// Requests the compiled source of one or more patches.
///
/// Sends GET `<base>/api/projects/<ids>/export_code` and returns the body as
/// raw text. The ids string is passed through as given, so a comma-separated
/// list requests a combined build.
pub async fn request_code(
    http: &reqwest::Client,
    base_url: &str,
    patch_ids: &str,
    api_key: &str,
) -> Result<String> {
    let url = format!("{base_url}/api/projects/{patch_ids}/export_code");
    info!(url = %url, "requesting code export");

    let response = http.get(&url).header("apikey", api_key).send().await?;
    let status = response.status().as_u16();
    if status != 200 {
        return Err(map_status(status, patch_ids, response).await);
    }
    Ok(response.text().await?)
}

/// Maps a non-200 export API status onto the error taxonomy.
///
/// The response is consumed for its body where the variant carries it.
async fn map_status(status: u16, patch_id: &str, response: reqwest::Response) -> Error {
    match status {
        404 => Error::UnknownProject {
            project_id: patch_id.to_string(),
        },
        401 => Error::InsufficientRights,
        403 => Error::InsufficientRightsOrQuota {
            body: body_text(response).await,
        },
        400 => Error::InvalidApiKey,
        500 => Error::ServerError,
        _ => Error::UnexpectedStatus {
            status,
            body: body_text(response).await,
        },
    }
}

async fn body_text(response: reqwest::Response) -> String {
    response.text().await.unwrap_or_default()
}

fn surface_log_entry(entry: &ExportLogEntry) {
    match entry.level.as_deref() {
        None | Some("") => {}
        Some("error") => error!(server = "export", "{}", entry.text),
        Some("warn") | Some("warning") => warn!(server = "export", "{}", entry.text),
        Some(_) => info!(server = "export", "{}", entry.text),
    }
}
