//! Streamed download of the exported archive

use crate::error::{Error, Result};
use crate::query::strip_extension;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Derives the archive stem from a download URL.
///
/// The stem is the last path segment of the URL with its extension removed.
/// Both the temporary archive (`<stem>.zip`) and the default destination
/// directory are named after it.
pub fn archive_stem(download_url: &str) -> String {
    let segment = match url::Url::parse(download_url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
            .unwrap_or("")
            .to_string(),
        // not an absolute URL, treat it as a bare path
        Err(_) => download_url
            .rsplit('/')
            .find(|s| !s.is_empty())
            .unwrap_or("")
            .to_string(),
    };
    strip_extension(&segment).to_string()
}

/// Downloads the archive behind `download_url` into `work_dir`.
///
/// Two phases: a HEAD request probes the size for a log line (a failed probe
/// never aborts the download), then the GET body is streamed chunk by chunk
/// to `<work_dir>/<stem>.zip`. Returns the path of the written file.
pub async fn fetch_archive(
    http: &reqwest::Client,
    download_url: &str,
    work_dir: &Path,
) -> Result<PathBuf> {
    info!(url = %download_url, "downloading export");
    probe_size(http, download_url).await;

    let response = http.get(download_url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::UnexpectedStatus {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        });
    }

    let temp_file = work_dir.join(format!("{}.zip", archive_stem(download_url)));
    let mut file = File::create(&temp_file).await?;
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        bytes_written += chunk.len() as u64;
    }
    file.flush().await?;

    info!(path = %temp_file.display(), bytes = bytes_written, "download finished");
    Ok(temp_file)
}

/// HEAD size probe. Purely informational; failures are logged and skipped.
async fn probe_size(http: &reqwest::Client, url: &str) {
    match http.head(url).send().await {
        Ok(response) => {
            let length = response
                .headers()
                .get(reqwest::header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            match length {
                Some(bytes) => {
                    let size_kb = (bytes as f64 / 1024.0).round() as u64;
                    info!(size_kb, "archive size");
                }
                None => debug!("no content-length in HEAD response"),
            }
        }
        Err(e) => debug!(error = %e, "size probe failed"),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn archive_stem_strips_the_extension_of_the_last_segment() {
        assert_eq!(
            archive_stem("https://cables.gl/assets/exports/my_patch_v2.zip"),
            "my_patch_v2"
        );
        assert_eq!(archive_stem("https://cables.gl/download/export123"), "export123");
        assert_eq!(archive_stem("https://cables.gl/a/b/bundle.tar.gz"), "bundle.tar");
    }

    #[test]
    fn archive_stem_handles_bare_paths() {
        assert_eq!(archive_stem("/assets/exports/my_patch.zip"), "my_patch");
        assert_eq!(archive_stem("plain.zip"), "plain");
    }

    #[tokio::test]
    async fn streams_the_body_to_a_stem_named_zip() {
        let server = MockServer::start().await;
        let body = b"PK\x03\x04 pretend archive bytes".to_vec();
        Mock::given(method("HEAD"))
            .and(path("/assets/exports/patch_abc.zip"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/assets/exports/patch_abc.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let http = reqwest::Client::new();
        let url = format!("{}/assets/exports/patch_abc.zip", server.uri());
        let temp_file = fetch_archive(&http, &url, dir.path()).await.unwrap();

        assert_eq!(temp_file, dir.path().join("patch_abc.zip"));
        assert_eq!(std::fs::read(&temp_file).unwrap(), body);
    }

    #[tokio::test]
    async fn a_failed_head_probe_does_not_abort_the_download() {
        let server = MockServer::start().await;
        // only the GET is mounted; the HEAD probe gets wiremock's 404
        Mock::given(method("GET"))
            .and(path("/dl/export.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"bytes".to_vec()))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let http = reqwest::Client::new();
        let url = format!("{}/dl/export.zip", server.uri());
        let temp_file = fetch_archive(&http, &url, dir.path()).await.unwrap();

        assert_eq!(std::fs::read(&temp_file).unwrap(), b"bytes");
    }

    #[tokio::test]
    async fn a_non_success_download_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("rebuilding"))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let http = reqwest::Client::new();
        let url = format!("{}/dl/export.zip", server.uri());
        let err = fetch_archive(&http, &url, dir.path()).await.unwrap_err();

        match err {
            Error::UnexpectedStatus { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "rebuilding");
            }
            other => panic!("expected UnexpectedStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn an_unwritable_work_dir_surfaces_as_io_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"bytes".to_vec()))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let http = reqwest::Client::new();
        let url = format!("{}/dl/export.zip", server.uri());
        let err = fetch_archive(&http, &url, &missing).await.unwrap_err();

        assert!(matches!(err, Error::Io(_)));
    }
}
