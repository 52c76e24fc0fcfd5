//! Error types for cables-cli
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (export request, download, install, deploy)
//! - Export API status code mapping with the server's wording preserved
//! - Process exit code mapping for the command line frontend

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cables-cli operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for cables-cli
///
/// This is the primary error type used throughout the library. Each variant
/// includes the context needed to diagnose a failed export or deploy.
#[derive(Debug, Error)]
pub enum Error {
    /// No credential available for the requested operation
    #[error("{credential} needed")]
    ConfigMissing {
        /// The missing credential (e.g. "API key")
        credential: String,
    },

    /// No project id was supplied for an export
    #[error("no project id set, pass a project id to export")]
    MissingProjectId,

    /// The export API rejected the supplied API key
    #[error("invalid api key")]
    InvalidApiKey,

    /// The export API does not know the requested project
    #[error("unknown project, check patch id: {project_id}")]
    UnknownProject {
        /// The project id the server did not recognize
        project_id: String,
    },

    /// The account may not export this project
    #[error("insufficient rights for project export")]
    InsufficientRights,

    /// The account may not export, or its export quota is exhausted
    #[error("insufficient rights or export quota reached: {body}")]
    InsufficientRightsOrQuota {
        /// Response body returned by the server
        body: String,
    },

    /// The export API failed internally
    #[error("unknown error, maybe try again")]
    ServerError,

    /// The export API answered with a status code outside the known set
    #[error("invalid response code {status}: {body}")]
    UnexpectedStatus {
        /// The HTTP status code that was returned
        status: u16,
        /// Response body returned by the server
        body: String,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive extraction failed
    #[error("extraction failed for {}: {reason}", archive.display())]
    Extract {
        /// The downloaded archive that failed to extract
        archive: PathBuf,
        /// The reason extraction failed
        reason: String,
    },

    /// Moving the downloaded archive to its final name failed
    #[error("failed to rename {} to {}: {reason}", from.display(), to.display())]
    Rename {
        /// The temporary archive path
        from: PathBuf,
        /// The final path the archive should end up at
        to: PathBuf,
        /// The reason the rename failed
        reason: String,
    },

    /// Uploading an exported patch to a hosting provider failed
    #[error("deploy failed: {message}")]
    Deploy {
        /// The provider's failure message
        message: String,
    },
}

impl Error {
    /// Process exit code for the command line frontend.
    ///
    /// Usage problems sit next to clap's own exit code 2, credential and
    /// permission problems come before transport problems, local filesystem
    /// problems come last.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::MissingProjectId => 2,
            Error::ConfigMissing { .. } => 3,
            Error::InvalidApiKey => 4,
            Error::UnknownProject { .. } => 5,
            Error::InsufficientRights | Error::InsufficientRightsOrQuota { .. } => 6,
            Error::ServerError | Error::UnexpectedStatus { .. } => 7,
            Error::Network(_) => 8,
            Error::Io(_) => 9,
            Error::Extract { .. } | Error::Rename { .. } => 10,
            Error::Deploy { .. } => 11,
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Helpers: construct every string-constructible Error variant for
    // exit code and Display tests. Network is excluded (reqwest::Error has
    // no public constructor).
    // -----------------------------------------------------------------------

    /// Returns a vec of (Error, expected_exit_code) for every reachable
    /// match arm in exit_code.
    fn all_error_variants() -> Vec<(Error, i32)> {
        vec![
            (Error::MissingProjectId, 2),
            (
                Error::ConfigMissing {
                    credential: "API key".into(),
                },
                3,
            ),
            (Error::InvalidApiKey, 4),
            (
                Error::UnknownProject {
                    project_id: "pQpie9".into(),
                },
                5,
            ),
            (Error::InsufficientRights, 6),
            (
                Error::InsufficientRightsOrQuota {
                    body: "quota exceeded".into(),
                },
                6,
            ),
            (Error::ServerError, 7),
            (
                Error::UnexpectedStatus {
                    status: 418,
                    body: "teapot".into(),
                },
                7,
            ),
            (
                Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
                9,
            ),
            (
                Error::Extract {
                    archive: PathBuf::from("/tmp/patch.zip"),
                    reason: "not a zip".into(),
                },
                10,
            ),
            (
                Error::Rename {
                    from: PathBuf::from("/tmp/patch.zip"),
                    to: PathBuf::from("/dest/patch.zip"),
                    reason: "permission denied".into(),
                },
                10,
            ),
            (
                Error::Deploy {
                    message: "site not found".into(),
                },
                11,
            ),
        ]
    }

    // -----------------------------------------------------------------------
    // 1. Every Error variant -> correct (non-zero) process exit code
    // -----------------------------------------------------------------------

    #[test]
    fn every_variant_maps_to_expected_exit_code() {
        for (error, expected) in all_error_variants() {
            let actual = error.exit_code();
            assert_eq!(
                actual, expected,
                "Error {error} returned exit code {actual}, expected {expected}"
            );
        }
    }

    #[test]
    fn no_variant_maps_to_exit_code_zero() {
        for (error, _) in all_error_variants() {
            assert_ne!(error.exit_code(), 0, "{error} must not exit 0");
        }
    }

    // -----------------------------------------------------------------------
    // 2. Display output keeps the server's wording
    // -----------------------------------------------------------------------

    #[test]
    fn unknown_project_message_contains_the_project_id() {
        let err = Error::UnknownProject {
            project_id: "pQpie9".into(),
        };
        assert!(
            err.to_string().contains("pQpie9"),
            "message must name the project id: {err}"
        );
    }

    #[test]
    fn server_error_message_suggests_retrying() {
        assert_eq!(Error::ServerError.to_string(), "unknown error, maybe try again");
    }

    #[test]
    fn invalid_api_key_message() {
        assert_eq!(Error::InvalidApiKey.to_string(), "invalid api key");
    }

    #[test]
    fn insufficient_rights_message() {
        assert_eq!(
            Error::InsufficientRights.to_string(),
            "insufficient rights for project export"
        );
    }

    #[test]
    fn unexpected_status_message_contains_code_and_body() {
        let err = Error::UnexpectedStatus {
            status: 418,
            body: "I'm a teapot".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("418"), "message must contain the status: {msg}");
        assert!(msg.contains("I'm a teapot"), "message must contain the body: {msg}");
    }

    #[test]
    fn quota_message_contains_the_response_body() {
        let err = Error::InsufficientRightsOrQuota {
            body: "export quota exhausted for this month".into(),
        };
        assert!(err.to_string().contains("export quota exhausted for this month"));
    }

    #[test]
    fn config_missing_message_names_the_credential() {
        let err = Error::ConfigMissing {
            credential: "API key".into(),
        };
        assert_eq!(err.to_string(), "API key needed");
    }

    #[test]
    fn rename_message_names_both_paths() {
        let err = Error::Rename {
            from: PathBuf::from("/tmp/a.zip"),
            to: PathBuf::from("/dest/b.zip"),
            reason: "cross-device link".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/a.zip"));
        assert!(msg.contains("/dest/b.zip"));
        assert!(msg.contains("cross-device link"));
    }

    // -----------------------------------------------------------------------
    // 3. From conversions
    // -----------------------------------------------------------------------

    #[test]
    fn io_error_converts_via_from() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.exit_code(), 9);
    }
}
