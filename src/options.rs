//! Export options and their resolution rules

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Base URL of the production export API
pub const PROD_URL: &str = "https://cables.gl";

/// Base URL of the dev environment export API
pub const DEV_URL: &str = "https://dev.cables.gl";

/// Asset bundling mode for an export
///
/// Anything outside the exact set `auto`, `all`, `none` silently coerces to
/// [`AssetMode::Auto`]; an invalid mode is never an error. The match is
/// case-sensitive, so `"ALL"` coerces to `Auto` as well.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssetMode {
    /// Bundle the assets the patch actually references
    #[default]
    Auto,
    /// Bundle every asset of the project
    All,
    /// Bundle no assets at all
    None,
}

impl AssetMode {
    /// The lowercase token the export API expects.
    pub fn as_str(self) -> &'static str {
        match self {
            AssetMode::Auto => "auto",
            AssetMode::All => "all",
            AssetMode::None => "none",
        }
    }
}

impl From<&str> for AssetMode {
    fn from(s: &str) -> Self {
        match s {
            "all" => AssetMode::All,
            "none" => AssetMode::None,
            // anything else, including "auto", is the default mode
            _ => AssetMode::Auto,
        }
    }
}

impl From<String> for AssetMode {
    fn from(s: String) -> Self {
        s.as_str().into()
    }
}

impl From<AssetMode> for String {
    fn from(mode: AssetMode) -> Self {
        mode.as_str().to_string()
    }
}

impl FromStr for AssetMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(s.into())
    }
}

impl fmt::Display for AssetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical options for one export run
///
/// Every frontend (command line flags, the camelCase JSON surface of the
/// programmatic API) resolves into this one record before anything touches
/// the network. Resolution is deterministic: identical inputs produce equal
/// `ExportOptions`.
///
/// The serde names follow the export API's own camelCase spelling, so
/// `serde_json::from_value` accepts the same objects the API documents:
///
/// ```
/// use cables_cli::options::{AssetMode, ExportOptions};
///
/// let options: ExportOptions = serde_json::from_value(serde_json::json!({
///     "patchId": "pQpie9",
///     "noExtract": true,
///     "assets": "none",
/// })).unwrap();
/// assert_eq!(options.assets, AssetMode::None);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportOptions {
    /// Id of the patch to export (required)
    pub patch_id: String,

    /// Where to put the result. `None` derives a directory from the download,
    /// `Some("")` (flag given without a value) falls back to `patch`,
    /// anything else is used absolute or relative to the working directory.
    pub destination: Option<String>,

    /// Keep the downloaded archive as a `.zip` instead of unpacking it
    pub no_extract: bool,

    /// Ask the server to leave `index.html` out of the export
    pub no_index: bool,

    /// File name for the patch json inside the export (extension is stripped)
    pub json_filename: Option<String>,

    /// Which assets the server should bundle
    pub assets: AssetMode,

    /// Combine the patch javascript into a single file
    pub combine_js: bool,

    /// Skip minification of the exported javascript
    pub no_minify: bool,

    /// Include source maps in the export
    pub sourcemaps: bool,

    /// Minify shader sources in the export
    pub minify_glsl: bool,

    /// Leave backup files out of the export
    pub skip_backups: bool,

    /// Flatten the export instead of using subdirectories
    pub no_subdirs: bool,

    /// Hide the "made with cables" badge in the export
    pub hide_made_with_cables: bool,

    /// Talk to the dev environment instead of production
    pub dev: bool,

    /// Explicit service URL, overriding both environments
    pub url: Option<String>,

    /// API key for this run, overriding the stored credential
    pub api_key: Option<String>,
}

impl ExportOptions {
    /// Creates options for the given patch with everything else at defaults.
    pub fn new(patch_id: impl Into<String>) -> Self {
        Self {
            patch_id: patch_id.into(),
            ..Self::default()
        }
    }

    /// The service base URL these options resolve to.
    ///
    /// An explicit [`url`](Self::url) wins, then [`dev`](Self::dev) selects
    /// the dev environment, otherwise production.
    pub fn base_url(&self) -> &str {
        match &self.url {
            Some(url) => url.as_str(),
            None if self.dev => DEV_URL,
            None => PROD_URL,
        }
    }

    /// Checks that the options are complete enough to start an export.
    pub fn validate(&self) -> Result<()> {
        if self.patch_id.trim().is_empty() {
            return Err(Error::MissingProjectId);
        }
        Ok(())
    }
}
