//! Credential store backed by the per-user `.cablesrc` file

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

/// File name of the credential store inside the user's home directory
pub const CONFIG_FILENAME: &str = ".cablesrc";

const KEY_API: &str = "apikey";
const KEY_NETLIFY: &str = "netlifytoken";

/// Persisted credentials for the export API and hosting providers
///
/// Backed by a flat `key=value` file (`~/.cablesrc` by default). The file is
/// read fully on load and rewritten fully on save; the last writer wins.
/// Blank lines and `#`/`;` comment lines are tolerated on read, unknown keys
/// survive a save. The store is passed explicitly to
/// [`CablesClient`](crate::client::CablesClient) so embedders and tests can
/// point it at their own file.
#[derive(Clone, Debug)]
pub struct ConfigStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl ConfigStore {
    /// Loads the store from `.cablesrc` in the user's home directory.
    ///
    /// A missing file yields an empty store; only an unreadable file or an
    /// undeterminable home directory is an error.
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            Error::from(std::io::Error::new(
                ErrorKind::NotFound,
                "home directory not found",
            ))
        })?;
        Self::load_from(home.join(CONFIG_FILENAME))
    }

    /// Loads the store from an explicit file path.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => parse_entries(&contents),
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), entries = entries.len(), "loaded credential store");
        Ok(Self { path, entries })
    }

    /// The stored export API key, if one is set and non-empty.
    pub fn api_key(&self) -> Option<&str> {
        self.get(KEY_API)
    }

    /// Stores the export API key. Call [`save`](Self::save) to persist it.
    pub fn set_api_key(&mut self, key: impl Into<String>) {
        self.entries.insert(KEY_API.into(), key.into());
    }

    /// The stored Netlify access token, if one is set and non-empty.
    pub fn netlify_token(&self) -> Option<&str> {
        self.get(KEY_NETLIFY)
    }

    /// Stores the Netlify access token. Call [`save`](Self::save) to persist it.
    pub fn set_netlify_token(&mut self, token: impl Into<String>) {
        self.entries.insert(KEY_NETLIFY.into(), token.into());
    }

    /// Rewrites the whole file from the in-memory entries.
    pub fn save(&self) -> Result<()> {
        let mut contents = String::new();
        for (key, value) in &self.entries {
            contents.push_str(key);
            contents.push('=');
            contents.push_str(value);
            contents.push('\n');
        }
        std::fs::write(&self.path, contents)?;
        debug!(path = %self.path.display(), "saved credential store");
        Ok(())
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

fn parse_entries(contents: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            entries.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    entries
}
