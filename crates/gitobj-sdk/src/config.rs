use std::fs;
use std::io;
use std::path::Path;

use gitobj_store::codec::DEFAULT_LEVEL;
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Name of the config file inside the metadata directory.
pub const CONFIG_FILE: &str = "gitobj.toml";

/// Default name of the metadata directory under the repository root.
pub const DEFAULT_METADATA_DIR: &str = ".git";

/// Per-repository settings.
///
/// Every field is optional in the TOML file; missing fields take their
/// default values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Directory under the root holding `objects/`, `refs/` and `HEAD`.
    pub metadata_dir: String,
    /// zlib level for newly written objects, clamped to 0-9.
    pub compression_level: u32,
    /// Author and committer identity, e.g. `Name <email>`.
    pub identity: String,
    /// Fixed offset for commit timestamps; `None` uses the local timezone.
    pub tz_offset_minutes: Option<i32>,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            metadata_dir: DEFAULT_METADATA_DIR.into(),
            compression_level: DEFAULT_LEVEL,
            identity: "gitobj <gitobj@localhost>".into(),
            tz_offset_minutes: None,
        }
    }
}

impl RepoConfig {
    /// Parse a TOML config file.
    pub fn load(path: &Path) -> SdkResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text).map_err(|reason| SdkError::Config {
            path: path.display().to_string(),
            reason,
        })
    }

    /// Load `<metadata_path>/gitobj.toml`, or defaults when there is none.
    ///
    /// `metadata_dir` always reflects the directory the file was found in.
    pub fn load_or_default(metadata_path: &Path) -> SdkResult<Self> {
        let mut config = match Self::load(&metadata_path.join(CONFIG_FILE)) {
            Ok(config) => config,
            Err(SdkError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(e),
        };
        if let Some(name) = metadata_path.file_name() {
            config.metadata_dir = name.to_string_lossy().into_owned();
        }
        Ok(config)
    }

    fn from_toml(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> String {
        // Only scalar fields; serialization cannot fail.
        toml::to_string(self).unwrap_or_default()
    }

    /// The compression level actually handed to the store.
    pub fn effective_compression_level(&self) -> u32 {
        self.compression_level.min(9)
    }
}
