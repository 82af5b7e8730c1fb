use std::fs;
use std::path::Path;

use gitcas_store::StoreConfig;
use gitcas_types::TzOffset;
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Repository settings, usually read from a TOML file.
///
/// ```toml
/// default_branch = "master"
///
/// [store]
/// compression_level = 1
/// fsync = false
///
/// [identity]
/// name = "Max Henstell"
/// email = "max@kapamaki.net"
/// timezone = "-0700"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Branch HEAD points at in a freshly initialised store.
    pub default_branch: String,
    pub store: StoreConfig,
    pub identity: IdentityConfig,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            default_branch: "master".into(),
            store: StoreConfig::default(),
            identity: IdentityConfig::default(),
        }
    }
}

impl RepoConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> SdkResult<Self> {
        toml::from_str(s).map_err(|e| SdkError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| SdkError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> SdkResult<String> {
        toml::to_string(self).map_err(|e| SdkError::Config(e.to_string()))
    }
}

/// Who commits are attributed to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub name: String,
    pub email: String,
    /// `±HHMM`. The local offset is used when absent.
    pub timezone: Option<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            name: "gitcas".into(),
            email: "gitcas@localhost".into(),
            timezone: None,
        }
    }
}

impl IdentityConfig {
    /// The configured offset, if any.
    pub fn offset(&self) -> SdkResult<Option<TzOffset>> {
        self.timezone
            .as_deref()
            .map(|tz| {
                tz.parse()
                    .map_err(|e| SdkError::Config(format!("identity.timezone: {e}")))
            })
            .transpose()
    }
}
