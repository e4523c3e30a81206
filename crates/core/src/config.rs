//! Configuration loaded from `<home>/config.json`.
//!
//! Every field has a default, so a missing or partial file is fine. The
//! home directory is `$LUASENSE_HOME` when set, `~/.luasense` otherwise.

use crate::complete::ranking::RankingStrategy;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const HOME_ENV: &str = "LUASENSE_HOME";
pub const DEFAULT_HOME_DIR: &str = ".luasense";
pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LuasenseConfig {
    pub home: PathBuf,
    pub completion: CompletionConfig,
    pub scan: ScanConfig,
    /// Contextual aliases merged into every request (`this` → host type)
    pub aliases: BTreeMap<String, String>,
    /// Package-function tables added over the Lua standard library
    pub packages: IndexMap<String, Vec<String>>,
    /// Keywords appended to the default keyword table
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub case_sensitive: bool,
    /// Render method parameters with fully-qualified type names
    pub full_parameter_types: bool,
    pub ranking: RankingStrategy,
    /// Names holding two or more of these are compiler-generated
    pub synthetic_marker: char,
    /// Let identifier lookups wait briefly for a busy registry
    pub wait_for_identifiers: bool,
    pub identifier_wait_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Classes reflected per batch
    pub batch_size: usize,
    /// Classes whose binary name contains any of these are never reflected.
    /// The defaults cover descriptor classes and the host's own runtime
    /// classes, which are unsafe to reflect into the index
    pub deny_list: Vec<String>,
    /// Directory depth searched when a directory is given as a scan root
    pub max_depth: usize,
    /// Archive file extensions picked up by discovery
    pub extensions: Vec<String>,
}

impl Default for LuasenseConfig {
    fn default() -> Self {
        Self {
            home: default_home(),
            completion: CompletionConfig::default(),
            scan: ScanConfig::default(),
            aliases: BTreeMap::new(),
            packages: IndexMap::new(),
            keywords: Vec::new(),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            full_parameter_types: false,
            ranking: RankingStrategy::Grouped,
            synthetic_marker: '$',
            wait_for_identifiers: false,
            identifier_wait_ms: 3,
        }
    }
}

impl CompletionConfig {
    pub fn identifier_wait(&self) -> Duration {
        Duration::from_millis(self.identifier_wait_ms)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_size: 256,
            deny_list: vec![
                "module-info".to_string(),
                "package-info".to_string(),
                "META-INF".to_string(),
                "RSASecurity".to_string(),
                "LuaApplication".to_string(),
                "axmleditor".to_string(),
            ],
            max_depth: 1,
            extensions: vec!["jar".to_string(), "zip".to_string(), "dex".to_string()],
        }
    }
}

impl ScanConfig {
    pub fn is_denied(&self, class: &str) -> bool {
        self.deny_list.iter().any(|denied| class.contains(denied.as_str()))
    }
}

/// Base directory, supporting the LUASENSE_HOME env var.
pub fn default_home() -> PathBuf {
    if let Ok(env_dir) = std::env::var(HOME_ENV) {
        return PathBuf::from(env_dir);
    }

    dirs::home_dir()
        .map(|home| home.join(DEFAULT_HOME_DIR))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_HOME_DIR))
}

impl LuasenseConfig {
    /// Load `<home>/config.json`, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&default_home())
    }

    pub fn load_from(home: &Path) -> Self {
        let path = home.join(CONFIG_FILE);
        let mut config = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<LuasenseConfig>(&text) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Ignoring malformed config {}: {}", path.display(), e);
                    LuasenseConfig::default()
                }
            },
            Err(_) => LuasenseConfig::default(),
        };
        config.home = home.to_path_buf();
        config
    }

    pub fn index_dir(&self) -> PathBuf {
        self.home.join("index")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.home.join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{ "completion": { "case_sensitive": true }, "scan": { "batch_size": 8 } }"#,
        )
        .unwrap();

        let config = LuasenseConfig::load_from(dir.path());
        assert!(config.completion.case_sensitive);
        assert_eq!(config.completion.synthetic_marker, '$');
        assert_eq!(config.scan.batch_size, 8);
        assert_eq!(config.scan.max_depth, 1);
        assert_eq!(config.index_dir(), dir.path().join("index"));
    }

    #[test]
    fn test_malformed_config_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{ not json").unwrap();

        let config = LuasenseConfig::load_from(dir.path());
        assert!(!config.completion.case_sensitive);
        assert_eq!(config.home, dir.path());
    }

    #[test]
    fn test_deny_list_matches_substrings() {
        let scan = ScanConfig::default();
        assert!(scan.is_denied("module-info"));
        assert!(scan.is_denied("com.host.LuaApplication"));
        assert!(scan.is_denied("com.host.LuaApplication$Worker"));
        assert!(scan.is_denied("bin.axmleditor.Editor"));
        assert!(scan.is_denied("com.util.RSASecurity"));
        assert!(!scan.is_denied("android.widget.Button"));
    }
}
