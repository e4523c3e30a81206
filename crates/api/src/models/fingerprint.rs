use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::SystemTime;

/// Identity of one version of an archive: absolute path plus modification
/// time in seconds since the Unix epoch.
///
/// The textual form `<path>_<mtime>` is what the scanned-file ledger stores,
/// one per line.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint {
    pub path: PathBuf,
    pub modified: u64,
}

impl Fingerprint {
    pub fn new(path: impl Into<PathBuf>, modified: u64) -> Self {
        Self {
            path: path.into(),
            modified,
        }
    }

    /// Fingerprint the archive currently on disk at `path`.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = fs::metadata(path)?;
        let modified = metadata
            .modified()?
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

        Ok(Self { path, modified })
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.path.display(), self.modified)
    }
}

impl FromStr for Fingerprint {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, modified) = s
            .trim_end()
            .rsplit_once('_')
            .ok_or_else(|| ApiError::InvalidFingerprint(s.to_string()))?;
        if path.is_empty() {
            return Err(ApiError::InvalidFingerprint(s.to_string()));
        }
        let modified = modified
            .parse::<u64>()
            .map_err(|_| ApiError::InvalidFingerprint(s.to_string()))?;

        Ok(Self::new(path, modified))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_form_survives_underscores_in_path() {
        let fp = Fingerprint::new("/data/my_libs/support_v4.jar", 1700000000);
        let text = fp.to_string();
        assert_eq!(text, "/data/my_libs/support_v4.jar_1700000000");
        assert_eq!(text.parse::<Fingerprint>().unwrap(), fp);
    }

    #[test]
    fn test_rejects_malformed_lines() {
        assert!("no-timestamp".parse::<Fingerprint>().is_err());
        assert!("/a.jar_abc".parse::<Fingerprint>().is_err());
        assert!("_12".parse::<Fingerprint>().is_err());
    }

    #[test]
    fn test_from_path_tracks_file() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("lib.jar");
        fs::write(&jar, b"PK").unwrap();

        let fp = Fingerprint::from_path(&jar).unwrap();
        assert!(fp.path.is_absolute());
        assert_eq!(fp, Fingerprint::from_path(&jar).unwrap());
    }
}
