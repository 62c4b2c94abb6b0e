//! Release ledger
//!
//! A JSON history of released `versionCode`s per `applicationId`. Each new
//! release must carry a strictly greater `versionCode` than the last one
//! recorded for the same application.
//!
//! ```rust,ignore
//! let mut ledger = ReleaseLedger::load(Path::new(".buildspec/releases.json"))?;
//! ledger.record(ReleaseRecord::new("com.radha.japa", 12, Some("1.2.0".into())))?;
//! ledger.save()?;
//! ```

use buildspec_core::error::{Error, Result, ResultExt};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One released build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    pub application_id: String,
    pub version_code: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_name: Option<String>,
    pub recorded_at: DateTime<Utc>,
    /// SHA-256 of the descriptor text at release time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptor_sha256: Option<String>,
}

impl ReleaseRecord {
    pub fn new(
        application_id: impl Into<String>,
        version_code: u32,
        version_name: Option<String>,
    ) -> Self {
        Self {
            application_id: application_id.into(),
            version_code,
            version_name,
            recorded_at: Utc::now(),
            descriptor_sha256: None,
        }
    }

    /// Attach the digest of the descriptor source
    pub fn with_descriptor(mut self, source: &str) -> Self {
        self.descriptor_sha256 = Some(descriptor_digest(source));
        self
    }
}

/// Hex SHA-256 of descriptor text
pub fn descriptor_digest(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hex::encode(hasher.finalize())
}

/// Release history backed by a JSON file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseLedger {
    #[serde(default)]
    releases: Vec<ReleaseRecord>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl ReleaseLedger {
    /// Empty in-memory ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from disk; a missing file is an empty ledger bound to `path`
    pub fn load(path: &Path) -> Result<Self> {
        let mut ledger = if path.is_file() {
            let text = fs::read_to_string(path)?;
            serde_json::from_str::<ReleaseLedger>(&text)
                .map_err(|e| Error::ledger(format!("Malformed ledger: {}", e)).with_source(e))
                .context(format!("While reading {}", path.display()))?
        } else {
            debug!(path = %path.display(), "No ledger yet");
            Self::new()
        };
        ledger.path = Some(path.to_path_buf());
        Ok(ledger)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn releases(&self) -> &[ReleaseRecord] {
        &self.releases
    }

    /// Highest recorded release for an application
    pub fn last_for(&self, application_id: &str) -> Option<&ReleaseRecord> {
        self.releases
            .iter()
            .filter(|r| r.application_id == application_id)
            .max_by_key(|r| r.version_code)
    }

    /// Check a candidate `versionCode`
    ///
    /// Returns the last release when the candidate is strictly greater, and
    /// a `VersionRegression` error otherwise.
    pub fn check(&self, application_id: &str, version_code: u32) -> Result<Option<&ReleaseRecord>> {
        match self.last_for(application_id) {
            Some(last) if version_code <= last.version_code => {
                Err(Error::version_regression(version_code, last.version_code)
                    .with_context(format!("applicationId {}", application_id)))
            }
            last => Ok(last),
        }
    }

    /// Append a release that passes [`ReleaseLedger::check`]
    pub fn record(&mut self, record: ReleaseRecord) -> Result<()> {
        self.check(&record.application_id, record.version_code)?;
        info!(
            application_id = %record.application_id,
            version_code = record.version_code,
            "Recording release"
        );
        self.releases.push(record);
        Ok(())
    }

    /// Write back to the path the ledger was loaded from
    pub fn save(&self) -> Result<()> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| Error::ledger("Ledger has no backing file"))?;
        self.save_to(path)
    }

    /// Write to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, json + "\n")?;
        fs::rename(&staging, path)?;
        debug!(path = %path.display(), releases = self.releases.len(), "Ledger saved");
        Ok(())
    }
}
