//! Provenance metadata for archived uploads.
//!
//! Every accepted upload gets an opaque id and a timestamped directory under
//! the output root, so runs can be retrieved later without a database.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Metadata recorded next to each archived upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadProvenance {
    pub original_filename: String,
    /// 16 hex character upload id.
    pub upload_id: String,
    pub upload_at: DateTime<Utc>,
    pub simulation_ok: bool,
}

impl UploadProvenance {
    pub fn new(original_filename: impl Into<String>, simulation_ok: bool) -> Self {
        Self {
            original_filename: original_filename.into(),
            upload_id: new_upload_id(),
            upload_at: Utc::now(),
            simulation_ok,
        }
    }

    /// Archive directory for this upload:
    /// `{prefix}/{YYYY}/{MM}/{YYYYmmdd-HHMMSS}-{upload_id}`.
    pub fn output_subdir(&self, prefix: impl Into<PathBuf>) -> PathBuf {
        let mut dir = prefix.into();
        dir.push(format!("{:04}", self.upload_at.year()));
        dir.push(format!("{:02}", self.upload_at.month()));
        dir.push(format!(
            "{}-{}",
            self.upload_at.format("%Y%m%d-%H%M%S"),
            self.upload_id
        ));
        dir
    }
}

static UPLOAD_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Fresh opaque upload id, 16 lowercase hex characters.
///
/// Hashes the wall clock together with a process-local counter so two uploads
/// in the same nanosecond still get distinct ids.
pub fn new_upload_id() -> String {
    let counter = UPLOAD_COUNTER.fetch_add(1, Ordering::Relaxed);
    let now = Utc::now().timestamp_nanos_opt().unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(now.to_le_bytes());
    hasher.update(counter.to_le_bytes());
    let digest = hasher.finalize();

    hex::encode(&digest[..8])
}
