//! Wire message types exchanged with the broker and the meta-manager.
//!
//! Field names mirror the JSON contract of the meta-manager service exactly;
//! do not rename without coordinating a protocol change upstream.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A worker's identity and capability set, published on registration so the
/// meta-manager can route jobs to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub module_id: String,
    pub supported_extensions: Vec<String>,
}

/// Request half of the availability RPC.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailabilityRequest {
    pub module_id: String,
}

/// Response half of the availability RPC, correlated via a single-use
/// reply queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailabilityResponse {
    pub is_available: bool,
    #[serde(default)]
    pub suggested_id: Option<String>,
}

/// One extraction job as delivered on the worker's exclusive queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionJob {
    /// Path or name of the uploaded file; only the basename is used locally.
    pub filename: String,
    /// Base64-encoded file contents.
    pub filedata: String,
    /// Upstream resource id, echoed back in the result.
    pub status_id: i64,
    /// Route PDF jobs to the dynamic-content handler instead of OCR.
    #[serde(default)]
    pub is_dynamic: bool,
}

impl ExtractionJob {
    /// Parse a raw broker message.
    ///
    /// Rejects messages missing any of `filename`, `filedata`, `status_id`
    /// before any filesystem work happens. serde already enforces presence of
    /// the required fields; this additionally rejects empty strings, which
    /// the upstream producer emits for malformed uploads.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let job: ExtractionJob = serde_json::from_slice(raw)?;
        if job.filename.trim().is_empty() {
            return Err(Error::Decode("empty filename".to_string()));
        }
        if job.filedata.is_empty() {
            return Err(Error::Decode("empty filedata".to_string()));
        }
        Ok(job)
    }

    /// Basename of `filename`, the name the payload is stored under locally.
    pub fn file_name(&self) -> &str {
        self.filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.filename)
    }

    /// Lowercased extension of the file, including the leading dot.
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name();
        let idx = name.rfind('.')?;
        if idx == 0 || idx + 1 == name.len() {
            return None;
        }
        Some(name[idx..].to_ascii_lowercase())
    }
}

/// Extraction result published to the durable results queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagsPayload {
    pub tags: Vec<String>,
    pub processed_resource_id: i64,
}
