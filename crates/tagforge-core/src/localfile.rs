//! Scoped materialization of job payloads on local disk.

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use tracing::{debug, warn};

use crate::error::Result;

/// A job payload written to the scoped working directory.
///
/// The file is removed when the guard drops, so cleanup runs on every exit
/// path of the job pipeline: success, handler error, or unsupported type.
#[derive(Debug)]
pub struct LocalFile {
    path: PathBuf,
}

impl LocalFile {
    /// Decode base64 `filedata` and write it under `work_dir/file_name`.
    ///
    /// Creates the working directory if it does not exist yet.
    pub fn materialize(work_dir: &Path, file_name: &str, filedata_b64: &str) -> Result<Self> {
        let decoded = base64::engine::general_purpose::STANDARD.decode(filedata_b64)?;

        fs::create_dir_all(work_dir)?;
        let path = work_dir.join(file_name);
        fs::write(&path, &decoded)?;

        debug!(path = %path.display(), bytes = decoded.len(), "Materialized job payload");
        Ok(Self { path })
    }

    /// Path of the materialized file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LocalFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            // Missing file means someone removed it for us; anything else is
            // worth surfacing to the operator.
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "Failed to remove job payload");
            }
        }
    }
}
