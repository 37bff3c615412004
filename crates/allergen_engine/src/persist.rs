use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use scan_logging::scan_debug;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::protocol::ScanResponse;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("report path {path:?} is not usable: {reason}")]
    ReportPath { path: PathBuf, reason: String },
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Writes report files so that readers only ever see a complete report: the
/// content goes to a temp file next to the target, which is then renamed over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportWriter {
    target: PathBuf,
}

impl ReportWriter {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// Directory that receives the temp file; `.` for a bare file name.
    fn parent_dir(&self) -> PathBuf {
        match self.target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    pub fn write(&self, content: &str) -> Result<&Path, PersistError> {
        if self.target.file_name().is_none() {
            return Err(self.unusable("no file name"));
        }
        let dir = self.parent_dir();
        if dir.is_file() {
            return Err(self.unusable("parent is a file"));
        }
        fs::create_dir_all(&dir).map_err(|err| self.unusable(&err.to_string()))?;

        let mut staged = NamedTempFile::new_in(&dir)?;
        staged.write_all(content.as_bytes())?;
        staged.as_file_mut().sync_all()?;
        staged
            .persist(&self.target)
            .map_err(|err| PersistError::Io(err.error))?;

        scan_debug!("Wrote {} bytes to {:?}", content.len(), self.target);
        Ok(&self.target)
    }

    fn unusable(&self, reason: &str) -> PersistError {
        PersistError::ReportPath {
            path: self.target.clone(),
            reason: reason.to_string(),
        }
    }
}

/// Writes the response as pretty JSON to `path`, replacing any previous report.
pub fn write_report(path: &Path, response: &ScanResponse) -> Result<PathBuf, PersistError> {
    let json = response.to_json_pretty()?;
    let writer = ReportWriter::new(path);
    let written = writer.write(&json)?.to_path_buf();
    Ok(written)
}
