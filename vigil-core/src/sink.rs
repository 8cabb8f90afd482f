//! Write-only persistence of sealed records.
//!
//! A sink failure never changes the outcome of an analysis: `persist` logs
//! the error and returns it to the caller for reporting only.

use crate::error::{CoreError, CoreResult};
use crate::record::AnalysisRecord;
use log::{debug, error};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub trait RecordSink: Send + Sync {
    fn write(&self, record: &AnalysisRecord) -> CoreResult<()>;
}

/// Writes a record through `sink`, logging any failure.
pub fn persist(sink: &dyn RecordSink, record: &AnalysisRecord) -> CoreResult<()> {
    sink.write(record).inspect_err(|e| {
        error!("Failed to persist record {}: {}", record.request_id(), e);
    })
}

/// Writes `<dir>/<request_id>.json`, atomically.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, record: &AnalysisRecord) -> PathBuf {
        self.dir.join(format!("{}.json", record.request_id()))
    }
}

impl RecordSink for JsonFileSink {
    fn write(&self, record: &AnalysisRecord) -> CoreResult<()> {
        if !record.is_sealed() {
            return Err(CoreError::Internal(format!(
                "refusing to persist unsealed record {}",
                record.request_id()
            )));
        }
        fs::create_dir_all(&self.dir)?;

        let json = record.to_json()?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.flush()?;

        let path = self.path_for(record);
        tmp.persist(&path).map_err(|e| CoreError::Io(e.error))?;
        debug!("Record written to {}", path.display());
        Ok(())
    }
}
