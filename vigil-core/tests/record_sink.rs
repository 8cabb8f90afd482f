//! Persistence of sealed records.

mod common;

use common::*;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;
use vigil_core::external::mocks::ScriptedToolkit;
use vigil_core::sink::persist;
use vigil_core::{
    AnalysisRecord, AnalysisRequest, CoreError, CoreResult, JsonFileSink, RecordSink, RecordStatus,
};

struct BrokenSink;

impl RecordSink for BrokenSink {
    fn write(&self, _record: &AnalysisRecord) -> CoreResult<()> {
        Err(CoreError::Io(std::io::Error::other("disk full")))
    }
}

fn completed_record() -> AnalysisRecord {
    let toolkit = Arc::new(ScriptedToolkit::new());
    toolkit.respond("introspect", probe_json(2.0));
    toolkit.respond("flash", luminance_output(10.0, &alternating(20)));
    let request = AnalysisRequest::new("promo.mp4", ["flash", "stream_format"], budget());
    orchestrator(&toolkit).run(&request)
}

#[test]
fn test_json_sink_writes_full_record() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let sink = JsonFileSink::new(dir.path());
    let record = completed_record();
    assert_eq!(record.status(), RecordStatus::Completed);

    persist(&sink, &record)?;

    let path = dir.path().join(format!("{}.json", record.request_id()));
    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(path)?)?;
    assert_eq!(value["status"], "completed");
    assert_eq!(value["sections"].as_array().unwrap().len(), 2);
    assert_eq!(value["sections"][0]["metrics"]["type"], "flash");
    assert_eq!(value["compliance"]["overall"], "non_compliant");
    assert!(value["descriptor"]["video"]["width"].as_u64() == Some(1920));

    // No temporary files are left next to the record.
    assert_eq!(fs::read_dir(dir.path())?.count(), 1);
    Ok(())
}

#[test]
fn test_sink_failure_leaves_record_untouched() {
    let record = completed_record();
    let before = record.to_json().unwrap();

    assert!(persist(&BrokenSink, &record).is_err());
    assert_eq!(record.to_json().unwrap(), before);
    assert_eq!(record.status(), RecordStatus::Completed);
}
