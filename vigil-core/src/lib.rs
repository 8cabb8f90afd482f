//! Core library of the vigil media quality-control engine.
//!
//! A request names a media item, the quality-control categories to run and a
//! time budget. The [`Orchestrator`] introspects the item once, runs every
//! category as an independently failing task under its own deadline, scores
//! the findings against photosensitivity, loudness and delivery standards,
//! and returns a sealed [`AnalysisRecord`].
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use vigil_core::{AnalysisRequest, EngineConfig, JsonFileSink, Orchestrator, RecordStatus};
//! use vigil_core::sink::persist;
//! use std::time::Duration;
//!
//! let orchestrator = Orchestrator::new(EngineConfig::default()).unwrap();
//! let request = AnalysisRequest::new(
//!     "/media/promo.mxf",
//!     ["flash", "scene_cuts", "loudness"],
//!     Duration::from_secs(300),
//! );
//!
//! let record = orchestrator.run(&request);
//! if record.status() != RecordStatus::Completed {
//!     for degraded in record.degraded() {
//!         eprintln!("{}: {}", degraded.category, degraded.message);
//!     }
//! }
//!
//! let sink = JsonFileSink::new("/var/lib/vigil/records");
//! persist(&sink, &record).ok();
//! ```

pub mod aggregate;
pub mod analyzers;
pub mod cancel;
pub mod category;
pub mod config;
pub mod detection;
pub mod error;
pub mod external;
pub mod file_logging;
pub mod media;
pub mod orchestrator;
pub mod record;
pub mod scoring;
pub mod signal;
pub mod sink;

// Re-exports for public API
pub use cancel::CancellationToken;
pub use category::Category;
pub use config::{EngineConfig, EngineConfigBuilder};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use orchestrator::Orchestrator;
pub use record::{AnalysisRecord, AnalysisRequest, RecordStatus};
pub use scoring::{ComplianceLevel, Severity, Standard};
pub use signal::Confidence;
pub use sink::{JsonFileSink, RecordSink};
