//! Media introspection module
//!
//! This module turns the introspection document produced by the probe toolkit
//! into a typed [`StreamDescriptor`], which is computed once per request and
//! shared read-only by every analyzer.

pub mod descriptor;
pub mod schema;

// Re-export commonly used types
pub use descriptor::{AudioDescriptor, Ratio, StreamDescriptor, VideoDescriptor};
pub use schema::ProbeDocument;
