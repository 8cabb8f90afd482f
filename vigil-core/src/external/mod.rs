// ============================================================================
// vigil-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: The Probe Adapter and Its Toolkits
//
// This module encapsulates every interaction with the external command-line
// tools (ffprobe for structural introspection, ffmpeg for filter runs). The
// rest of the engine only ever talks to a ProbeAdapter, which in turn talks to
// a ProbeToolkit, so tests can swap the real tools for a scripted toolkit.
//
// KEY COMPONENTS:
// - ProbeToolkit trait and the invocation/output types
// - FfmpegToolkit: the real implementation (ffprobe + ffmpeg-sidecar)
// - process::supervise: kill-and-reap supervision under a CancellationToken
// - ProbeAdapter: retry policy and logging around a toolkit
// - mocks::ScriptedToolkit: scripted responses for tests

// ============================================================================
// SUBMODULES
// ============================================================================

pub mod adapter;
pub mod ffmpeg_toolkit;
pub mod mocks;
pub mod process;
pub mod toolkit;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use adapter::ProbeAdapter;
pub use ffmpeg_toolkit::{FfmpegToolkit, graphs};
pub use toolkit::{ProbeInvocation, ProbeToolkit, RawOutput, StreamKind};
