// ============================================================================
// vigil-core/src/external/toolkit.rs
// ============================================================================
//
// PROBE TOOLKIT: The Seam Between the Engine and External Tools
//
// Everything the engine learns about a media item comes through a
// ProbeToolkit. The two invocation kinds mirror what ffprobe and ffmpeg offer:
// a structural introspection document and an ad-hoc filter run whose
// per-frame metadata is printed as text.
//
// KEY COMPONENTS:
// - ProbeInvocation: what to run
// - RawOutput: captured text output of a finished invocation
// - ProbeToolkit: trait implemented by FfmpegToolkit and by test mocks

use crate::cancel::CancellationToken;
use crate::error::CoreResult;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Which elementary stream a filter graph is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Video,
    Audio,
}

impl StreamKind {
    /// Stream specifier selecting the first stream of this kind.
    pub fn map_spec(self) -> &'static str {
        match self {
            StreamKind::Video => "0:v:0",
            StreamKind::Audio => "0:a:0",
        }
    }

    /// ffmpeg option introducing a filter graph for this kind of stream.
    pub fn filter_flag(self) -> &'static str {
        match self {
            StreamKind::Video => "-vf",
            StreamKind::Audio => "-af",
        }
    }
}

/// A single call into the external toolkit.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeInvocation {
    /// Container and stream descriptors as a structured document.
    Introspect { source: PathBuf },

    /// Run `graph` over one stream and capture the frame-tagged metadata.
    /// `label` names the invocation in logs and in scripted test toolkits.
    Filter {
        source: PathBuf,
        stream: StreamKind,
        graph: String,
        label: String,
    },
}

impl ProbeInvocation {
    pub fn introspect(source: impl Into<PathBuf>) -> Self {
        ProbeInvocation::Introspect {
            source: source.into(),
        }
    }

    pub fn filter(
        source: impl Into<PathBuf>,
        stream: StreamKind,
        graph: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        ProbeInvocation::Filter {
            source: source.into(),
            stream,
            graph: graph.into(),
            label: label.into(),
        }
    }

    /// Name of the external tool that serves this invocation.
    pub fn tool(&self) -> &'static str {
        match self {
            ProbeInvocation::Introspect { .. } => "ffprobe",
            ProbeInvocation::Filter { .. } => "ffmpeg",
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ProbeInvocation::Introspect { .. } => "introspect",
            ProbeInvocation::Filter { label, .. } => label,
        }
    }

    pub fn source(&self) -> &Path {
        match self {
            ProbeInvocation::Introspect { source } | ProbeInvocation::Filter { source, .. } => {
                source
            }
        }
    }
}

impl fmt::Display for ProbeInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) on {}", self.label(), self.tool(), self.source().display())
    }
}

/// Captured output of a successful invocation.
#[derive(Debug, Clone, Default)]
pub struct RawOutput {
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl RawOutput {
    pub fn from_stdout(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            ..Self::default()
        }
    }
}

/// Invokes the external signal/metadata toolkit.
///
/// Implementations must stop the underlying process once `token` is no longer
/// active and must always reap it before returning.
pub trait ProbeToolkit: Send + Sync {
    fn invoke(&self, invocation: &ProbeInvocation, token: &CancellationToken)
    -> CoreResult<RawOutput>;
}
