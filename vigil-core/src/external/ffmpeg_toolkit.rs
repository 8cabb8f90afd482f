// ============================================================================
// vigil-core/src/external/ffmpeg_toolkit.rs
// ============================================================================
//
// FFMPEG TOOLKIT: ProbeToolkit Backed by ffprobe and ffmpeg
//
// Introspection runs `ffprobe -print_format json -show_format -show_streams`.
// Filter invocations run ffmpeg (through ffmpeg-sidecar's FfmpegCommand) with
// the requested graph, decoding into the null muxer; the graph is expected to
// end in `metadata=print:file=-` (or `ametadata`) so that per-frame metadata
// arrives on stdout, separate from ffmpeg's own log on stderr.
//
// Both kinds are supervised by `process::supervise`, which is what gives them
// cancellation, deadlines and guaranteed reaping.

use super::process::{Captured, supervise};
use super::toolkit::{ProbeInvocation, ProbeToolkit, RawOutput, StreamKind};
use crate::cancel::CancellationToken;
use crate::config::ResourceConfig;
use crate::error::{CoreResult, command_start_error};
use ffmpeg_sidecar::command::FfmpegCommand;
use log::debug;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

/// Production toolkit.
#[derive(Debug, Clone)]
pub struct FfmpegToolkit {
    ffmpeg_path: String,
    ffprobe_path: String,
    poll_interval: Duration,
}

impl FfmpegToolkit {
    pub fn new(ffmpeg_path: impl Into<String>, ffprobe_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
            poll_interval: Duration::from_millis(50),
        }
    }

    pub fn from_config(config: &ResourceConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            ffprobe_path: config.ffprobe_path.clone(),
            poll_interval: config.poll_interval(),
        }
    }

    fn introspect(&self, source: &Path, token: &CancellationToken) -> CoreResult<Captured> {
        let mut cmd = Command::new(&self.ffprobe_path);
        cmd.args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(source)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

        debug!("Running ffprobe: {:?}", cmd);
        let mut child = cmd
            .spawn()
            .map_err(|e| command_start_error(&self.ffprobe_path, e))?;
        supervise(&mut child, "ffprobe", token, self.poll_interval)
    }

    fn filter(
        &self,
        source: &Path,
        stream: StreamKind,
        graph: &str,
        token: &CancellationToken,
    ) -> CoreResult<Captured> {
        let mut cmd = FfmpegCommand::new_with_path(&self.ffmpeg_path);
        cmd.hide_banner()
            .args(["-nostats", "-nostdin"])
            .input(source.to_string_lossy().into_owned())
            .args(["-map", stream.map_spec()])
            .args([stream.filter_flag(), graph])
            .format("null")
            .output("-");

        debug!(
            "Running ffmpeg {} {} on {}",
            stream.filter_flag(),
            graph,
            source.display()
        );
        let mut child = cmd
            .spawn()
            .map_err(|e| command_start_error(&self.ffmpeg_path, e))?;
        supervise(child.as_inner_mut(), "ffmpeg", token, self.poll_interval)
    }
}

impl Default for FfmpegToolkit {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl ProbeToolkit for FfmpegToolkit {
    fn invoke(
        &self,
        invocation: &ProbeInvocation,
        token: &CancellationToken,
    ) -> CoreResult<RawOutput> {
        let captured = match invocation {
            ProbeInvocation::Introspect { source } => self.introspect(source, token)?,
            ProbeInvocation::Filter {
                source,
                stream,
                graph,
                ..
            } => self.filter(source, *stream, graph, token)?,
        };

        Ok(RawOutput {
            stdout: captured.stdout,
            stderr: captured.stderr,
            elapsed: captured.elapsed,
        })
    }
}

/// Filter graphs used by the analyzers.
///
/// Each one ends in a print stage writing `frame:` headers and `lavfi.*`
/// key/value lines to stdout.
pub mod graphs {
    /// Luminance/chroma statistics plus the scene score of every frame.
    pub const FLASH: &str = "signalstats,select='gte(scene,0)',metadata=print:file=-";

    /// Scene score of every frame.
    pub const SCENE: &str = "select='gte(scene,0)',metadata=print:file=-";

    /// Percentage of black pixels for every frame. `amount=0` makes the
    /// filter tag every frame so that black runs have a visible end.
    pub fn black(pixel_threshold: u32) -> String {
        format!(
            "blackframe=amount=0:threshold={},metadata=print:file=-",
            pixel_threshold
        )
    }

    /// EBU R128 momentary, short-term, integrated loudness and LRA.
    pub const LOUDNESS: &str = "ebur128=metadata=1,ametadata=print:file=-";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_missing_binary_is_unavailable() {
        let toolkit = FfmpegToolkit::new(
            "/nonexistent/vigil-test/ffmpeg",
            "/nonexistent/vigil-test/ffprobe",
        );
        let token = CancellationToken::new();

        let err = toolkit
            .invoke(&ProbeInvocation::introspect("/tmp/input.mkv"), &token)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ToolUnavailable);

        let err = toolkit
            .invoke(
                &ProbeInvocation::filter("/tmp/input.mkv", StreamKind::Video, graphs::SCENE, "scene_cuts"),
                &token,
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ToolUnavailable);
    }

    #[test]
    fn test_black_graph_threshold() {
        assert_eq!(
            graphs::black(32),
            "blackframe=amount=0:threshold=32,metadata=print:file=-"
        );
    }
}
