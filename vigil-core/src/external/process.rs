// ============================================================================
// vigil-core/src/external/process.rs
// ============================================================================
//
// PROCESS SUPERVISION: Running External Tools Under a Cancellation Token
//
// Output pipes are drained on reader threads so a chatty tool can never block
// on a full pipe, while the calling thread polls the child for exit and
// watches the token. When the token is cancelled or expires the child is
// killed and then waited on, so no zombie or orphan is left behind.
//
// A grandchild that inherited a pipe can keep it open after the child is
// gone. Readers are therefore collected with a bounded wait and abandoned
// past it.

use crate::cancel::CancellationToken;
use crate::error::{CoreError, CoreResult, command_failed_error};
use log::{debug, trace, warn};
use std::io::Read;
use std::process::{Child, ExitStatus};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// How long pipe readers may take to finish once the child has exited.
pub const PIPE_DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Output of a supervised process that exited on its own.
#[derive(Debug)]
pub struct Captured {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Receiver<String>> {
    pipe.map(|mut reader| {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            // A read error only truncates diagnostics; the exit status decides.
            let _ = reader.read_to_end(&mut buf);
            // The supervisor may have stopped waiting.
            let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
        });
        rx
    })
}

/// Output of one pipe reader, or nothing if it is not done by `until`.
fn collect(reader: Option<Receiver<String>>, tool: &str, pipe: &str, until: Instant) -> String {
    let Some(rx) = reader else {
        return String::new();
    };
    match rx.recv_timeout(until.saturating_duration_since(Instant::now())) {
        Ok(text) => text,
        Err(RecvTimeoutError::Timeout) => {
            warn!("{}: {} still held open after exit, abandoning its reader", tool, pipe);
            String::new()
        }
        Err(RecvTimeoutError::Disconnected) => String::new(),
    }
}

fn collect_both(
    stdout: Option<Receiver<String>>,
    stderr: Option<Receiver<String>>,
    tool: &str,
) -> (String, String) {
    let until = Instant::now() + PIPE_DRAIN_GRACE;
    (
        collect(stdout, tool, "stdout", until),
        collect(stderr, tool, "stderr", until),
    )
}

fn kill_and_reap(child: &mut Child, tool: &str) {
    if let Err(e) = child.kill() {
        // Already exited between the last poll and the kill.
        debug!("kill of {} (pid {}) failed: {}", tool, child.id(), e);
    }
    match child.wait() {
        Ok(status) => debug!("Reaped {} (pid {}): {}", tool, child.id(), status),
        Err(e) => warn!("Failed to reap {} (pid {}): {}", tool, child.id(), e),
    }
}

/// Supervises `child` until it exits or `token` stops being active.
///
/// A non-zero exit is reported through [`command_failed_error`].
pub fn supervise(
    child: &mut Child,
    tool: &str,
    token: &CancellationToken,
    poll_interval: Duration,
) -> CoreResult<Captured> {
    let started = Instant::now();
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = loop {
        if let Err(e) = token.checkpoint(tool, started) {
            warn!(
                "Stopping {} (pid {}) after {:.1}s: {}",
                tool,
                child.id(),
                started.elapsed().as_secs_f64(),
                e
            );
            kill_and_reap(child, tool);
            collect_both(stdout, stderr, tool);
            return Err(e);
        }

        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                let nap = token
                    .remaining()
                    .map_or(poll_interval, |left| left.min(poll_interval));
                thread::sleep(nap.max(Duration::from_millis(1)));
            }
            Err(e) => {
                kill_and_reap(child, tool);
                collect_both(stdout, stderr, tool);
                return Err(CoreError::Io(e));
            }
        }
    };

    let (stdout, stderr) = collect_both(stdout, stderr, tool);
    let captured = Captured {
        status,
        stdout,
        stderr,
        elapsed: started.elapsed(),
    };
    trace!(
        "{} finished in {:?} with {} bytes of stdout",
        tool,
        captured.elapsed,
        captured.stdout.len()
    );

    if !captured.status.success() {
        return Err(command_failed_error(tool, captured.status, captured.stderr));
    }
    Ok(captured)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::process::{Command, Stdio};

    fn sh(script: &str) -> Child {
        Command::new("sh")
            .arg("-c")
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("sh should be available")
    }

    #[test]
    fn test_captures_output() {
        let mut child = sh("echo frame:0; echo oops >&2");
        let out = supervise(
            &mut child,
            "sh",
            &CancellationToken::new(),
            Duration::from_millis(5),
        )
        .unwrap();
        assert!(out.status.success());
        assert_eq!(out.stdout.trim(), "frame:0");
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[test]
    fn test_non_zero_exit_is_malformed() {
        let mut child = sh("echo broken >&2; exit 3");
        let err = supervise(
            &mut child,
            "sh",
            &CancellationToken::new(),
            Duration::from_millis(5),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedOutput);
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_deadline_kills_and_reaps() {
        let mut child = sh("exec sleep 30");
        let token = CancellationToken::with_timeout(Duration::from_millis(100));
        let started = Instant::now();
        let err = supervise(&mut child, "sh", &token, Duration::from_millis(10)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ToolTimeout);
        assert!(started.elapsed() < Duration::from_secs(10));
        // Already reaped, so there is nothing left to wait for.
        assert!(child.try_wait().unwrap().is_some());
    }

    #[test]
    fn test_inherited_pipe_does_not_block_deadline() {
        // The background sleep keeps both pipes open after sh is killed.
        let mut child = sh("sleep 10 & sleep 10");
        let token = CancellationToken::with_timeout(Duration::from_millis(100));
        let started = Instant::now();
        let err = supervise(&mut child, "sh", &token, Duration::from_millis(10)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ToolTimeout);
        assert!(started.elapsed() < PIPE_DRAIN_GRACE + Duration::from_secs(2));
        assert!(child.try_wait().unwrap().is_some());
    }

    #[test]
    fn test_cancellation_kills() {
        let mut child = sh("exec sleep 30");
        let token = CancellationToken::new();
        let canceller = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            canceller.cancel();
        });
        let err = supervise(&mut child, "sh", &token, Duration::from_millis(10)).unwrap_err();
        handle.join().unwrap();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }
}
