// vigil-core/src/external/mocks.rs

// --- Scripted toolkit (for testing) ---
//
// Responses are scripted per invocation label ("introspect" for structural
// introspection, the analyzer's label for filter invocations). Steps are
// consumed in order and the last one repeats, so a single scripted response
// serves any number of calls.

use super::toolkit::{ProbeInvocation, ProbeToolkit, RawOutput};
use crate::cancel::CancellationToken;
use crate::error::{CoreError, CoreResult};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

/// Failure modes a scripted invocation can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedFailure {
    /// Binary missing.
    Unavailable,
    /// Deadline exceeded inside the tool.
    Timeout,
    /// Output could not be produced.
    Malformed,
    /// Interrupted I/O, eligible for the adapter's retry.
    Transient,
}

impl ScriptedFailure {
    fn to_error(self, tool: &str) -> CoreError {
        match self {
            ScriptedFailure::Unavailable => CoreError::ToolUnavailable {
                tool: tool.to_string(),
                reason: "scripted: not installed".to_string(),
            },
            ScriptedFailure::Timeout => CoreError::ToolTimeout {
                tool: tool.to_string(),
                elapsed: Duration::ZERO,
            },
            ScriptedFailure::Malformed => {
                CoreError::MalformedOutput(format!("scripted: {} produced garbage", tool))
            }
            ScriptedFailure::Transient => CoreError::Io(io::Error::new(
                io::ErrorKind::Interrupted,
                "scripted: interrupted",
            )),
        }
    }
}

#[derive(Debug, Clone)]
enum Step {
    Output(String),
    Delayed(Duration, String),
    Fail(ScriptedFailure),
    Hang,
}

/// `ProbeToolkit` returning scripted responses.
#[derive(Debug, Default)]
pub struct ScriptedToolkit {
    script: Mutex<HashMap<String, VecDeque<Step>>>,
    calls: Mutex<Vec<String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, label: &str, step: Step) -> &Self {
        lock(&self.script)
            .entry(label.to_string())
            .or_default()
            .push_back(step);
        self
    }

    /// Succeeds with `stdout`.
    pub fn respond(&self, label: &str, stdout: impl Into<String>) -> &Self {
        self.push(label, Step::Output(stdout.into()))
    }

    /// Succeeds with `stdout` after `delay`, unless the token stops first.
    pub fn respond_after(&self, label: &str, delay: Duration, stdout: impl Into<String>) -> &Self {
        self.push(label, Step::Delayed(delay, stdout.into()))
    }

    pub fn fail(&self, label: &str, failure: ScriptedFailure) -> &Self {
        self.push(label, Step::Fail(failure))
    }

    /// Blocks until the token is cancelled or expires, like a hung tool that
    /// is then killed.
    pub fn hang(&self, label: &str) -> &Self {
        self.push(label, Step::Hang)
    }

    pub fn invocation_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn calls_for(&self, label: &str) -> usize {
        lock(&self.calls).iter().filter(|l| *l == label).count()
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    fn next_step(&self, label: &str) -> Option<Step> {
        let mut script = lock(&self.script);
        let queue = script.get_mut(label)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

fn sleep_while_active(
    token: &CancellationToken,
    tool: &str,
    started: Instant,
    delay: Duration,
) -> CoreResult<()> {
    while started.elapsed() < delay {
        token.checkpoint(tool, started)?;
        thread::sleep(Duration::from_millis(2));
    }
    Ok(())
}

fn block_until_stopped(token: &CancellationToken, tool: &str, started: Instant) -> CoreError {
    loop {
        if let Err(e) = token.checkpoint(tool, started) {
            return e;
        }
        thread::sleep(Duration::from_millis(2));
    }
}

impl ProbeToolkit for ScriptedToolkit {
    fn invoke(
        &self,
        invocation: &ProbeInvocation,
        token: &CancellationToken,
    ) -> CoreResult<RawOutput> {
        let label = invocation.label();
        let tool = invocation.tool();
        lock(&self.calls).push(label.to_string());
        let started = Instant::now();

        let step = self.next_step(label).ok_or_else(|| {
            CoreError::MalformedOutput(format!("no scripted response for '{}'", label))
        })?;

        let stdout = match step {
            Step::Output(stdout) => stdout,
            Step::Delayed(delay, stdout) => {
                sleep_while_active(token, tool, started, delay)?;
                stdout
            }
            Step::Fail(failure) => return Err(failure.to_error(tool)),
            Step::Hang => return Err(block_until_stopped(token, tool, started)),
        };

        Ok(RawOutput {
            stdout,
            stderr: String::new(),
            elapsed: started.elapsed(),
        })
    }
}
