// ============================================================================
// vigil-core/src/cancel.rs
// ============================================================================
//
// CANCELLATION: Cancellable Deadlines for Analyzer Tasks
//
// A CancellationToken carries an optional wall-clock deadline and an explicit
// cancellation flag. Tokens form a tree: the orchestrator holds the request
// token, every analyzer task receives a child whose deadline never exceeds its
// parent's, and cancelling any token is visible to all of its descendants.
// Supervised subprocesses poll their token and are killed as soon as it is no
// longer active.

use crate::error::{CoreError, CoreResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Observable state of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Active,
    Cancelled,
    Expired,
}

#[derive(Debug)]
struct Inner {
    cancelled: AtomicBool,
    deadline: Option<Instant>,
    parent: Option<CancellationToken>,
}

/// Cheap, cloneable, `Send + Sync` cancellation handle.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    /// A root token without a deadline.
    pub fn new() -> Self {
        Self::build(None, None)
    }

    /// A root token expiring at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self::build(Some(deadline), None)
    }

    /// A root token expiring `timeout` from now. A timeout past the clock's
    /// range means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(Instant::now().checked_add(timeout), None)
    }

    fn build(deadline: Option<Instant>, parent: Option<CancellationToken>) -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                deadline,
                parent,
            }),
        }
    }

    /// Derives a child token. The child's deadline is the earlier of the
    /// parent's and `deadline`.
    pub fn child(&self, deadline: Option<Instant>) -> Self {
        let effective = match (self.deadline(), deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Self::build(effective, Some(self.clone()))
    }

    /// Cancels this token and, through it, every descendant.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }

    /// True when this token or any ancestor was cancelled.
    pub fn is_cancelled(&self) -> bool {
        if self.inner.cancelled.load(Ordering::SeqCst) {
            return true;
        }
        self.inner
            .parent
            .as_ref()
            .is_some_and(|parent| parent.is_cancelled())
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Time left before the deadline; `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.inner
            .deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        self.inner.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Cancellation takes precedence over expiry.
    pub fn state(&self) -> TokenState {
        if self.is_cancelled() {
            TokenState::Cancelled
        } else if self.is_expired() {
            TokenState::Expired
        } else {
            TokenState::Active
        }
    }

    /// Returns an error describing why work on behalf of `tool` must stop,
    /// or `Ok(())` while the token is still active.
    pub fn checkpoint(&self, tool: &str, started: Instant) -> CoreResult<()> {
        match self.state() {
            TokenState::Active => Ok(()),
            TokenState::Cancelled => Err(CoreError::Cancelled(format!(
                "{} interrupted by request cancellation",
                tool
            ))),
            TokenState::Expired => Err(CoreError::ToolTimeout {
                tool: tool.to_string(),
                elapsed: started.elapsed(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_cancel_cascades_to_children() {
        let root = CancellationToken::new();
        let child = root.child(None);
        let grandchild = child.child(None);

        assert_eq!(grandchild.state(), TokenState::Active);
        root.cancel();
        assert!(child.is_cancelled());
        assert!(grandchild.is_cancelled());
        assert_eq!(grandchild.state(), TokenState::Cancelled);
    }

    #[test]
    fn test_child_cancel_does_not_reach_parent() {
        let root = CancellationToken::new();
        let child = root.child(None);
        child.cancel();
        assert!(!root.is_cancelled());
    }

    #[test]
    fn test_child_deadline_is_clamped_to_parent() {
        let now = Instant::now();
        let root = CancellationToken::with_deadline(now + Duration::from_secs(5));
        let child = root.child(Some(now + Duration::from_secs(60)));
        assert_eq!(child.deadline(), root.deadline());

        let tighter = root.child(Some(now + Duration::from_secs(1)));
        assert_eq!(tighter.deadline(), Some(now + Duration::from_secs(1)));

        let unbounded = CancellationToken::new().child(None);
        assert_eq!(unbounded.deadline(), None);
    }

    #[test]
    fn test_out_of_range_timeout_has_no_deadline() {
        let token = CancellationToken::with_timeout(Duration::MAX);
        assert_eq!(token.deadline(), None);
        assert_eq!(token.state(), TokenState::Active);

        let bounded = CancellationToken::with_timeout(Duration::from_secs(30));
        assert!(bounded.deadline().is_some());
    }

    #[test]
    fn test_expired_checkpoint_is_timeout() {
        let token = CancellationToken::with_deadline(Instant::now() - Duration::from_millis(1));
        assert_eq!(token.state(), TokenState::Expired);
        let err = token.checkpoint("ffmpeg", Instant::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ToolTimeout);

        token.cancel();
        let err = token.checkpoint("ffmpeg", Instant::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }
}
