//! Per-call deadline and cancellation.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Caller-supplied bounds for one search call.
///
/// Cancelling the token, or reaching the deadline, abandons every source
/// call still in flight. Sources that had not answered are reported as
/// degraded.
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl SearchContext {
    /// A context with no deadline of its own.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context expiring `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().deadline(Instant::now() + timeout)
    }

    /// Set an absolute deadline.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Use an externally owned cancellation token.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn deadline_at(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancel every call bound to this context.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// The effective deadline: the caller's, or `fallback` from now.
    pub fn resolve_deadline(&self, fallback: Duration) -> Instant {
        self.deadline.unwrap_or_else(|| Instant::now() + fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_resolve_deadline() {
        let ctx = SearchContext::new();
        let now = Instant::now();
        assert_eq!(ctx.resolve_deadline(Duration::from_secs(2)), now + Duration::from_secs(2));

        let ctx = SearchContext::with_timeout(Duration::from_millis(100));
        assert_eq!(ctx.resolve_deadline(Duration::from_secs(2)), now + Duration::from_millis(100));
    }

    #[test]
    fn test_cancel_propagates_to_clones() {
        let ctx = SearchContext::new();
        let clone = ctx.clone();
        ctx.cancel();
        assert!(clone.is_cancelled());
    }
}
