//! Deadlines for cycles and the requests made within them.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio::time::error::Elapsed;

/// A point in time by which some piece of work must finish.
///
/// A cycle gets one deadline; every request inside it runs under a
/// [`child`](Deadline::child) deadline that never outlives its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// A deadline `budget` from now.
    pub fn after(budget: Duration) -> Self {
        let now = Instant::now();
        Self {
            at: now.checked_add(budget).unwrap_or_else(|| far_future(now)),
        }
    }

    /// A deadline `budget` from now, capped at this deadline.
    pub fn child(&self, budget: Duration) -> Self {
        Self::after(budget).min(*self)
    }

    pub fn instant(&self) -> Instant {
        self.at
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Drive `fut` to completion or give up at the deadline.
    ///
    /// The future is dropped on expiry, which aborts any in-flight request.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Elapsed> {
        tokio::time::timeout_at(self.at, fut).await
    }
}

// Roughly 30 years, the same horizon tokio uses for "never".
fn far_future(now: Instant) -> Instant {
    now + Duration::from_secs(86_400 * 365 * 30)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn child_is_capped_by_parent() {
        let parent = Deadline::after(Duration::from_millis(100));
        let child = parent.child(Duration::from_secs(30));
        assert_eq!(child, parent);
    }

    #[tokio::test]
    async fn child_shorter_than_parent() {
        let parent = Deadline::after(Duration::from_secs(300));
        let child = parent.child(Duration::from_secs(30));
        assert!(child < parent);
        assert!(child.remaining() <= Duration::from_secs(30));
    }

    #[tokio::test]
    async fn run_completes_before_deadline() {
        let deadline = Deadline::after(Duration::from_secs(5));
        let value = deadline.run(async { 42 }).await;
        assert_eq!(value.unwrap(), 42);
        assert!(!deadline.is_expired());
    }

    #[tokio::test]
    async fn run_aborts_at_deadline() {
        let deadline = Deadline::after(Duration::from_millis(20));
        let result = deadline
            .run(tokio::time::sleep(Duration::from_secs(5)))
            .await;
        assert!(result.is_err());
        assert!(deadline.is_expired());
        assert_eq!(deadline.remaining(), Duration::ZERO);
    }

    #[tokio::test]
    async fn expired_parent_still_yields_expired_child() {
        let parent = Deadline::after(Duration::ZERO);
        let child = parent.child(Duration::from_secs(30));
        assert!(child.is_expired());
    }

    #[tokio::test]
    async fn huge_budget_does_not_overflow() {
        let deadline = Deadline::after(Duration::MAX);
        assert!(!deadline.is_expired());
    }
}
