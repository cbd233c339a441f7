use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::debug;

/// Position of a fetch in request order. Later tickets compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Orders concurrent fetches so that a response only lands if nothing
/// requested after it has landed already. A slow, superseded fetch is
/// dropped instead of overwriting newer data.
#[derive(Debug, Default)]
pub struct FetchSequencer {
    issued: AtomicU64,
    committed: Mutex<u64>,
}

impl FetchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a ticket. Call this before the request goes out.
    pub fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub async fn last_committed(&self) -> u64 {
        *self.committed.lock().await
    }

    /// Runs `write` unless a newer ticket has already committed.
    /// Returns `Ok(None)` for a stale ticket. The lock is held across
    /// `write`, so commits never interleave.
    pub async fn commit_with<F, Fut, T, E>(&self, ticket: Ticket, write: F) -> Result<Option<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut committed = self.committed.lock().await;
        if ticket.0 <= *committed {
            debug!("Dropping stale fetch #{} (already at #{})", ticket.0, *committed);
            return Ok(None);
        }

        let out = write().await?;
        *committed = ticket.0;
        Ok(Some(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tickets_increase() {
        let seq = FetchSequencer::new();
        let a = seq.issue();
        let b = seq.issue();
        assert!(b > a);
        assert_eq!(a.value(), 1);
    }

    #[tokio::test]
    async fn stale_ticket_is_dropped() {
        let seq = FetchSequencer::new();
        let old = seq.issue();
        let new = seq.issue();

        let r: Result<_, ()> = seq.commit_with(new, || async { Ok("new") }).await;
        assert_eq!(r, Ok(Some("new")));

        let r: Result<_, ()> = seq.commit_with(old, || async { Ok("old") }).await;
        assert_eq!(r, Ok(None));
        assert_eq!(seq.last_committed().await, new.value());
    }

    #[tokio::test]
    async fn failed_write_does_not_advance() {
        let seq = FetchSequencer::new();
        let first = seq.issue();
        let r: Result<Option<()>, &str> = seq.commit_with(first, || async { Err("boom") }).await;
        assert_eq!(r, Err("boom"));
        assert_eq!(seq.last_committed().await, 0);

        let second = seq.issue();
        let r: Result<_, ()> = seq.commit_with(second, || async { Ok(1) }).await;
        assert_eq!(r, Ok(Some(1)));
    }
}
