//! Shared propose/commit/rollback wrapper for optimistic writes.
//!
//! The pattern: snapshot the prior state, apply the speculative change,
//! attempt the remote write, and on failure restore the snapshot atomically.
//! Every optimistic mutation in the crate goes through here rather than
//! hand-rolling its own rollback.

use std::future::Future;

/// Apply `mutate` to `state` optimistically, then await the remote write.
/// On failure the pre-write snapshot is restored before the error is
/// returned; the caller never observes half-applied local state.
pub async fn write<T, M, Fut, O, E>(state: &mut T, mutate: M, attempt: Fut) -> Result<O, E>
where
    T: Clone,
    M: FnOnce(&mut T),
    Fut: Future<Output = Result<O, E>>,
{
    let snapshot = state.clone();
    mutate(state);
    match attempt.await {
        Ok(out) => Ok(out),
        Err(err) => {
            *state = snapshot;
            Err(err)
        }
    }
}

/// Explicit multi-step variant for callers that need to hold the speculative
/// state across an await point of their own choosing.
#[derive(Debug)]
pub struct Speculative<T: Clone> {
    value: T,
    snapshot: Option<T>,
}

impl<T: Clone> Speculative<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            snapshot: None,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Whether a proposal is awaiting commit or rollback.
    pub fn in_flight(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Apply a speculative mutation. The snapshot taken by the first propose
    /// survives chained proposals, so rollback always restores the state
    /// before the whole in-flight batch.
    pub fn propose<M: FnOnce(&mut T)>(&mut self, mutate: M) {
        if self.snapshot.is_none() {
            self.snapshot = Some(self.value.clone());
        }
        mutate(&mut self.value);
    }

    /// Keep the speculative state.
    pub fn commit(&mut self) {
        self.snapshot = None;
    }

    /// Restore the pre-proposal snapshot. No-op when nothing is in flight.
    pub fn rollback(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.value = snapshot;
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn successful_write_keeps_the_mutation() {
        let mut state = vec![1, 2, 3];
        let out = write(&mut state, |s| s.push(4), async { Ok::<_, ()>("done") }).await;
        assert_eq!(out, Ok("done"));
        assert_eq!(state, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn failed_write_restores_the_snapshot() {
        let mut state = vec![1, 2, 3];
        let out = write(&mut state, |s| s.clear(), async { Err::<(), _>("rejected") }).await;
        assert_eq!(out, Err("rejected"));
        assert_eq!(state, vec![1, 2, 3]);
    }

    #[test]
    fn speculative_commit_and_rollback() {
        let mut cell = Speculative::new(10u32);
        cell.propose(|v| *v += 5);
        assert!(cell.in_flight());
        assert_eq!(*cell.get(), 15);
        cell.rollback();
        assert_eq!(*cell.get(), 10);
        assert!(!cell.in_flight());

        cell.propose(|v| *v = 99);
        cell.commit();
        assert_eq!(*cell.get(), 99);
        // Rollback after commit is a no-op.
        cell.rollback();
        assert_eq!(*cell.get(), 99);
    }

    #[test]
    fn chained_proposals_roll_back_to_the_first_snapshot() {
        let mut cell = Speculative::new(String::from("a"));
        cell.propose(|v| v.push('b'));
        cell.propose(|v| v.push('c'));
        cell.rollback();
        assert_eq!(cell.get(), "a");
    }
}
