//! Sync client
//!
//! Two ways of pushing local edits to the backend:
//!
//! - **Optimistic**: mutate local state first, call the backend, restore the
//!   pre-mutation snapshot if the call fails.
//! - **Commit-then-confirm**: call the backend first; local state is marked
//!   durable only once the call succeeds, and a failure leaves local edits in
//!   place so the user can retry.
//!
//! Every result is checked against the session's closed flag after the
//! await. Once a session is closed, late results are dropped without touching
//! state.

use crate::error::{BackendResult, EngineError, EngineResult, Operation};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

// ========== Re-entry guard ==========

/// At most one in-flight call of a given kind per session
#[derive(Debug)]
pub struct InFlight {
    op: Operation,
    busy: AtomicBool,
}

impl InFlight {
    pub const fn new(op: Operation) -> Self {
        Self {
            op,
            busy: AtomicBool::new(false),
        }
    }

    /// Claim the slot or fail with [`EngineError::Busy`]
    pub fn try_begin(&self) -> EngineResult<InFlightGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| EngineError::Busy(self.op))?;
        Ok(InFlightGuard { busy: &self.busy })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the slot on drop, including on early return and cancellation
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    busy: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

// ========== Optimistic handle ==========

/// Pre-mutation copy of some state, kept until the backend answers
#[derive(Debug)]
pub struct OptimisticHandle<S> {
    before: S,
}

impl<S: Clone> OptimisticHandle<S> {
    /// Run `mutate` against `state`, remembering what it looked like before
    ///
    /// A failing `mutate` restores the snapshot immediately.
    pub fn apply<P, M>(state: &mut S, mutate: M) -> EngineResult<(Self, P)>
    where
        M: FnOnce(&mut S) -> EngineResult<P>,
    {
        let before = state.clone();
        match mutate(state) {
            Ok(payload) => Ok((Self { before }, payload)),
            Err(e) => {
                *state = before;
                Err(e)
            }
        }
    }

    pub fn before(&self) -> &S {
        &self.before
    }

    pub fn rollback(self, state: &mut S) {
        *state = self.before;
    }

    pub fn confirm(self) {}
}

// ========== Sync client ==========

/// Session-scoped gateway for backend calls
#[derive(Debug)]
pub struct SyncClient {
    session_id: Uuid,
    closed: AtomicBool,
}

impl Default for SyncClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncClient {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            closed: AtomicBool::new(false),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::debug!(session_id = %self.session_id, "Session closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn ensure_open(&self) -> EngineResult<()> {
        if self.is_closed() {
            return Err(EngineError::SessionClosed);
        }
        Ok(())
    }

    /// Decide what a finished call means for a session that may have closed
    fn settle<T>(&self, op: Operation, result: BackendResult<T>) -> EngineResult<T> {
        if self.is_closed() {
            tracing::debug!(session_id = %self.session_id, %op, "Discarding late result");
            return Err(EngineError::SessionClosed);
        }
        result.map_err(|e| {
            tracing::warn!(session_id = %self.session_id, %op, error = %e, "Backend call failed");
            EngineError::from(e)
        })
    }

    /// Await a read whose result is only useful while the session is open
    pub async fn fetch<T, Fut>(&self, op: Operation, call: Fut) -> EngineResult<T>
    where
        Fut: Future<Output = BackendResult<T>>,
    {
        self.ensure_open()?;
        let result = call.await;
        self.settle(op, result)
    }

    /// Mutate `state`, send the payload, roll back on failure
    pub async fn optimistic<S, P, T, M, C, Fut>(
        &self,
        op: Operation,
        state: &Mutex<S>,
        mutate: M,
        commit: C,
    ) -> EngineResult<T>
    where
        S: Clone,
        M: FnOnce(&mut S) -> EngineResult<P>,
        C: FnOnce(P) -> Fut,
        Fut: Future<Output = BackendResult<T>>,
    {
        self.ensure_open()?;
        let (handle, payload) = {
            let mut guard = state.lock();
            OptimisticHandle::apply(&mut *guard, mutate)?
        };

        let result = commit(payload).await;
        if self.is_closed() {
            tracing::debug!(session_id = %self.session_id, %op, "Discarding late result");
            return Err(EngineError::SessionClosed);
        }
        match result {
            Ok(value) => {
                handle.confirm();
                Ok(value)
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %self.session_id,
                    %op,
                    error = %e,
                    "Backend call failed, rolling back"
                );
                handle.rollback(&mut state.lock());
                Err(e.into())
            }
        }
    }

    /// Send first; run `confirm` only after the backend accepted
    pub async fn commit_then_confirm<T, Fut, C>(
        &self,
        op: Operation,
        call: Fut,
        confirm: C,
    ) -> EngineResult<T>
    where
        Fut: Future<Output = BackendResult<T>>,
        C: FnOnce(&T),
    {
        self.ensure_open()?;
        let result = call.await;
        let value = self.settle(op, result)?;
        confirm(&value);
        Ok(value)
    }
}
