// SPDX-License-Identifier: GPL-3.0-only

//! Single-shot completion gating for scan sessions
//!
//! Frame analysis callbacks and detector failure events race to terminate a
//! session from different threads. The coordinator guarantees at most one
//! terminal outcome ever leaves a session: one atomic compare-and-swap picks
//! the winner, and a consume-once sender slot delivers the result.

use crate::pipeline::CaptureResult;
use futures::channel::oneshot;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

/// At-most-once terminal outcome gate
///
/// `pending -> completed` is the only transition, irreversible. No timeout
/// state is modeled here; a session that never accepts a frame stays pending,
/// which is a caller-level liveness concern.
pub struct CompletionCoordinator {
    done: AtomicBool,
    sink: Mutex<Option<oneshot::Sender<CaptureResult>>>,
}

impl CompletionCoordinator {
    /// Create a coordinator and the receiver its one result arrives on
    pub fn new() -> (Self, oneshot::Receiver<CaptureResult>) {
        let (tx, rx) = oneshot::channel();
        let coordinator = Self {
            done: AtomicBool::new(false),
            sink: Mutex::new(Some(tx)),
        };
        (coordinator, rx)
    }

    /// Attempt to claim the single completion slot
    ///
    /// Exactly one caller per session ever sees `true`, regardless of how
    /// many threads race here. The winner must follow up with [`emit`]
    /// (possibly after expensive conversion work); losers must release any
    /// resources they hold and emit nothing.
    ///
    /// [`emit`]: CompletionCoordinator::emit
    pub fn try_acquire(&self) -> bool {
        self.done
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Deliver the terminal outcome (winner side of [`try_acquire`])
    ///
    /// The sender slot is taken exactly once, so even a misbehaving caller
    /// cannot produce a second delivery. A missing sender means the session
    /// was cancelled while the winner was still converting; the outcome is
    /// discarded.
    ///
    /// [`try_acquire`]: CompletionCoordinator::try_acquire
    pub fn emit(&self, outcome: CaptureResult) {
        let sender = self
            .sink
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        match sender {
            Some(tx) => {
                // Receiver may already be gone; nothing to do about it here
                let _ = tx.send(outcome);
            }
            None => debug!("result sink already consumed, outcome discarded"),
        }
    }

    /// Acquire and deliver in one step
    ///
    /// Returns `true` if this call won the completion race and the outcome
    /// was handed to the sink. On `false` the caller still releases whatever
    /// it holds but must not emit anything.
    pub fn try_complete(&self, outcome: CaptureResult) -> bool {
        if !self.try_acquire() {
            trace!("completion attempt after terminal state, discarded");
            return false;
        }
        self.emit(outcome);
        true
    }

    /// Tear the session down without emitting a result
    ///
    /// Equivalent to forcing `done = true`: late callbacks observe the
    /// terminal state and discard their frames. The sender is dropped, so a
    /// pending receiver resolves as cancelled. Returns `true` if this call
    /// performed the transition.
    pub fn cancel(&self) -> bool {
        let transitioned = self.try_acquire();
        self.sink
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        transitioned
    }

    /// Advisory check for cheap early-skip of late frames
    ///
    /// Correctness never relies on this read; the compare-and-swap in
    /// [`try_acquire`] is the actual gate.
    ///
    /// [`try_acquire`]: CompletionCoordinator::try_acquire
    pub fn is_complete(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicU32;
    use std::thread;

    fn failure(msg: &str) -> CaptureResult {
        CaptureResult::Failure {
            message: msg.to_string(),
        }
    }

    #[test]
    fn test_exactly_one_winner_under_contention() {
        let (coordinator, mut rx) = CompletionCoordinator::new();
        let coordinator = Arc::new(coordinator);
        let wins = Arc::new(AtomicU32::new(0));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let coordinator = Arc::clone(&coordinator);
                let wins = Arc::clone(&wins);
                thread::spawn(move || {
                    if coordinator.try_complete(failure(&format!("attempt {}", i))) {
                        wins.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(wins.load(Ordering::SeqCst), 1);
        assert!(coordinator.is_complete());
        // exactly one result came through the sink
        assert!(matches!(rx.try_recv(), Ok(Some(_))));
        assert!(!matches!(rx.try_recv(), Ok(Some(_))));
    }

    #[test]
    fn test_acquire_then_emit_delivers_once() {
        let (coordinator, mut rx) = CompletionCoordinator::new();

        assert!(coordinator.try_acquire());
        assert!(!coordinator.try_acquire());

        coordinator.emit(failure("converted"));
        // a second emit finds the slot empty and is a no-op
        coordinator.emit(failure("duplicate"));

        match rx.try_recv() {
            Ok(Some(CaptureResult::Failure { message })) => assert_eq!(message, "converted"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_cancel_suppresses_emission() {
        let (coordinator, mut rx) = CompletionCoordinator::new();

        assert!(coordinator.cancel());
        assert!(coordinator.is_complete());
        assert!(!coordinator.try_complete(failure("late")));

        // sender was dropped without a value
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_cancel_after_completion_is_noop() {
        let (coordinator, mut rx) = CompletionCoordinator::new();

        assert!(coordinator.try_complete(failure("first")));
        assert!(!coordinator.cancel());
        assert!(matches!(rx.try_recv(), Ok(Some(_))));
    }
}
