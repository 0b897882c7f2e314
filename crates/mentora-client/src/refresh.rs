//! Single-flight coordination for access-token refresh.
//!
//! When several in-flight calls hit a 401 at once, exactly one of them owns
//! the refresh; the rest queue behind it and are handed the outcome. The
//! in-flight flag and the waiter list live behind one synchronous lock and
//! are never touched across an await point, so there is no window in which
//! two callers can both believe they own the refresh.

use parking_lot::Mutex;
use tokio::sync::oneshot;

/// Outcome of a refresh attempt, fanned out to every queued waiter.
pub(crate) type RefreshOutcome = std::result::Result<String, RefreshFailure>;

/// Cloneable description of a failed refresh.
#[derive(Debug, Clone)]
pub(crate) struct RefreshFailure(pub(crate) String);

/// What a caller entering the gate is expected to do.
pub(crate) enum Ticket {
    /// This caller owns the refresh and must call [`RefreshGate::finish`],
    /// on success and failure alike.
    Owner,
    /// A refresh is already in flight; await its outcome.
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

/// Per-client refresh state: the in-flight flag plus the waiter queue.
#[derive(Debug, Default)]
pub(crate) struct RefreshGate {
    state: Mutex<GateState>,
}

#[derive(Debug, Default)]
struct GateState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

impl RefreshGate {
    /// Claim the refresh, or join the queue behind the current owner.
    pub(crate) fn begin(&self) -> Ticket {
        let mut state = self.state.lock();
        if state.in_flight {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            Ticket::Waiter(rx)
        } else {
            state.in_flight = true;
            Ticket::Owner
        }
    }

    /// Release the gate and drain every queued waiter with `outcome`.
    ///
    /// Each sender is consumed by the drain, so a waiter can never be
    /// resolved twice; waiters registered after this call belong to the next
    /// refresh attempt.
    pub(crate) fn finish(&self, outcome: &RefreshOutcome) {
        let waiters = {
            let mut state = self.state.lock();
            state.in_flight = false;
            std::mem::take(&mut state.waiters)
        };

        for waiter in waiters {
            // a closed receiver just means that caller went away
            let _ = waiter.send(outcome.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_caller_owns_the_refresh() {
        let gate = RefreshGate::default();
        assert!(matches!(gate.begin(), Ticket::Owner));
    }

    #[tokio::test]
    async fn test_later_callers_queue_behind_the_owner() {
        let gate = RefreshGate::default();
        let _owner = gate.begin();

        let Ticket::Waiter(rx) = gate.begin() else {
            panic!("second caller should queue");
        };

        gate.finish(&Ok("fresh".to_string()));
        assert_eq!(rx.await.unwrap().unwrap(), "fresh");
    }

    #[tokio::test]
    async fn test_finish_drains_every_waiter_once() {
        let gate = RefreshGate::default();
        let _owner = gate.begin();

        let receivers: Vec<_> = (0..5)
            .map(|_| match gate.begin() {
                Ticket::Waiter(rx) => rx,
                Ticket::Owner => panic!("gate already owned"),
            })
            .collect();

        gate.finish(&Ok("fresh".to_string()));

        for rx in receivers {
            assert_eq!(rx.await.unwrap().unwrap(), "fresh");
        }
    }

    #[tokio::test]
    async fn test_failure_is_fanned_out() {
        let gate = RefreshGate::default();
        let _owner = gate.begin();

        let Ticket::Waiter(rx) = gate.begin() else {
            panic!("second caller should queue");
        };

        gate.finish(&Err(RefreshFailure("refresh endpoint returned 500".to_string())));
        assert!(rx.await.unwrap().is_err());
    }

    #[tokio::test]
    async fn test_gate_reopens_after_finish() {
        let gate = RefreshGate::default();
        let _owner = gate.begin();
        gate.finish(&Ok("fresh".to_string()));

        assert!(matches!(gate.begin(), Ticket::Owner));
    }

    #[tokio::test]
    async fn test_dropped_waiter_does_not_block_drain() {
        let gate = RefreshGate::default();
        let _owner = gate.begin();

        let Ticket::Waiter(rx_kept) = gate.begin() else {
            panic!("expected waiter");
        };
        let Ticket::Waiter(rx_dropped) = gate.begin() else {
            panic!("expected waiter");
        };
        drop(rx_dropped);

        gate.finish(&Ok("fresh".to_string()));
        assert_eq!(rx_kept.await.unwrap().unwrap(), "fresh");
    }
}
