//! Lifecycle of the `ichor` listener as seen by probes and the API layer.
//!
//! The phase only ever moves forward, so a late `set_ready` cannot undo a
//! Ctrl-C that already arrived. API requests hold an [`InFlightGuard`] for
//! their whole duration and shutdown waits for the last one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::sync::Notify;
use tracing::debug;

/// Phase of the listener, in the order the phases are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthState {
    /// Routes are being assembled; nothing is served yet.
    Starting,
    Ready,
    /// A stop signal arrived. The API answers 503, probes keep working.
    Draining,
    Stopped,
}

impl HealthState {
    /// Name reported in the `state` field of `/health`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Ready => "ready",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }

    /// Whether the API routes should still take new work.
    #[must_use]
    pub fn accepts_requests(self) -> bool {
        self < Self::Draining
    }
}

#[derive(Debug, Default)]
struct Outstanding {
    requests: AtomicU64,
    idle: Notify,
}

/// Shared by the middleware, the probe handlers and `NetworkModule::serve`.
#[derive(Debug)]
pub struct ShutdownController {
    phase: ArcSwap<HealthState>,
    outstanding: Arc<Outstanding>,
}

impl ShutdownController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: ArcSwap::from_pointee(HealthState::Starting),
            outstanding: Arc::new(Outstanding::default()),
        }
    }

    /// Moves to `next` unless the controller is already there or past it.
    /// Returns the phase seen before the call.
    fn advance(&self, next: HealthState) -> HealthState {
        let before = self.phase.rcu(|current| {
            if **current < next {
                Arc::new(next)
            } else {
                Arc::clone(current)
            }
        });
        if *before < next {
            debug!(from = before.as_str(), to = next.as_str(), "listener phase changed");
        }
        *before
    }

    /// Marks the listener as serving. Ignored once draining has begun.
    pub fn set_ready(&self) -> HealthState {
        self.advance(HealthState::Ready)
    }

    /// Starts draining. Repeated signals are harmless.
    pub fn trigger_shutdown(&self) -> HealthState {
        self.advance(HealthState::Draining)
    }

    #[must_use]
    pub fn health_state(&self) -> HealthState {
        **self.phase.load()
    }

    /// Registers one outstanding API request. The count drops with the
    /// guard, including when the handler future is cancelled or panics.
    #[must_use]
    pub fn in_flight_guard(&self) -> InFlightGuard {
        self.outstanding.requests.fetch_add(1, Ordering::AcqRel);
        InFlightGuard {
            outstanding: Arc::clone(&self.outstanding),
        }
    }

    #[must_use]
    pub fn in_flight_count(&self) -> u64 {
        self.outstanding.requests.load(Ordering::Acquire)
    }

    /// Resolves `true` once no request is outstanding, moving to `Stopped`.
    /// Resolves `false` if `timeout` passes first; the phase is untouched.
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        let give_up = tokio::time::Instant::now() + timeout;

        loop {
            // Must be created before reading the count or a wakeup can be lost.
            let idle = self.outstanding.idle.notified();
            if self.in_flight_count() == 0 {
                self.advance(HealthState::Stopped);
                return true;
            }
            if tokio::time::timeout_at(give_up, idle).await.is_err() {
                return false;
            }
        }
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// One outstanding API request; see [`ShutdownController::in_flight_guard`].
#[derive(Debug)]
pub struct InFlightGuard {
    outstanding: Arc<Outstanding>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.outstanding.requests.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.outstanding.idle.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_only_move_forward() {
        let ctrl = ShutdownController::new();
        assert_eq!(ctrl.set_ready(), HealthState::Starting);
        assert_eq!(ctrl.trigger_shutdown(), HealthState::Ready);

        // A late readiness report must not reopen the API.
        assert_eq!(ctrl.set_ready(), HealthState::Draining);
        assert_eq!(ctrl.health_state(), HealthState::Draining);

        assert_eq!(ctrl.trigger_shutdown(), HealthState::Draining);
    }

    #[test]
    fn only_starting_and_ready_accept_requests() {
        assert!(HealthState::Starting.accepts_requests());
        assert!(HealthState::Ready.accepts_requests());
        assert!(!HealthState::Draining.accepts_requests());
        assert!(!HealthState::Stopped.accepts_requests());
    }

    #[test]
    fn outstanding_count_follows_guards() {
        let ctrl = ShutdownController::new();
        let guards: Vec<_> = (0..3).map(|_| ctrl.in_flight_guard()).collect();
        assert_eq!(ctrl.in_flight_count(), 3);
        drop(guards);
        assert_eq!(ctrl.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn drain_without_requests_stops_at_once() {
        let ctrl = ShutdownController::new();
        ctrl.trigger_shutdown();
        assert!(ctrl.wait_for_drain(Duration::from_millis(10)).await);
        assert_eq!(ctrl.health_state().as_str(), "stopped");
    }

    #[tokio::test]
    async fn drain_finishes_when_handlers_return() {
        let ctrl = Arc::new(ShutdownController::new());
        ctrl.set_ready();

        let handlers: Vec<_> = (1..=2u64)
            .map(|n| {
                let guard = ctrl.in_flight_guard();
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(20 * n)).await;
                    drop(guard);
                })
            })
            .collect();
        ctrl.trigger_shutdown();

        assert!(ctrl.wait_for_drain(Duration::from_secs(2)).await);
        assert_eq!(ctrl.health_state(), HealthState::Stopped);
        for handler in handlers {
            handler.await.unwrap();
        }
    }

    #[tokio::test]
    async fn stuck_request_keeps_the_controller_draining() {
        let ctrl = ShutdownController::new();
        ctrl.set_ready();
        let _stuck = ctrl.in_flight_guard();
        ctrl.trigger_shutdown();

        assert!(!ctrl.wait_for_drain(Duration::from_millis(30)).await);
        assert_eq!(ctrl.health_state(), HealthState::Draining);
        assert_eq!(ctrl.in_flight_count(), 1);
    }
}
