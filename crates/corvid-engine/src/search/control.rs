//! Stop flag, clock, and node budget shared between the searcher and the
//! protocol thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Decides when a running search must stop.
///
/// The search polls [`poll`](SearchControl::poll) each time its node
/// countdown expires. Three modes:
/// - **Infinite**: only the external stop flag ends the search
/// - **Timed**: the clock starts at construction
/// - **Ponder**: limits are known but the clock waits for
///   [`activate`](SearchControl::activate) (`ponderhit`)
#[derive(Debug)]
pub struct SearchControl {
    stopped: Arc<AtomicBool>,
    clock_active: AtomicBool,
    start: Mutex<Option<Instant>>,
    target: Option<Duration>,
    hard_limit: Option<Duration>,
    node_limit: Option<u64>,
}

impl SearchControl {
    pub fn infinite(stopped: Arc<AtomicBool>) -> SearchControl {
        SearchControl {
            stopped,
            clock_active: AtomicBool::new(false),
            start: Mutex::new(None),
            target: None,
            hard_limit: None,
            node_limit: None,
        }
    }

    /// Clock starts now. `target` paces iterative deepening; `hard` aborts mid-iteration.
    pub fn timed(stopped: Arc<AtomicBool>, target: Duration, hard: Duration) -> SearchControl {
        SearchControl {
            clock_active: AtomicBool::new(true),
            start: Mutex::new(Some(Instant::now())),
            target: Some(target),
            hard_limit: Some(hard),
            ..SearchControl::infinite(stopped)
        }
    }

    /// Limits are set but the clock stays off until `ponderhit`.
    pub fn ponder(stopped: Arc<AtomicBool>, target: Duration, hard: Duration) -> SearchControl {
        SearchControl {
            target: Some(target),
            hard_limit: Some(hard),
            ..SearchControl::infinite(stopped)
        }
    }

    pub fn with_node_limit(mut self, nodes: Option<u64>) -> SearchControl {
        self.node_limit = nodes;
        self
    }

    /// Start the clock (`ponderhit`).
    pub fn activate(&self) {
        *self.start.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
        self.clock_active.store(true, Ordering::Release);
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    /// Periodic check with the running node count. Trips the stop flag when
    /// the hard time limit or the node budget is exhausted.
    pub fn poll(&self, nodes: u64) -> bool {
        if self.is_stopped() {
            return true;
        }
        let out_of_nodes = self.node_limit.is_some_and(|limit| nodes >= limit);
        let out_of_time = self.clock_active.load(Ordering::Acquire)
            && self.hard_limit.is_some_and(|hard| self.elapsed() >= hard);
        if out_of_nodes || out_of_time {
            self.stop();
            return true;
        }
        false
    }

    /// True once more than `fraction` of the target time has been used.
    /// Always false while the clock is inactive or unlimited.
    pub fn past_fraction(&self, fraction: f64) -> bool {
        if !self.clock_active.load(Ordering::Acquire) {
            return false;
        }
        self.target
            .is_some_and(|target| self.elapsed().as_secs_f64() > fraction * target.as_secs_f64())
    }

    /// Time since the clock started, zero while inactive.
    pub fn elapsed(&self) -> Duration {
        self.start
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map_or(Duration::ZERO, |s| s.elapsed())
    }

    pub fn stop_flag(&self) -> &Arc<AtomicBool> {
        &self.stopped
    }

    pub fn target(&self) -> Option<Duration> {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    #[test]
    fn infinite_only_stops_on_flag() {
        let control = SearchControl::infinite(flag());
        assert!(!control.poll(u64::MAX));
        assert!(!control.past_fraction(0.0));
        control.stop();
        assert!(control.poll(0));
    }

    #[test]
    fn node_limit_trips_stop() {
        let control = SearchControl::infinite(flag()).with_node_limit(Some(1000));
        assert!(!control.poll(999));
        assert!(control.poll(1000));
        assert!(control.is_stopped());
    }

    #[test]
    fn hard_limit_trips_stop() {
        let control = SearchControl::timed(flag(), Duration::ZERO, Duration::ZERO);
        assert!(control.poll(0));
        assert!(control.stop_flag().load(Ordering::Relaxed));
    }

    #[test]
    fn ponder_clock_waits_for_activation() {
        let control = SearchControl::ponder(flag(), Duration::ZERO, Duration::ZERO);
        assert!(!control.poll(0));
        assert_eq!(control.elapsed(), Duration::ZERO);
        control.activate();
        std::thread::sleep(Duration::from_millis(2));
        assert!(control.past_fraction(0.7));
        assert!(control.poll(0));
    }

    #[test]
    fn generous_target_is_not_past_fraction() {
        let control = SearchControl::timed(flag(), Duration::from_secs(60), Duration::from_secs(60));
        assert!(!control.past_fraction(0.7));
        assert!(!control.poll(0));
    }
}
