//! Search cancellation and deadlines.
//!
//! A [`SearchClock`] is shared between the protocol thread, the search
//! thread and the hard-deadline watchdog. The search polls it every few
//! thousand nodes; everything else only flips its state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Cooperative cancellation flag.
#[derive(Clone, Debug, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    #[must_use]
    pub fn new() -> Self {
        StopToken::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Time allotted to one move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeBudget {
    /// Don't start a new iteration past (a fraction of) this
    pub soft_ms: u64,
    /// Abort the running iteration at this point
    pub hard_ms: u64,
}

impl TimeBudget {
    #[must_use]
    pub fn fixed(ms: u64) -> Self {
        TimeBudget {
            soft_ms: ms,
            hard_ms: ms,
        }
    }
}

#[derive(Debug)]
struct ClockState {
    start: Instant,
    /// Active budget; `None` while pondering or for untimed searches
    budget: Option<TimeBudget>,
    /// Budget restored by `ponderhit`
    ponder_budget: Option<TimeBudget>,
}

#[derive(Debug)]
pub struct SearchClock {
    stop: StopToken,
    pondering: AtomicBool,
    state: Mutex<ClockState>,
}

impl SearchClock {
    /// A clock that starts now with an optional budget.
    #[must_use]
    pub fn new(stop: StopToken, budget: Option<TimeBudget>) -> Self {
        SearchClock {
            stop,
            pondering: AtomicBool::new(false),
            state: Mutex::new(ClockState {
                start: Instant::now(),
                budget,
                ponder_budget: None,
            }),
        }
    }

    /// A clock in the pondering state: no deadlines until [`ponderhit`],
    /// which starts `budget` from that moment.
    ///
    /// [`ponderhit`]: SearchClock::ponderhit
    #[must_use]
    pub fn pondering(stop: StopToken, budget: Option<TimeBudget>) -> Self {
        SearchClock {
            stop,
            pondering: AtomicBool::new(true),
            state: Mutex::new(ClockState {
                start: Instant::now(),
                budget: None,
                ponder_budget: budget,
            }),
        }
    }

    /// No deadlines and a private stop token.
    #[must_use]
    pub fn unlimited() -> Self {
        SearchClock::new(StopToken::new(), None)
    }

    #[must_use]
    pub fn stop_token(&self) -> &StopToken {
        &self.stop
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    #[must_use]
    pub fn is_pondering(&self) -> bool {
        self.pondering.load(Ordering::Acquire)
    }

    /// Switch a pondering clock to timed mode starting now.
    ///
    /// Returns `false` if the clock was not pondering.
    pub fn ponderhit(&self) -> bool {
        let mut state = self.state.lock();
        if !self.pondering.load(Ordering::Acquire) {
            return false;
        }
        state.start = Instant::now();
        state.budget = state.ponder_budget.take();
        self.pondering.store(false, Ordering::Release);
        true
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.state.lock().start.elapsed()
    }

    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    /// The active budget, or `None` while pondering or untimed.
    #[must_use]
    pub fn budget(&self) -> Option<TimeBudget> {
        self.state.lock().budget
    }

    /// Instant at which the hard budget runs out.
    #[must_use]
    pub fn hard_deadline(&self) -> Option<Instant> {
        let state = self.state.lock();
        state
            .budget
            .map(|budget| state.start + Duration::from_millis(budget.hard_ms))
    }

    #[must_use]
    pub fn hard_expired(&self) -> bool {
        self.hard_deadline()
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// True once `percent` of the soft budget has elapsed.
    #[must_use]
    pub fn soft_expired(&self, percent: u64) -> bool {
        let state = self.state.lock();
        state.budget.is_some_and(|budget| {
            let limit = budget.soft_ms.saturating_mul(percent) / 100;
            state.start.elapsed().as_millis() as u64 >= limit
        })
    }

    /// Polled by the search.
    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.is_stopped() || self.hard_expired()
    }
}

impl Default for SearchClock {
    fn default() -> Self {
        SearchClock::unlimited()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn stop_token_is_shared() {
        let token = StopToken::new();
        let clock = SearchClock::new(token.clone(), None);
        assert!(!clock.should_stop());
        token.stop();
        assert!(clock.should_stop());
    }

    #[test]
    fn unlimited_clock_never_expires() {
        let clock = SearchClock::unlimited();
        assert!(clock.budget().is_none());
        assert!(clock.hard_deadline().is_none());
        assert!(!clock.soft_expired(0));
        assert!(!clock.hard_expired());
    }

    #[test]
    fn hard_budget_expires() {
        let clock = SearchClock::new(StopToken::new(), Some(TimeBudget::fixed(5)));
        thread::sleep(Duration::from_millis(15));
        assert!(clock.hard_expired());
        assert!(clock.should_stop());
        assert!(clock.soft_expired(100));
    }

    #[test]
    fn ponderhit_restores_budget_from_now() {
        let budget = TimeBudget {
            soft_ms: 1_000,
            hard_ms: 3_000,
        };
        let clock = SearchClock::pondering(StopToken::new(), Some(budget));
        assert!(clock.is_pondering());
        assert!(clock.budget().is_none());
        assert!(!clock.hard_expired());

        thread::sleep(Duration::from_millis(10));
        assert!(clock.ponderhit());
        assert!(!clock.is_pondering());
        assert_eq!(clock.budget(), Some(budget));
        assert!(clock.elapsed_ms() < 10);
        assert!(!clock.ponderhit());
    }
}
