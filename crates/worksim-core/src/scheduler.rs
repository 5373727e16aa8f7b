//! Clock and timer primitives shared by the simulated components.
//!
//! Components never sleep or spawn timers themselves. Each owns a [`Timers`]
//! set and is driven by `tick(now)` with a time read from a [`Clock`], so a
//! host can run them on a real interval or step them deterministically in
//! tests with a [`ManualClock`].

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

/// Monotonic time source measured from the clock's origin.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

/// Wall clock built on the tokio clock, so paused tokio time drives it too.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: tokio::time::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) -> Duration {
        let mut now = self.now.lock();
        *now += by;
        *now
    }

    pub fn set(&self, at: Duration) {
        *self.now.lock() = at;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock()
    }
}

#[derive(Debug, Clone)]
struct Pending<K> {
    at: Duration,
    seq: u64,
    key: K,
}

/// Keyed one-shot deadlines. Scheduling a key that is already pending
/// replaces it, like clearing a timeout before setting a new one.
#[derive(Debug, Clone)]
pub struct Timers<K> {
    pending: Vec<Pending<K>>,
    next_seq: u64,
}

impl<K> Default for Timers<K> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<K: Copy + PartialEq> Timers<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, key: K, at: Duration) {
        self.cancel(key);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending { at, seq, key });
    }

    /// Returns true if a pending timer was removed
    pub fn cancel(&mut self, key: K) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.key != key);
        self.pending.len() != before
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_scheduled(&self, key: K) -> bool {
        self.pending.iter().any(|p| p.key == key)
    }

    pub fn deadline(&self, key: K) -> Option<Duration> {
        self.pending.iter().find(|p| p.key == key).map(|p| p.at)
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.iter().map(|p| p.at).min()
    }

    /// Remove and return the earliest timer due at `now`, with its scheduled
    /// instant. Ties fire in scheduling order.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, K)> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.at <= now)
            .min_by_key(|(_, p)| (p.at, p.seq))
            .map(|(idx, _)| idx)?;
        let due = self.pending.swap_remove(idx);
        Some((due.at, due.key))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

pub(crate) fn as_millis(at: Duration) -> u64 {
    u64::try_from(at.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Key {
        A,
        B,
        C,
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_pop_due_in_deadline_order() {
        let mut timers = Timers::new();
        timers.schedule(Key::A, ms(30));
        timers.schedule(Key::B, ms(10));
        timers.schedule(Key::C, ms(20));

        assert_eq!(timers.pop_due(ms(5)), None);
        assert_eq!(timers.pop_due(ms(25)), Some((ms(10), Key::B)));
        assert_eq!(timers.pop_due(ms(25)), Some((ms(20), Key::C)));
        assert_eq!(timers.pop_due(ms(25)), None);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_ties_fire_in_scheduling_order() {
        let mut timers = Timers::new();
        timers.schedule(Key::C, ms(10));
        timers.schedule(Key::A, ms(10));
        assert_eq!(timers.pop_due(ms(10)), Some((ms(10), Key::C)));
        assert_eq!(timers.pop_due(ms(10)), Some((ms(10), Key::A)));
    }

    #[test]
    fn test_reschedule_replaces_pending_key() {
        let mut timers = Timers::new();
        timers.schedule(Key::A, ms(10));
        timers.schedule(Key::A, ms(50));
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.deadline(Key::A), Some(ms(50)));
        assert_eq!(timers.pop_due(ms(20)), None);
    }

    #[test]
    fn test_cancel_and_clear() {
        let mut timers = Timers::new();
        timers.schedule(Key::A, ms(10));
        timers.schedule(Key::B, ms(20));
        assert!(timers.cancel(Key::A));
        assert!(!timers.cancel(Key::A));
        assert!(timers.is_scheduled(Key::B));
        timers.clear();
        assert!(timers.is_empty());
        assert_eq!(timers.next_deadline(), None);
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance(ms(100));
        other.advance(ms(5));
        assert_eq!(clock.now(), ms(105));
        clock.set(ms(1));
        assert_eq!(other.now(), ms(1));
    }
}
