use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Time elapsed since the start of a run. Callers advance it explicitly, which
/// keeps every scheduled behaviour deterministic under test.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PlaybackClock {
    elapsed: Duration,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(elapsed: Duration) -> Self {
        Self { elapsed }
    }

    pub fn at_millis(millis: u64) -> Self {
        Self::at(Duration::from_millis(millis))
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    pub fn advance(&mut self, delta: Duration) {
        self.elapsed = self.elapsed.saturating_add(delta);
    }
}

/// A payload due at a fixed offset from the start of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEvent<T> {
    pub offset: Duration,
    pub payload: T,
}

impl<T> ScheduledEvent<T> {
    pub fn new(offset: Duration, payload: T) -> Self {
        Self { offset, payload }
    }
}

/// Plays back a fixed list of events in offset order. Events sharing an offset
/// keep the order in which they were supplied.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    events: Vec<ScheduledEvent<T>>,
    next_event: usize,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            next_event: 0,
        }
    }
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_events(&mut self, events: Vec<ScheduledEvent<T>>) {
        self.events = events;
        self.events.sort_by_key(|event| event.offset);
        self.next_event = 0;
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.next_event = 0;
    }

    /// Returns the payloads whose offset has been reached, in order, and marks
    /// them as fired.
    pub fn drain_due(&mut self, clock: &PlaybackClock) -> Vec<T> {
        let mut due = Vec::new();
        while let Some(event) = self.events.get(self.next_event) {
            if clock.elapsed() < event.offset {
                break;
            }
            due.push(event.payload.clone());
            self.next_event += 1;
        }
        due
    }

    /// Offset of the next event that has not fired yet.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.events.get(self.next_event).map(|event| event.offset)
    }

    pub fn pending(&self) -> usize {
        self.events.len() - self.next_event
    }

    pub fn is_finished(&self) -> bool {
        self.next_event >= self.events.len()
    }
}
