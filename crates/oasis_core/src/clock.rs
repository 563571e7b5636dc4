use std::cell::Cell;
use std::rc::Rc;

use time::{Duration, OffsetDateTime};

/// Time source for creation timestamps.
pub trait Clock {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Manually driven clock for tests and scripted sessions.
///
/// Clones share the same instant, so a test can keep a handle after moving one into the state
/// core.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<OffsetDateTime>>,
}

impl ManualClock {
    pub fn new(start: OffsetDateTime) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, now: OffsetDateTime) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        self.now.get()
    }
}

/// Hands out creation timestamps that never go backwards, even if the wall clock does.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MonotonicStamp {
    last: Option<OffsetDateTime>,
}

impl MonotonicStamp {
    pub(crate) fn starting_after<'a>(times: impl IntoIterator<Item = &'a OffsetDateTime>) -> Self {
        Self {
            last: times.into_iter().copied().max(),
        }
    }

    pub(crate) fn next(&mut self, now: OffsetDateTime) -> OffsetDateTime {
        let stamp = match self.last {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last = Some(stamp);
        stamp
    }
}
