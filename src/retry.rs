//! Cancellable polling with a fixed interval and an overall deadline.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::utils::{sleep_until, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub deadline: Duration,
}

impl RetryPolicy {
    pub fn new(interval: Duration, deadline: Duration) -> Self {
        Self { interval, deadline }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(200),
            deadline: Duration::from_secs(5),
        }
    }
}

/// Shared flag flipped when the work it guards has been superseded.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RetryOutcome<T> {
    Ready { value: T, polls: u32, elapsed: Duration },
    TimedOut { polls: u32, elapsed: Duration },
    Cancelled { polls: u32 },
}

/// Calls `probe` right away and then on every `policy.interval` tick after
/// the start until it yields a value, the deadline passes or `cancel` is
/// triggered.
///
/// Ticks are measured from the start, so slow wakeups do not push later
/// probes back. The last probe happens at the deadline itself, and a timeout
/// is only reported once a probe at or after the deadline has failed.
pub async fn retry_until<T, F>(policy: RetryPolicy, cancel: &CancelToken, mut probe: F) -> RetryOutcome<T>
where
    F: FnMut(u32) -> Option<T>,
{
    let start = Instant::now();
    let deadline = start + policy.deadline;
    let mut polls = 0;
    loop {
        if cancel.is_cancelled() {
            return RetryOutcome::Cancelled { polls };
        }
        polls += 1;
        if let Some(value) = probe(polls) {
            return RetryOutcome::Ready {
                value,
                polls,
                elapsed: start.elapsed(),
            };
        }
        let now = Instant::now();
        if policy.interval.is_zero() || now >= deadline {
            return RetryOutcome::TimedOut {
                polls,
                elapsed: now - start,
            };
        }
        let next_tick = start + policy.interval.saturating_mul(polls);
        sleep_until(next_tick.min(deadline)).await;
    }
}
