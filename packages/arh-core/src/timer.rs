//! Cancellation and the pacing between poll iterations.

use std::{
    sync::{Arc, Condvar, Mutex, PoisonError},
    time::{Duration, Instant},
};

/// A cloneable, thread safe "stop now" flag.
///
/// Cancelling wakes up every [`CancelToken::wait_timeout`] in progress.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (cancelled, condvar) = &*self.inner;
        *cancelled.lock().unwrap_or_else(PoisonError::into_inner) = true;
        condvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks for up to `timeout`. Returns `true` if the token was (or got) cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (cancelled, condvar) = &*self.inner;
        let guard = cancelled.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = condvar
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

/// Clock and sleep used by the poll loop, injectable so that tests never
/// touch the wall clock.
pub trait Timer {
    /// Monotonic time since the timer was created
    fn now(&self) -> Duration;

    /// Sleeps for `duration` unless `cancel` fires first.
    /// Returns `false` if the sleep was cut short by cancellation.
    fn sleep(&mut self, duration: Duration, cancel: &CancelToken) -> bool;
}

impl<T: Timer + ?Sized> Timer for Box<T> {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn sleep(&mut self, duration: Duration, cancel: &CancelToken) -> bool {
        (**self).sleep(duration, cancel)
    }
}

/// Real time, blocking the current thread.
#[derive(Debug, Clone, Copy)]
pub struct ThreadTimer {
    origin: Instant,
}

impl ThreadTimer {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for ThreadTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for ThreadTimer {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration, cancel: &CancelToken) -> bool {
        !cancel.wait_timeout(duration)
    }
}
