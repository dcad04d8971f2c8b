use std::time::{Duration, Instant};

/// Turns a noisy PIR level into confirmed trigger events.
///
/// Motion has to be reported continuously for `confirm_delay`, and still be
/// reported when the sensor is read once more at that point. A single "no
/// motion" sample while waiting cancels the candidate.
pub struct TriggerDebouncer {
    confirm_delay: Duration,
    pending_since: Option<Instant>,
}

impl TriggerDebouncer {
    pub fn new(confirm_delay: Duration) -> TriggerDebouncer {
        TriggerDebouncer {
            confirm_delay,
            pending_since: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    pub fn pending_since(&self) -> Option<Instant> {
        self.pending_since
    }

    /// Feeds one raw sample taken at `now`. `recheck` reads the sensor again
    /// and is only called once the delay has passed.
    ///
    /// Returns `true` exactly when a trigger is confirmed.
    pub fn update<F>(&mut self, motion: bool, now: Instant, recheck: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        if !motion {
            if self.pending_since.take().is_some() {
                log::debug!("Motion dropped before confirmation");
            }
            return false;
        }

        let since = match self.pending_since {
            Some(since) => since,
            None => {
                log::debug!("Motion candidate, confirming in {:?}", self.confirm_delay);
                self.pending_since = Some(now);
                return false;
            }
        };

        if now.saturating_duration_since(since) < self.confirm_delay {
            return false;
        }

        self.pending_since = None;
        if recheck() {
            true
        } else {
            log::debug!("Motion gone at recheck, ignoring as noise");
            false
        }
    }
}
