//! Training lifecycle observers.

use std::time::{Duration, Instant};

use tracing::warn;

/// Hooks invoked by a training loop. All default to no-ops.
pub trait TrainingCallback {
    fn on_train_begin(&mut self) {}
    fn on_epoch_begin(&mut self, _epoch: usize) {}
    fn on_epoch_end(&mut self, _epoch: usize) {}
}

/// Records wall-clock time of every epoch, in order.
#[derive(Debug, Default)]
pub struct EpochTimer {
    times: Vec<Duration>,
    epoch_start: Option<Instant>,
}

impl EpochTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn times(&self) -> &[Duration] {
        &self.times
    }

    pub fn total(&self) -> Duration {
        self.times.iter().sum()
    }

    /// Epoch times in seconds, ready for plotting.
    pub fn as_secs(&self) -> Vec<f64> {
        self.times.iter().map(Duration::as_secs_f64).collect()
    }

    /// Close the open epoch at `now`; exposed for deterministic tests.
    fn finish_epoch(&mut self, epoch: usize, now: Instant) {
        match self.epoch_start.take() {
            Some(start) => self.times.push(now.saturating_duration_since(start)),
            None => warn!(epoch, "epoch ended without a matching begin; ignored"),
        }
    }
}

impl TrainingCallback for EpochTimer {
    fn on_train_begin(&mut self) {
        self.times.clear();
        self.epoch_start = None;
    }

    fn on_epoch_begin(&mut self, _epoch: usize) {
        self.epoch_start = Some(Instant::now());
    }

    fn on_epoch_end(&mut self, epoch: usize) {
        self.finish_epoch(epoch, Instant::now());
    }
}

/// Forwards every event to each registered observer, in registration order.
#[derive(Default)]
pub struct CallbackList<'a> {
    callbacks: Vec<&'a mut dyn TrainingCallback>,
}

impl<'a> CallbackList<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, callback: &'a mut dyn TrainingCallback) {
        self.callbacks.push(callback);
    }
}

impl TrainingCallback for CallbackList<'_> {
    fn on_train_begin(&mut self) {
        self.callbacks.iter_mut().for_each(|c| c.on_train_begin());
    }

    fn on_epoch_begin(&mut self, epoch: usize) {
        self.callbacks.iter_mut().for_each(|c| c.on_epoch_begin(epoch));
    }

    fn on_epoch_end(&mut self, epoch: usize) {
        self.callbacks.iter_mut().for_each(|c| c.on_epoch_end(epoch));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_one_time_per_epoch() {
        let mut timer = EpochTimer::new();
        timer.on_train_begin();
        for epoch in 0..3 {
            timer.on_epoch_begin(epoch);
            let start = timer.epoch_start.unwrap();
            timer.finish_epoch(epoch, start + Duration::from_millis(10 * (epoch as u64 + 1)));
        }
        assert_eq!(
            timer.times(),
            &[
                Duration::from_millis(10),
                Duration::from_millis(20),
                Duration::from_millis(30)
            ]
        );
        assert_eq!(timer.total(), Duration::from_millis(60));
        assert_eq!(timer.as_secs().len(), 3);
    }

    #[test]
    fn train_begin_resets_history() {
        let mut timer = EpochTimer::new();
        timer.on_epoch_begin(0);
        timer.on_epoch_end(0);
        assert_eq!(timer.times().len(), 1);
        timer.on_train_begin();
        assert!(timer.times().is_empty());
    }

    #[test]
    fn unmatched_end_is_ignored() {
        let mut timer = EpochTimer::new();
        timer.on_epoch_end(4);
        assert!(timer.times().is_empty());
    }

    #[derive(Default)]
    struct Counter {
        events: Vec<&'static str>,
    }

    impl TrainingCallback for Counter {
        fn on_epoch_end(&mut self, _epoch: usize) {
            self.events.push("end");
        }
    }

    #[test]
    fn list_fans_out_events() {
        let mut timer = EpochTimer::new();
        let mut counter = Counter::default();
        {
            let mut list = CallbackList::new();
            list.push(&mut timer);
            list.push(&mut counter);
            list.on_train_begin();
            list.on_epoch_begin(0);
            list.on_epoch_end(0);
        }
        assert_eq!(timer.times().len(), 1);
        assert_eq!(counter.events, vec!["end"]);
    }
}
