//! Mouse scroll sampling.
//!
//! Raw wheel deltas are summed into an accumulator which a timer zeroes every
//! interval, whether or not anybody read it. Readers therefore see roughly the
//! scroll of the last interval: a coarse, lossy sample rather than a velocity.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::trace;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollDelta {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ScrollAccumulator {
    delta: Arc<RwLock<ScrollDelta>>,
}

impl ScrollAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one raw scroll event
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    pub fn feed(&self, event: ScrollDelta) {
        let mut delta = self.delta.write().unwrap();
        delta.x += event.x;
        delta.y += event.y;
        delta.z += event.z;
    }

    /// Current accumulated delta, reading does not reset it
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    pub fn sample(&self) -> ScrollDelta {
        *self.delta.read().unwrap()
    }

    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    pub fn reset(&self) {
        *self.delta.write().unwrap() = ScrollDelta::default();
    }

    /// Spawns the timer zeroing the accumulator every `interval`.
    /// The first reset happens one full interval from now.
    pub fn spawn_reset_timer(&self, interval: Duration) -> JoinHandle<()> {
        let accumulator = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                accumulator.reset();
            }
        })
    }

    /// Spawns a task adding every event of `feed` until the sender side closes
    pub fn spawn_feed(&self, mut feed: mpsc::UnboundedReceiver<ScrollDelta>) -> JoinHandle<()> {
        let accumulator = self.clone();
        tokio::spawn(async move {
            while let Some(event) = feed.recv().await {
                trace!(?event, "Scroll event");
                accumulator.feed(event);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(65);

    #[test]
    fn test_feed_accumulates() {
        let acc = ScrollAccumulator::new();
        acc.feed(ScrollDelta { x: 1.0, y: -3.0, z: 0.0 });
        acc.feed(ScrollDelta { x: 2.0, y: -3.0, z: 0.5 });

        assert_eq!(acc.sample(), ScrollDelta { x: 3.0, y: -6.0, z: 0.5 });
        // reading does not reset
        assert_eq!(acc.sample(), ScrollDelta { x: 3.0, y: -6.0, z: 0.5 });

        acc.reset();
        assert_eq!(acc.sample(), ScrollDelta::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_resets_after_interval() {
        let acc = ScrollAccumulator::new();
        let timer = acc.spawn_reset_timer(INTERVAL);

        acc.feed(ScrollDelta { x: 0.0, y: 120.0, z: 0.0 });
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(acc.sample().y, 120.0);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(acc.sample(), ScrollDelta::default());

        timer.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_feed_task_forwards_events() {
        let acc = ScrollAccumulator::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let feeder = acc.spawn_feed(rx);

        tx.send(ScrollDelta { x: 4.0, y: 0.0, z: 0.0 }).unwrap();
        tx.send(ScrollDelta { x: 1.0, y: 0.0, z: 2.0 }).unwrap();
        drop(tx);
        feeder.await.unwrap();

        assert_eq!(acc.sample(), ScrollDelta { x: 5.0, y: 0.0, z: 2.0 });
    }
}
