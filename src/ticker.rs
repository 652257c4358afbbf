//! Cancellable scheduled events
//!
//! A [`Ticker`] posts an event into the app's event channel, either once
//! after a delay or periodically. Dropping the ticker aborts its task, so a
//! panel that owns one can never receive ticks after it is torn down.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant};

#[derive(Debug)]
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Post `event` every `period`, first after one full period
    pub fn every<E>(period: Duration, tx: UnboundedSender<E>, event: E) -> Self
    where
        E: Clone + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if tx.send(event.clone()).is_err() {
                    break;
                }
            }
        });
        Self { handle }
    }

    /// Post `event` once after `delay`
    pub fn once<E>(delay: Duration, tx: UnboundedSender<E>, event: E) -> Self
    where
        E: Send + 'static,
    {
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            let _ = tx.send(event);
        });
        Self { handle }
    }

    /// Stop the ticker; no further events are posted
    pub fn cancel(self) {
        drop(self);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn test_every_ticks_on_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let ticker = Ticker::every(Duration::from_secs(1), tx, "tick");

        tokio::time::sleep(Duration::from_millis(3500)).await;
        let mut count = 0;
        while rx.try_recv().is_ok() {
            count += 1;
        }
        assert_eq!(count, 3);
        drop(ticker);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let ticker = Ticker::every(Duration::from_secs(4), tx, 1u8);
        tokio::time::sleep(Duration::from_millis(4100)).await;
        assert_eq!(rx.try_recv().ok(), Some(1));

        ticker.cancel();
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_once_fires_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let ticker = Ticker::once(Duration::from_millis(500), tx, "offer");

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(rx.try_recv().is_err());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(rx.try_recv().ok(), Some("offer"));
        tokio::task::yield_now().await;
        assert!(ticker.is_finished());
    }
}
