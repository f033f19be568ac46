//! Outbound request throttle
//!
//! Callers take a ticket; a single scheduler task hands tickets back in the
//! order they were taken, never faster than one per `min_interval`. This is
//! what keeps us under Nominatim's one-request-per-second policy no matter
//! how many lookups are started at once.

use crate::error::{Error, Result};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};
use tracing::trace;

type Ticket = oneshot::Sender<Instant>;

/// FIFO rate limiter with a hard minimum spacing between grants
#[derive(Debug, Clone)]
pub struct RateLimiter {
    tickets: mpsc::UnboundedSender<Ticket>,
    min_interval: Duration,
}

impl RateLimiter {
    /// Create a limiter and start its scheduler.
    ///
    /// Must be called from within a tokio runtime. The scheduler stops once
    /// every clone of the limiter has been dropped.
    pub fn new(min_interval: Duration) -> Self {
        let (tickets, queue) = mpsc::unbounded_channel();
        tokio::spawn(schedule(queue, min_interval));
        Self {
            tickets,
            min_interval,
        }
    }

    /// Wait for this caller's turn. Returns the instant the turn was granted.
    pub async fn acquire(&self) -> Result<Instant> {
        let (ticket, granted) = oneshot::channel();
        self.tickets.send(ticket).map_err(|_| Error::RateLimiter)?;
        granted.await.map_err(|_| Error::RateLimiter)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

async fn schedule(mut queue: mpsc::UnboundedReceiver<Ticket>, min_interval: Duration) {
    let mut last_grant: Option<Instant> = None;

    while let Some(ticket) = queue.recv().await {
        if let Some(last) = last_grant {
            sleep_until(last + min_interval).await;
        }

        let now = Instant::now();
        // A caller that gave up while waiting doesn't use up a slot
        if ticket.send(now).is_ok() {
            trace!("rate limiter granted turn");
            last_grant = Some(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const INTERVAL: Duration = Duration::from_millis(1100);

    #[tokio::test(start_paused = true)]
    async fn test_first_acquire_is_immediate() {
        let limiter = RateLimiter::new(INTERVAL);
        let start = Instant::now();
        let granted = limiter.acquire().await.unwrap();
        assert_eq!(granted, start);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_grants_are_spaced() {
        let limiter = RateLimiter::new(INTERVAL);

        let (a, b, c, d) = tokio::join!(
            limiter.acquire(),
            limiter.acquire(),
            limiter.acquire(),
            limiter.acquire()
        );
        let grants = [a.unwrap(), b.unwrap(), c.unwrap(), d.unwrap()];

        for pair in grants.windows(2) {
            assert!(pair[1] >= pair[0] + INTERVAL);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_grants_follow_call_order() {
        let limiter = RateLimiter::new(INTERVAL);
        let order = Arc::new(Mutex::new(Vec::new()));

        let take = |id: usize| {
            let limiter = limiter.clone();
            let order = order.clone();
            async move {
                limiter.acquire().await.unwrap();
                order.lock().unwrap().push(id);
            }
        };

        tokio::join!(take(0), take(1), take(2), take(3), take(4));
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_limiter_does_not_delay() {
        let limiter = RateLimiter::new(INTERVAL);
        limiter.acquire().await.unwrap();

        tokio::time::advance(Duration::from_secs(5)).await;
        let before = Instant::now();
        let granted = limiter.acquire().await.unwrap();
        assert_eq!(granted, before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_ticket_is_skipped() {
        let limiter = RateLimiter::new(INTERVAL);
        let first = limiter.acquire().await.unwrap();

        // Gives up before its turn comes round
        let abandoned = tokio::time::timeout(Duration::from_millis(100), limiter.acquire()).await;
        assert!(abandoned.is_err());

        let next = limiter.acquire().await.unwrap();
        assert_eq!(next, first + INTERVAL);
    }
}
