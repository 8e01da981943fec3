use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Trailing-edge debounce timer.
///
/// At most one timer is armed at a time; arming cancels the previous one.
/// Every timer carries a ticket, and only the ticket of the currently armed
/// timer is accepted by [`Debouncer::settle`], so a fire that was already
/// queued when its timer got cancelled is ignored.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    ticket: u64,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            ticket: 0,
            pending: None,
        }
    }

    /// Arm a timer that calls `fire` with its ticket once the delay elapses
    /// without another `schedule` or `cancel`. Must run inside a tokio runtime.
    pub fn schedule<F>(&mut self, fire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();
        let ticket = self.ticket;
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            sleep(delay).await;
            fire(ticket);
        }));
        ticket
    }

    /// Drop the armed timer, if any, and invalidate its ticket.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.ticket += 1;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Accept a fire. Returns `false` for tickets of cancelled timers.
    pub fn settle(&mut self, ticket: u64) -> bool {
        if self.pending.is_some() && ticket == self.ticket {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
