// Connection lifecycle state machine for the position feed.
//
// The transport driver owns the socket; this type only decides what the driver
// should do next, so the retry policy can be exercised without a network.

use crate::use_cases::types::ConnectionState;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
pub struct ConnectionManager {
    state: ConnectionState,
    backoff: Duration,
    // At most one reconnect deadline is ever pending.
    retry_at: Option<Instant>,
    attempts: u64,
}

impl ConnectionManager {
    pub fn new(backoff: Duration) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            backoff,
            retry_at: None,
            attempts: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn retry_deadline(&self) -> Option<Instant> {
        self.retry_at
    }

    /// Returns true when the driver should open a new transport.
    pub fn connect(&mut self) -> bool {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Connected => false,
            ConnectionState::Disconnected | ConnectionState::Error => {
                self.state = ConnectionState::Connecting;
                self.attempts += 1;
                // The next close or failure starts its own backoff window.
                self.retry_at = None;
                true
            }
        }
    }

    pub fn on_opened(&mut self) {
        self.state = ConnectionState::Connected;
    }

    /// Unexpected close of the transport.
    pub fn on_closed(&mut self, now: Instant) {
        self.state = ConnectionState::Disconnected;
        self.schedule_retry(now);
    }

    /// Transport error, including a failed open.
    pub fn on_failed(&mut self, now: Instant) {
        self.state = ConnectionState::Error;
        self.schedule_retry(now);
    }

    /// User-requested disconnect. Returns true when a transport should be closed.
    pub fn disconnect(&mut self) -> bool {
        let had_transport = matches!(
            self.state,
            ConnectionState::Connecting | ConnectionState::Connected
        );
        self.state = ConnectionState::Disconnected;
        self.retry_at = None;
        had_transport
    }

    /// Called when the reconnect deadline may have passed. Returns true when the
    /// driver should open a new transport.
    pub fn on_retry_due(&mut self, now: Instant) -> bool {
        match self.retry_at {
            Some(at) if now >= at => {
                self.retry_at = None;
            }
            _ => return false,
        }

        if self.state == ConnectionState::Error {
            self.state = ConnectionState::Disconnected;
        }
        // A manual connect may have won the race while the timer was pending.
        if self.state != ConnectionState::Disconnected {
            return false;
        }
        self.connect()
    }

    fn schedule_retry(&mut self, now: Instant) {
        if self.retry_at.is_none() {
            self.retry_at = Some(now + self.backoff);
        }
    }
}
