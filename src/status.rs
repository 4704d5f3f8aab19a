//! Transient banner messages.
//!
//! A success message schedules its own removal `ttl` after it is posted. The
//! scheduled clear is fire-and-forget: with [`ClearPolicy::Unconditional`] a
//! clear scheduled by an older message also removes a newer one posted in the
//! meantime. [`ClearPolicy::OwnMessageOnly`] restricts a clear to the message
//! that scheduled it.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_MESSAGE_TTL: Duration = Duration::from_secs(3);

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearPolicy {
    #[default]
    Unconditional,
    OwnMessageOnly,
}

#[derive(Debug, Clone, Copy)]
struct ScheduledClear {
    due: Instant,
    seq: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub success: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StatusBoard {
    success: Option<(u64, String)>,
    error: Option<String>,
    pending: Vec<ScheduledClear>,
    next_seq: u64,
    ttl: Duration,
    policy: ClearPolicy,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGE_TTL, ClearPolicy::default())
    }
}

impl StatusBoard {
    pub fn new(ttl: Duration, policy: ClearPolicy) -> Self {
        Self {
            success: None,
            error: None,
            pending: Vec::new(),
            next_seq: 0,
            ttl,
            policy,
        }
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_ref().map(|(_, text)| text.as_str())
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            success: self.success().map(str::to_string),
            error: self.error.clone(),
        }
    }

    pub fn pending_clears(&self) -> usize {
        self.pending.len()
    }

    pub fn post_success(&mut self, text: impl Into<String>, now: Instant) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.success = Some((seq, text.into()));
        self.pending.push(ScheduledClear {
            due: now + self.ttl,
            seq,
        });
    }

    pub fn post_error(&mut self, text: impl Into<String>) {
        self.error = Some(text.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Run every scheduled clear that is due at `now`.
    pub fn tick(&mut self, now: Instant) {
        let (due, waiting): (Vec<ScheduledClear>, Vec<ScheduledClear>) =
            self.pending.iter().partition(|clear| clear.due <= now);
        self.pending = waiting;
        for clear in due {
            match self.policy {
                ClearPolicy::Unconditional => self.success = None,
                ClearPolicy::OwnMessageOnly => {
                    if matches!(self.success, Some((seq, _)) if seq == clear.seq) {
                        self.success = None;
                    }
                }
            }
        }
    }
}
