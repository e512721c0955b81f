//! Transient message stack.
//!
//! Entries are visible for `display` time, then spend `exit` time in the
//! leaving phase (the slide-out transition) before being dropped. Expiry is
//! driven by [`Notifications::expire`] with an explicit clock reading.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

impl Level {
    pub fn colour(&self) -> &'static str {
        match self {
            Level::Error => "#dc3545",
            Level::Success => "#28a745",
            Level::Info => "#007bff",
        }
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Level::Error => (0xdc, 0x35, 0x45),
            Level::Success => (0x28, 0xa7, 0x45),
            Level::Info => (0x00, 0x7b, 0xff),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Visible,
    Leaving,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub level: Level,
    pub created: Instant,
    pub phase: Phase,
}

pub struct Notifications {
    entries: Vec<Notification>,
    next_id: u64,
    display: Duration,
    exit: Duration,
}

impl Default for Notifications {
    fn default() -> Self {
        Notifications::new(Duration::from_secs(5), Duration::from_millis(300))
    }
}

impl Notifications {
    pub fn new(display: Duration, exit: Duration) -> Self {
        Notifications {
            entries: Vec::new(),
            next_id: 1,
            display,
            exit,
        }
    }

    pub fn push(&mut self, message: impl Into<String>, level: Level, now: Instant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Notification {
            id,
            message: message.into(),
            level,
            created: now,
            phase: Phase::Visible,
        });
        id
    }

    /// Advance every entry's phase and drop the finished ones, returned in
    /// insertion order.
    pub fn expire(&mut self, now: Instant) -> Vec<Notification> {
        let (display, gone) = (self.display, self.display + self.exit);
        let mut removed = Vec::new();
        self.entries.retain_mut(|n| {
            let age = now.saturating_duration_since(n.created);
            if age >= gone {
                removed.push(n.clone());
                false
            } else {
                if age >= display {
                    n.phase = Phase::Leaving;
                }
                true
            }
        });
        removed
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|n| n.id != id);
        self.entries.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&Notification> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
