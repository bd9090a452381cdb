use chrono::{DateTime, Duration, Utc};

/// Time source for services and tests.
///
/// A clock either follows the system time or sits pinned at one instant.
/// Pinned clocks can be advanced, which is how tests step through a sequence
/// of saves deterministically.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clock {
    pinned: Option<DateTime<Utc>>,
}

impl Clock {
    /// A clock that follows the system time.
    #[must_use]
    pub fn system() -> Self {
        Self { pinned: None }
    }

    /// A clock pinned at `at`.
    #[must_use]
    pub fn pinned(at: DateTime<Utc>) -> Self {
        Self { pinned: Some(at) }
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.pinned.unwrap_or_else(Utc::now)
    }

    /// Moves a pinned clock forward. System clocks are unaffected.
    pub fn advance(&mut self, delta: Duration) {
        if let Some(at) = self.pinned.as_mut() {
            *at += delta;
        }
    }

    #[must_use]
    pub fn is_pinned(&self) -> bool {
        self.pinned.is_some()
    }
}

/// Seconds since the epoch of the deterministic test instant
/// (2025-06-15T15:06:40Z).
pub const TEST_EPOCH_SECONDS: i64 = 1_750_000_000;

/// The deterministic instant used across test suites.
///
/// # Panics
///
/// Panics if the constant cannot be represented, which would be a bug in the
/// constant itself.
#[must_use]
pub fn test_instant() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(TEST_EPOCH_SECONDS, 0)
        .expect("test instant should be representable")
}

/// A clock pinned at [`test_instant`].
#[must_use]
pub fn test_clock() -> Clock {
    Clock::pinned(test_instant())
}
