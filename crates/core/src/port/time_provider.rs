// Time Provider Port (for testability)

/// Time provider interface (allows mocking in tests)
pub trait TimeProvider: Send + Sync {
    /// Get current time in milliseconds since epoch
    fn now_millis(&self) -> i64;
}

/// System time provider (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Clock that advances by a fixed step on every read
    pub struct SteppingTimeProvider {
        next: AtomicI64,
        step: i64,
    }

    impl SteppingTimeProvider {
        pub fn new(start: i64, step: i64) -> Self {
            Self {
                next: AtomicI64::new(start),
                step,
            }
        }
    }

    impl Default for SteppingTimeProvider {
        fn default() -> Self {
            Self::new(1000, 1000)
        }
    }

    impl TimeProvider for SteppingTimeProvider {
        fn now_millis(&self) -> i64 {
            self.next.fetch_add(self.step, Ordering::SeqCst)
        }
    }

    /// Clock frozen at one instant (every record shares a timestamp)
    pub struct FrozenTimeProvider(pub i64);

    impl TimeProvider for FrozenTimeProvider {
        fn now_millis(&self) -> i64 {
            self.0
        }
    }
}
