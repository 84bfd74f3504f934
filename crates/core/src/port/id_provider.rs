// ID Provider Port (for deterministic testing)

/// ID provider interface (allows deterministic IDs in tests)
pub trait IdProvider: Send + Sync {
    /// Generate a new unique record ID
    fn generate_id(&self) -> String;
}

/// UUID v4 provider (production)
pub struct UuidProvider;

impl IdProvider for UuidProvider {
    fn generate_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Sequential IDs with a prefix (`id-1`, `id-2`, ...)
    pub struct SequentialIdProvider {
        prefix: String,
        counter: AtomicU64,
    }

    impl SequentialIdProvider {
        pub fn new(prefix: impl Into<String>) -> Self {
            Self {
                prefix: prefix.into(),
                counter: AtomicU64::new(1),
            }
        }
    }

    impl Default for SequentialIdProvider {
        fn default() -> Self {
            Self::new("id")
        }
    }

    impl IdProvider for SequentialIdProvider {
        fn generate_id(&self) -> String {
            let n = self.counter.fetch_add(1, Ordering::SeqCst);
            format!("{}-{}", self.prefix, n)
        }
    }
}
