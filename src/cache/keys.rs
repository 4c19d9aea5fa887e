//! Type-safe cache key builders

use std::fmt;

pub const VERSION: &str = "v1";

pub mod payment {
    use super::*;

    pub const NAMESPACE: &str = "payment";

    /// Key of one cached payment snapshot.
    #[derive(Debug, Clone)]
    pub struct SnapshotKey {
        pub payment_id: String,
    }

    impl SnapshotKey {
        pub fn new(payment_id: impl Into<String>) -> Self {
            Self {
                payment_id: payment_id.into(),
            }
        }
    }

    impl fmt::Display for SnapshotKey {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}:{}:snapshot:{}", VERSION, NAMESPACE, self.payment_id)
        }
    }

    /// Pattern matching every payment snapshot, for bulk flushes.
    pub fn snapshot_pattern() -> String {
        format!("{}:{}:snapshot:*", VERSION, NAMESPACE)
    }
}
