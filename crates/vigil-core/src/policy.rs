//! Delivery gating.

use serde::{Deserialize, Serialize};

/// Exit statuses admitted when no explicit policy is configured.
///
/// Reproduces the historical gate of deliveries on statuses 0 and 2. No run
/// state gives 2 a special meaning; the set is kept for compatibility and is
/// configurable, or disabled with `deliver_all`.
pub const DEFAULT_STATUSES: [i32; 2] = [0, 2];

/// Decides whether a message produced for a check run reaches the senders.
///
/// Suppressed messages are dropped, never queued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPolicy {
    /// Deliver regardless of status.
    All,
    /// Deliver only when the run's status is listed.
    Statuses(Vec<i32>),
}

impl DeliveryPolicy {
    pub fn allows(&self, status: i32) -> bool {
        match self {
            DeliveryPolicy::All => true,
            DeliveryPolicy::Statuses(statuses) => statuses.contains(&status),
        }
    }
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        DeliveryPolicy::Statuses(DEFAULT_STATUSES.to_vec())
    }
}
