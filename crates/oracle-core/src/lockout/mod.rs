//! Durable lockout state.
//!
//! One [`LockoutRecord`] per identity at most; records whose expiry has been
//! reached are treated as absent on read and dropped on the next rewrite.

mod error;
mod file_store;

pub use error::{StoreError, StoreResult};
pub use file_store::{FileLockoutStore, LOCK_FILE_NAME, STATE_FILE_NAME};

use chrono::{DateTime, Utc};

use crate::identity::IdentityKey;
use crate::types::LockoutRecord;

/// Storage for lockout records.
///
/// `put_or_extend` must be linearizable per key across processes.
pub trait LockoutStore: Send + Sync {
    /// The active record for `identity`, or `None` if absent or expired at `now`
    fn get(&self, identity: &IdentityKey, now: DateTime<Utc>) -> StoreResult<Option<LockoutRecord>>;

    /// Create a record expiring one TTL after `now`, or extend the active one
    /// to that expiry and replace its reason
    fn put_or_extend(
        &self,
        identity: &IdentityKey,
        reason: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<LockoutRecord>;

    /// Remove the record for `identity`. Returns whether one was present.
    fn clear(&self, identity: &IdentityKey) -> StoreResult<bool>;

    /// Drop all state, including unreadable state
    fn reset(&self) -> StoreResult<()>;

    /// Number of lockouts ever issued to `identity` (extensions not counted)
    fn prior_lockouts(&self, identity: &IdentityKey) -> StoreResult<u32>;
}
