//! # Oracle Core
//!
//! The decision and lockout gate that precedes every module invocation.
//!
//! - [`types`]: identity keys, consultation requests/responses, verdicts and
//!   lockout records
//! - [`traits`]: the [`ProviderClient`] contract implemented by each decision
//!   backend and the [`Oracle`] contract implemented by the consultation engine
//! - [`lockout`]: the durable, cross-process [`LockoutStore`]
//! - [`gate`]: the two-state `Eligible`/`Locked` machine tying it together
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use oracle_core::{FileLockoutStore, Gate, IdentityKey, SystemClock, Eligibility};
//!
//! let store = Arc::new(FileLockoutStore::open("/tmp/oracle-state"));
//! let gate = Gate::new(store, Arc::new(SystemClock));
//! match gate.check_eligibility(&IdentityKey::from_environment()) {
//!     Eligibility::Eligible => println!("the oracle will see you"),
//!     Eligibility::Locked { remaining, .. } => println!("come back in {remaining}"),
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod gate;
pub mod identity;
pub mod lockout;
pub mod traits;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use clock::{Clock, SystemClock};
pub use gate::{
    Eligibility, Gate, GateError, GateOutcome, GateResult, UNREADABLE_STATE_REASON,
};
pub use identity::{IdentityKey, IDENTITY_ENV};
pub use lockout::{FileLockoutStore, LockoutStore, StoreError, StoreResult};
pub use traits::{Oracle, ProviderClient, ProviderError, ProviderResult};
pub use types::{
    lockout_ttl, Consultation, ConsultationRequest, ConsultationResponse, LockoutRecord,
    Verdict, LOCKOUT_HOURS,
};

#[cfg(feature = "test-utils")]
pub use clock::ManualClock;
#[cfg(feature = "test-utils")]
pub use test_utils::ScriptedOracle;
