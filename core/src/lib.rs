//! Domain model for the Fieldsport booking platform.
//!
//! This crate holds everything with real invariants and failure modes:
//! booking creation rules (double-booking prevention, per-day capacity),
//! the harvest quota ledger, the hunt session state machine, hunt report
//! semantics and animal-tag traceability — plus the [`store::PlatformStore`]
//! trait that storage backends implement.
//!
//! # Architecture
//!
//! ```text
//! booking request ──► availability + double-booking checks
//!                      │
//!                      ▼
//!                booking (pending/confirmed) ──► operator approval
//!                      │
//!            (hunt day, lazy) ▼
//!                hunt session: not_started → active → completed
//!                      │
//!                      ▼
//!                hunt report ──► quota ledger depletion (atomic)
//!                      │
//!                      ▼
//!                animal tags ──► public verification lookup
//! ```
//!
//! The invariant decisions are pure functions here; the storage crates
//! (`fieldsport-postgres`, `fieldsport-testing`) supply atomicity around
//! them.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod availability;
pub mod booking;
pub mod environment;
pub mod error;
pub mod events;
pub mod quota;
pub mod report;
pub mod session;
pub mod store;
pub mod types;

pub use booking::NewBooking;
pub use environment::{Clock, SystemClock};
pub use error::{PlatformError, Result};
pub use events::PlatformEvent;
pub use quota::{Quota, SpeciesQuota};
pub use report::{NewHuntReport, ReviewUpdate};
pub use store::{NewAnimalTag, PlatformStore};
pub use types::*;
