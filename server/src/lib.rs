//! Fieldsport booking platform HTTP server.
//!
//! Wires the domain core to the outside world: an Axum JSON API over a
//! [`fieldsport_core::PlatformStore`], a payment gateway and a
//! notification service behind traits, and the animal tagging engine
//! with its public verification surface.
//!
//! # Request flow
//!
//! ```text
//! POST /api/bookings
//!   availability pre-check ──► payment gateway ──► store.create_booking
//!   (atomic double-booking + capacity checks)  ──► notifications
//!
//! hunt day:
//!   POST /api/bookings/:id/session   (lazy materialization, today only)
//!   POST /api/sessions/:id/start     (notifies owner + operator)
//!   POST /api/sessions/:id/report    (atomic quota depletion)
//!   POST /api/sessions/:id/end
//!   POST /api/reports/:id/tags       (artifacts first, then the record)
//!   GET  /verify/:tag_number         (public)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod artifacts;
pub mod config;
pub mod notifications;
pub mod payments;
pub mod server;
pub mod tagging;

pub use config::Config;
pub use server::{build_router, AppError, AppState};
