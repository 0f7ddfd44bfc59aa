//! Application state for the Fieldsport HTTP server.

use crate::notifications::Notifier;
use crate::payments::PaymentGateway;
use crate::tagging::TaggingService;
use fieldsport_core::store::PlatformStore;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply via `Arc`) for each request. The store is the only
/// stateful dependency; gateway, notifier and tagging service are
/// swappable collaborators behind traits.
#[derive(Clone)]
pub struct AppState {
    /// Platform storage (bookings, sessions, reports, tags, directory)
    pub store: Arc<dyn PlatformStore>,
    /// Payment gateway (mock in development)
    pub gateway: Arc<dyn PaymentGateway>,
    /// Notification delivery
    pub notifier: Arc<dyn Notifier>,
    /// Tag issuance and verification
    pub tagging: Arc<TaggingService>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        store: Arc<dyn PlatformStore>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
        tagging: Arc<TaggingService>,
    ) -> Self {
        Self {
            store,
            gateway,
            notifier,
            tagging,
        }
    }
}
