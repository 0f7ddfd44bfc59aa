//! Notification delivery for booking and hunt lifecycle events.
//!
//! The booking core hands over complete records ([`PlatformEvent`]);
//! formatting and delivery are this collaborator's concern. The console
//! backend writes structured log lines; a real deployment would swap in
//! an email service behind the same trait.

use fieldsport_core::PlatformEvent;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Notification delivery trait.
pub trait Notifier: Send + Sync {
    /// Deliver one event to its recipients. Delivery failures must not
    /// fail the operation that raised the event.
    fn notify(&self, event: PlatformEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>;
}

/// Console notifier: logs each notification through `tracing`.
#[derive(Clone, Debug)]
pub struct ConsoleNotifier {
    from_email: String,
    admin_email: String,
}

impl ConsoleNotifier {
    /// Creates a console notifier stamping `from_email` as the sender.
    #[must_use]
    pub const fn new(from_email: String, admin_email: String) -> Self {
        Self {
            from_email,
            admin_email,
        }
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared(from_email: String, admin_email: String) -> Arc<dyn Notifier> {
        Arc::new(Self::new(from_email, admin_email))
    }

    fn log(&self, to: &str, subject: &str, event_name: &str) {
        tracing::info!(
            event = event_name,
            to = to,
            from = %self.from_email,
            subject = subject,
            "notification sent"
        );
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, event: PlatformEvent) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        let this = self.clone();
        Box::pin(async move {
            let name = event.name();
            match &event {
                PlatformEvent::BookingCreated {
                    field,
                    hunter,
                    owner,
                    ..
                } => {
                    this.log(
                        &hunter.email,
                        &format!("Booking Request Created - {}", field.name),
                        name,
                    );
                    this.log(
                        &owner.email,
                        &format!("New Booking Request - {}", field.name),
                        name,
                    );
                }
                PlatformEvent::BookingApproved { field, hunter, .. } => {
                    this.log(
                        &hunter.email,
                        &format!("Booking Approved - {}", field.name),
                        name,
                    );
                }
                PlatformEvent::BookingRejected { field, hunter, .. } => {
                    this.log(
                        &hunter.email,
                        &format!("Booking Update - {}", field.name),
                        name,
                    );
                }
                PlatformEvent::BookingCancelled { field, owner, .. } => {
                    this.log(
                        &owner.email,
                        &format!("Booking Cancelled - {}", field.name),
                        name,
                    );
                }
                PlatformEvent::HuntStarted { field, owner, .. } => {
                    let admin = this.admin_email.clone();
                    this.log(&admin, &format!("Hunt Started - {}", field.name), name);
                    this.log(
                        &owner.email,
                        &format!("Hunt Started - {}", field.name),
                        name,
                    );
                }
            }
        })
    }
}
