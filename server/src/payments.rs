//! Mock payment gateway for development and testing.
//!
//! This module provides a simplified payment gateway interface compatible
//! with services like Stripe. In production, this would be replaced with
//! an actual payment service integration; only the pass/fail contract and
//! the opaque payment reference cross into the booking core.

use chrono::{Datelike, Utc};
use fieldsport_core::types::{Money, PaymentRef};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Payment gateway result
pub type GatewayResult<T> = Result<T, PaymentError>;

/// Payment gateway error
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaymentError {
    /// The supplied card details failed validation
    #[error("invalid card details: {0}")]
    InvalidCard(String),
    /// The charge was declined
    #[error("payment declined: {0}")]
    Declined(String),
    /// The gateway could not be reached
    #[error("payment gateway unavailable: {0}")]
    Unavailable(String),
}

/// Card details supplied by the hunter at checkout.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CardDetails {
    /// Card number, spaces allowed
    pub number: String,
    /// Three digit security code
    pub cvv: String,
    /// Expiry in `MM/YY` form
    pub expiry: String,
    /// Cardholder name
    pub holder_name: String,
}

/// Payment gateway trait
///
/// Abstraction over payment processors. The booking flow only depends on
/// charge/refund with an opaque reference.
pub trait PaymentGateway: Send + Sync {
    /// Charge a card.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the charge fails.
    fn charge(
        &self,
        amount: Money,
        card: CardDetails,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<PaymentRef>> + Send>>;

    /// Refund a previously taken payment.
    ///
    /// # Errors
    ///
    /// Returns an error if the refund fails.
    fn refund(
        &self,
        payment_ref: &PaymentRef,
        amount: Money,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<String>> + Send>>;
}

/// Validates card details the way the checkout form does: PAN length,
/// CVV length, `MM/YY` expiry in the future, holder name present.
fn validate_card(card: &CardDetails) -> GatewayResult<()> {
    let digits: String = card.number.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() < 15 || digits.len() > 16 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(PaymentError::InvalidCard(
            "card number must be 15-16 digits".to_string(),
        ));
    }
    if card.cvv.len() != 3 || !card.cvv.chars().all(|c| c.is_ascii_digit()) {
        return Err(PaymentError::InvalidCard(
            "CVV must be 3 digits".to_string(),
        ));
    }

    let (month, year) = card
        .expiry
        .split_once('/')
        .and_then(|(m, y)| Some((m.parse::<u32>().ok()?, y.parse::<u32>().ok()?)))
        .ok_or_else(|| PaymentError::InvalidCard("expiry must be MM/YY".to_string()))?;
    if !(1..=12).contains(&month) {
        return Err(PaymentError::InvalidCard("invalid expiry month".to_string()));
    }
    let now = Utc::now();
    let current_year = now.year().rem_euclid(100).unsigned_abs();
    let current_month = now.month();
    if year < current_year || (year == current_year && month < current_month) {
        return Err(PaymentError::InvalidCard("card has expired".to_string()));
    }

    if card.holder_name.trim().len() < 3 {
        return Err(PaymentError::InvalidCard(
            "cardholder name is required".to_string(),
        ));
    }
    Ok(())
}

/// Mock payment gateway (validates the card, then always succeeds).
#[derive(Clone, Debug)]
pub struct MockPaymentGateway;

impl MockPaymentGateway {
    /// Creates a new mock payment gateway
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared() -> Arc<dyn PaymentGateway> {
        Arc::new(Self::new())
    }
}

impl Default for MockPaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentGateway for MockPaymentGateway {
    fn charge(
        &self,
        amount: Money,
        card: CardDetails,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<PaymentRef>> + Send>> {
        Box::pin(async move {
            validate_card(&card)?;

            // Simulate network delay
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

            let payment_ref = PaymentRef::new(format!("pm_{}", uuid::Uuid::new_v4().simple()));
            tracing::info!(
                payment_ref = %payment_ref,
                amount_pence = amount.pence(),
                "mock payment processed"
            );
            Ok(payment_ref)
        })
    }

    fn refund(
        &self,
        payment_ref: &PaymentRef,
        amount: Money,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<String>> + Send>> {
        let payment_ref = payment_ref.clone();
        Box::pin(async move {
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

            let refund_id = format!("re_{}", uuid::Uuid::new_v4().simple());
            tracing::info!(
                payment_ref = %payment_ref,
                amount_pence = amount.pence(),
                refund_id = %refund_id,
                "mock refund processed"
            );
            Ok(refund_id)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn card() -> CardDetails {
        CardDetails {
            number: "4242 4242 4242 4242".to_string(),
            cvv: "123".to_string(),
            expiry: "12/99".to_string(),
            holder_name: "John Hunter".to_string(),
        }
    }

    #[tokio::test]
    async fn valid_card_charges_successfully() {
        let gateway = MockPaymentGateway::new();
        let payment_ref = gateway
            .charge(Money::from_pence(45_000), card())
            .await
            .unwrap();
        assert!(payment_ref.as_str().starts_with("pm_"));
    }

    #[tokio::test]
    async fn short_card_number_is_rejected() {
        let gateway = MockPaymentGateway::new();
        let mut bad = card();
        bad.number = "4242".to_string();
        let err = gateway
            .charge(Money::from_pence(100), bad)
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidCard(_)));
    }

    #[tokio::test]
    async fn expired_card_is_rejected() {
        let gateway = MockPaymentGateway::new();
        let mut bad = card();
        bad.expiry = "01/20".to_string();
        let err = gateway
            .charge(Money::from_pence(100), bad)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            PaymentError::InvalidCard("card has expired".to_string())
        );
    }

    #[tokio::test]
    async fn malformed_expiry_is_rejected() {
        let gateway = MockPaymentGateway::new();
        let mut bad = card();
        bad.expiry = "2027-01".to_string();
        assert!(gateway.charge(Money::from_pence(100), bad).await.is_err());
    }

    #[tokio::test]
    async fn refund_succeeds() {
        let gateway = MockPaymentGateway::new();
        let refund_id = gateway
            .refund(&PaymentRef::new("pm_test"), Money::from_pence(100))
            .await
            .unwrap();
        assert!(refund_id.starts_with("re_"));
    }
}
