//! Order summary and notification templates
//!
//! Rendering is deterministic: the same order always produces the same text.

use crate::config::NotificationConfig;
use crate::orders::model::{coerce_number, format_number, Order};
use std::fmt::Write;
use thiserror::Error;

/// Reasons an accepted order cannot be rendered
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SummaryError {
    /// `items` passed the presence check but is not an array
    #[error("Order items is not a list")]
    ItemsNotAList,
}

/// Render the human-readable order summary shared by all emails
///
/// # Arguments
/// * `order` - Accepted order
/// * `currency` - Currency label printed before every amount
///
/// # Returns
/// * `Ok(String)` - Rendered summary
/// * `Err(SummaryError)` - If `items` is not an array; the order has already
///   been stored by then and the request fails with 500
pub fn render_summary(order: &Order, currency: &str) -> Result<String, SummaryError> {
    let mut text = String::new();
    // Writing into a String cannot fail.
    let _ = write!(
        text,
        "Order ID: {}\nCustomer: {}\nPhone: {}\nEmail: {}\nAddress: {}\nPickup: {}\nNotes: {}\n\nItems:\n",
        order.text("id"),
        order.text("name"),
        order.text("phone"),
        order.text("email"),
        order.text("address"),
        order.text("pickup"),
        order.text("notes"),
    );

    let lines = order.lines().ok_or(SummaryError::ItemsNotAList)?;
    for line in lines {
        let _ = writeln!(
            text,
            " - {}: {} × {} {} = {} {}",
            line.name,
            line.qty,
            currency,
            line.price,
            currency,
            format_number(line.line_total)
        );
    }

    let _ = write!(
        text,
        "\nSubtotal: {c} {}\nPickup: {c} {}\nTotal: {c} {}\n",
        order.text("subtotal"),
        order.text("pickupCharge"),
        order.text("total"),
        c = currency,
    );
    Ok(text)
}

/// Sum of item line totals when it disagrees with the supplied subtotal
///
/// Totals are never rewritten; callers only log the mismatch.
pub fn subtotal_mismatch(order: &Order) -> Option<(f64, f64)> {
    let computed: f64 = order.lines()?.iter().map(|line| line.line_total).sum();
    let supplied = coerce_number(order.get("subtotal")?);
    if computed.is_nan() || supplied.is_nan() || (computed - supplied).abs() < 1e-9 {
        None
    } else {
        Some((computed, supplied))
    }
}

/// Subject and body templates for the four notification messages
#[derive(Debug, Clone)]
pub struct MessageTemplates {
    shop_name: String,
    currency: String,
}

impl MessageTemplates {
    /// Create templates for a shop
    pub fn new(shop_name: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            shop_name: shop_name.into(),
            currency: currency.into(),
        }
    }

    /// Templates configured from the notification settings
    pub fn from_config(config: &NotificationConfig) -> Self {
        Self::new(config.shop_name.clone(), config.currency.clone())
    }

    /// Currency label used in every amount
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Order summary using this shop's currency
    pub fn summary(&self, order: &Order) -> Result<String, SummaryError> {
        render_summary(order, &self.currency)
    }

    /// Confirmation email subject for the customer
    pub fn customer_email_subject(&self, order: &Order) -> String {
        format!(
            "{} — Order Confirmation ({})",
            self.shop_name,
            order.text("id")
        )
    }

    /// Confirmation email body for the customer
    pub fn customer_email_body(&self, order: &Order, summary: &str) -> String {
        format!(
            "Hello {},\n\nThank you for your order. Details below:\n\n{}\n\nRegards,\n{}",
            order.text("name"),
            summary,
            self.shop_name
        )
    }

    /// New-order email subject for the owner
    pub fn owner_email_subject(&self, order: &Order) -> String {
        format!("New Order Received — {}", order.text("id"))
    }

    /// New-order email body for the owner
    pub fn owner_email_body(&self, summary: &str) -> String {
        format!("New order received:\n\n{}", summary)
    }

    /// Confirmation SMS for the customer
    pub fn customer_sms(&self, order: &Order) -> String {
        format!(
            "Thank you {}! Your order {} was received. Total {} {}.",
            order.text("name"),
            order.text("id"),
            self.currency,
            order.text("total")
        )
    }

    /// New-order SMS for the owner
    pub fn owner_sms(&self, order: &Order) -> String {
        format!(
            "New order {}: {} items, Total {} {}. Pickup: {}",
            order.text("id"),
            order.text("totalItems"),
            self.currency,
            order.text("total"),
            order.text("pickup")
        )
    }
}
