//! Order intake API handler
//!
//! `POST /api/order`: validate, timestamp, persist, then notify.

use crate::error::AppError;
use crate::orders::{summary::subtotal_mismatch, Order};
use crate::state::SharedState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Successful submission response
#[derive(Debug, Serialize)]
pub struct OrderAccepted {
    /// Always `true`
    pub ok: bool,
    /// Caller-supplied order id (even `null`), omitted when the key is absent
    #[serde(rename = "orderId", skip_serializing_if = "Option::is_none")]
    pub order_id: Option<Value>,
}

/// POST /api/order - Accept a new order
///
/// The order is persisted before any notification is sent; a failed
/// required notification answers 500 but does not remove the stored order.
pub async fn submit_order(
    State(state): State<SharedState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<OrderAccepted>, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::InvalidOrder(e.body_text()))?;
    let mut order = Order::from_payload(payload)?;

    if order.ensure_created(Utc::now()) {
        debug!(created = %order.text("created"), "Assigned order timestamp");
    }

    let order_id = order.text("id");
    if let Some((computed, supplied)) = subtotal_mismatch(&order) {
        warn!(
            order_id = %order_id,
            computed,
            supplied,
            "Supplied subtotal does not match item totals"
        );
    }

    let count = state.store.append(&order).await?;
    info!(order_id = %order_id, count, "Order saved");

    let summary = state.notifier.templates().summary(&order)?;
    let report = state.notifier.notify_order(&order, &summary).await?;
    info!(
        order_id = %order_id,
        delivered = report.delivered(),
        failed = report.failed(),
        skipped = report.skipped(),
        "Order notifications finished"
    );

    Ok(Json(OrderAccepted {
        ok: true,
        order_id: order.id().cloned(),
    }))
}
