use std::boxed::Box;
use std::collections::HashMap;
use std::sync::Arc;

use crate::adapter::repository::{AbstractOrderRepo, AppRepoError};
use crate::auth::{AppWebhookAuth, WebhookAuthError};
use crate::model::OrderStatus;

#[derive(Debug)]
pub enum PaymentWebhookUcError {
    MalformedBody(String),          // status code 400
    SignatureRejected(WebhookAuthError), // status code 400
    MissingField(&'static str),     // status code 400
    OrderNotFound(String),          // status code 500, surfaced not swallowed
    DataStoreError(AppRepoError),   // status code 500
}

impl From<AppRepoError> for PaymentWebhookUcError {
    fn from(value: AppRepoError) -> Self {
        Self::DataStoreError(value)
    }
}

/// what the webhook endpoint needs to know after the synchronous part of
/// processing, the paid-order follow-up runs detached from the response
pub struct WebhookOutcome {
    pub order_id: String,
    pub status: OrderStatus,
    pub is_bulk_order: bool,
    pub first_transition: bool,
}

impl WebhookOutcome {
    pub fn requires_follow_up(&self) -> bool {
        matches!(self.status, OrderStatus::Paid)
    }
}

pub struct PaymentWebhookUseCase {
    pub auth: Arc<AppWebhookAuth>,
    pub repo: Box<dyn AbstractOrderRepo>,
}

impl PaymentWebhookUseCase {
    pub async fn execute(&self, raw_body: &[u8]) -> Result<WebhookOutcome, PaymentWebhookUcError> {
        let fields = serde_qs::from_bytes::<HashMap<String, String>>(raw_body)
            .map_err(|e| PaymentWebhookUcError::MalformedBody(e.to_string()))?;
        self.auth
            .verify(&fields)
            .map_err(PaymentWebhookUcError::SignatureRejected)?;
        let reference = fields
            .get("reference_number")
            .filter(|v| !v.is_empty())
            .ok_or(PaymentWebhookUcError::MissingField("reference_number"))?;
        let status_raw = fields
            .get("status")
            .filter(|v| !v.is_empty())
            .ok_or(PaymentWebhookUcError::MissingField("status"))?;
        let status = OrderStatus::from_provider(status_raw.as_str());
        let order = self
            .repo
            .fetch_order(reference.as_str())
            .await?
            .ok_or_else(|| PaymentWebhookUcError::OrderNotFound(reference.clone()))?;
        // zero rows changed means the provider re-delivered an event the
        // order already absorbed
        let first_transition = self
            .repo
            .update_order_status(reference.as_str(), &status)
            .await?;
        Ok(WebhookOutcome {
            order_id: order.id,
            status,
            is_bulk_order: order.is_bulk_order,
            first_transition,
        })
    } // end of fn execute
} // end of impl PaymentWebhookUseCase
