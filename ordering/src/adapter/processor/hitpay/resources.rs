use serde::{Deserialize, Serialize};

pub(super) const RESOURCE_PATH_PAYMENT_REQUESTS: &str = "/v1/payment-requests";
pub(super) const PAYMENT_PURPOSE: &str = "Speedy Xpress Delivery";
pub(super) const PAYMENT_METHOD_PAYNOW: &str = "paynow_online";

#[derive(Serialize)]
pub(super) struct PaymentAddress {
    pub line1: String,
    pub line2: String,
    pub postal_code: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

impl PaymentAddress {
    /// the sender address arrives as one comma-joined line, the last
    /// segment is the postal code, the one before it the unit / level,
    /// everything in front stays the street line
    pub(super) fn from_single_line(addr: &str) -> Self {
        let mut parts = addr
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>();
        let postal_code = parts.pop().unwrap_or("").to_string();
        let line2 = parts.pop().unwrap_or("").to_string();
        let line1 = parts.join(", ");
        Self {
            line1,
            line2,
            postal_code,
            city: "Singapore".to_string(),
            state: "Singapore".to_string(),
            country: "SG".to_string(),
        }
    }
}

#[derive(Serialize)]
pub(super) struct CreatePaymentRequest {
    pub amount: String,
    pub currency: String,
    pub payment_methods: Vec<String>,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub purpose: String,
    // the full order UUID, echoed back in the webhook so the payment can
    // be matched to the local order
    pub reference_number: String,
    pub redirect_url: String,
    pub webhook: String,
    pub allow_repeated_payments: bool,
    pub send_email: bool,
    pub send_sms: bool,
    pub address: PaymentAddress,
}

#[derive(Deserialize)]
pub(super) struct PaymentRequestObject {
    pub id: String,
    pub url: String,
    #[allow(dead_code)]
    pub status: Option<String>,
}
