use std::boxed::Box;
use std::sync::{Arc, Mutex};

use hmac::{Hmac, Mac};
use sha2::Sha256;

use delivery_common::confidentiality::AbstractConfidentiality;
use delivery_common::error::AppConfidentialityError;

use ordering::auth::{AppWebhookAuth, WebhookAuthError};
use ordering::model::OrderStatus;
use ordering::usecase::{PaymentWebhookUcError, PaymentWebhookUseCase};

use super::{ut_order, MockOrderRepo};

const UT_SALT: &str = "ut-webhook-salt-1927";
const UT_ORDER_ID: &str = "a1b2c3d4-e5f6-7a8b-9c0d-e1f2a3b4c5d6";

struct MockConfidential;

impl AbstractConfidentiality for MockConfidential {
    fn try_get_payload(&self, _id: &str) -> Result<String, AppConfidentialityError> {
        Ok(format!("\"{UT_SALT}\""))
    }
}

fn ut_auth() -> Arc<AppWebhookAuth> {
    let cfdntl: Arc<Box<dyn AbstractConfidentiality>> = Arc::new(Box::new(MockConfidential));
    Arc::new(AppWebhookAuth::try_build(cfdntl, "hitpay/WEBHOOK_SALT").unwrap())
}

// payload is every field except `hmac`, sorted by key, key directly
// followed by value
fn ut_sign(fields: &[(&str, &str)]) -> String {
    let mut sorted = fields.to_vec();
    sorted.sort_by_key(|(k, _v)| *k);
    let payload = sorted
        .iter()
        .fold(String::new(), |acc, (k, v)| acc + k + v);
    let mut mac = Hmac::<Sha256>::new_from_slice(UT_SALT.as_bytes()).unwrap();
    mac.update(payload.as_bytes());
    mac.finalize()
        .into_bytes()
        .iter()
        .fold(String::new(), |acc, b| acc + &format!("{b:02x}"))
}

fn ut_form_body(fields: &[(&str, &str)], signature: Option<&str>) -> Vec<u8> {
    let mut pairs = fields
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>();
    if let Some(sig) = signature {
        pairs.push(format!("hmac={sig}"));
    }
    pairs.join("&").into_bytes()
}

#[actix_web::test]
async fn completed_event_marks_order_paid() {
    let mut order = ut_order(UT_ORDER_ID, false);
    order.status = OrderStatus::Pending;
    let repo = MockOrderRepo {
        _fetch_order_result: Mutex::new(Some(Ok(Some(order)))),
        _update_order_status_result: Mutex::new(Some(Ok(true))),
        ..Default::default()
    };
    let status_seen = repo._update_order_status_seen.clone();
    let uc = PaymentWebhookUseCase {
        auth: ut_auth(),
        repo: Box::new(repo),
    };
    let fields = [
        ("amount", "25.50"),
        ("reference_number", UT_ORDER_ID),
        ("status", "completed"),
    ];
    let sig = ut_sign(&fields);
    let body = ut_form_body(&fields, Some(sig.as_str()));
    let out = uc.execute(body.as_slice()).await.unwrap();
    assert_eq!(out.order_id.as_str(), UT_ORDER_ID);
    assert_eq!(out.status, OrderStatus::Paid);
    assert!(out.first_transition);
    assert!(out.requires_follow_up());
    let seen = status_seen.lock().unwrap();
    assert_eq!(seen.as_slice(), &[(UT_ORDER_ID.to_string(), "paid".to_string())]);
}

#[actix_web::test]
async fn provider_status_case_insensitive() {
    let repo = MockOrderRepo {
        _fetch_order_result: Mutex::new(Some(Ok(Some(ut_order(UT_ORDER_ID, false))))),
        _update_order_status_result: Mutex::new(Some(Ok(true))),
        ..Default::default()
    };
    let uc = PaymentWebhookUseCase {
        auth: ut_auth(),
        repo: Box::new(repo),
    };
    let fields = [("reference_number", UT_ORDER_ID), ("status", "Completed")];
    let sig = ut_sign(&fields);
    let body = ut_form_body(&fields, Some(sig.as_str()));
    let out = uc.execute(body.as_slice()).await.unwrap();
    assert_eq!(out.status, OrderStatus::Paid);
}

#[actix_web::test]
async fn replayed_event_not_first_transition() {
    let repo = MockOrderRepo {
        _fetch_order_result: Mutex::new(Some(Ok(Some(ut_order(UT_ORDER_ID, false))))),
        _update_order_status_result: Mutex::new(Some(Ok(false))),
        ..Default::default()
    };
    let uc = PaymentWebhookUseCase {
        auth: ut_auth(),
        repo: Box::new(repo),
    };
    let fields = [("reference_number", UT_ORDER_ID), ("status", "completed")];
    let sig = ut_sign(&fields);
    let body = ut_form_body(&fields, Some(sig.as_str()));
    let out = uc.execute(body.as_slice()).await.unwrap();
    assert!(!out.first_transition);
    // a redelivered paid event still drives shipment creation, the job
    // layer skips parcels that already carry an assigned job id
    assert!(out.requires_follow_up());
}

#[actix_web::test]
async fn missing_signature_rejected_without_mutation() {
    let repo = MockOrderRepo::default();
    let status_seen = repo._update_order_status_seen.clone();
    let uc = PaymentWebhookUseCase {
        auth: ut_auth(),
        repo: Box::new(repo),
    };
    let fields = [("reference_number", UT_ORDER_ID), ("status", "completed")];
    let body = ut_form_body(&fields, None);
    let out = uc.execute(body.as_slice()).await;
    assert!(matches!(
        out.err().unwrap(),
        PaymentWebhookUcError::SignatureRejected(WebhookAuthError::MissingSignature)
    ));
    assert!(status_seen.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn tampered_field_rejected() {
    let uc = PaymentWebhookUseCase {
        auth: ut_auth(),
        repo: Box::new(MockOrderRepo::default()),
    };
    let signed = [("reference_number", UT_ORDER_ID), ("status", "failed")];
    let sig = ut_sign(&signed);
    // attacker flips the status after signing
    let tampered = [("reference_number", UT_ORDER_ID), ("status", "completed")];
    let body = ut_form_body(&tampered, Some(sig.as_str()));
    let out = uc.execute(body.as_slice()).await;
    assert!(matches!(
        out.err().unwrap(),
        PaymentWebhookUcError::SignatureRejected(WebhookAuthError::Mismatch)
    ));
}

#[actix_web::test]
async fn missing_reference_number_rejected() {
    let uc = PaymentWebhookUseCase {
        auth: ut_auth(),
        repo: Box::new(MockOrderRepo::default()),
    };
    let fields = [("amount", "25.50"), ("status", "completed")];
    let sig = ut_sign(&fields);
    let body = ut_form_body(&fields, Some(sig.as_str()));
    let out = uc.execute(body.as_slice()).await;
    assert!(matches!(
        out.err().unwrap(),
        PaymentWebhookUcError::MissingField("reference_number")
    ));
}

#[actix_web::test]
async fn unknown_order_surfaced() {
    let repo = MockOrderRepo {
        _fetch_order_result: Mutex::new(Some(Ok(None))),
        ..Default::default()
    };
    let uc = PaymentWebhookUseCase {
        auth: ut_auth(),
        repo: Box::new(repo),
    };
    let fields = [("reference_number", UT_ORDER_ID), ("status", "completed")];
    let sig = ut_sign(&fields);
    let body = ut_form_body(&fields, Some(sig.as_str()));
    let out = uc.execute(body.as_slice()).await;
    assert!(matches!(
        out.err().unwrap(),
        PaymentWebhookUcError::OrderNotFound(_)
    ));
}
