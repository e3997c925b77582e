use actix_web::http::header::ContentType;
use actix_web::web::{Bytes, Data as WebData};
use actix_web::{rt, HttpResponse, Result as ActixResult};

use delivery_common::logging::{app_log_event, AppLogLevel};

use super::dto::{WebhookAckDto, WebhookErrorDto};
use super::resp_repo_init_failure;
use crate::adapter::repository::app_repo_order;
use crate::model::OrderStatus;
use crate::usecase::{
    PaymentWebhookUcError, PaymentWebhookUseCase, ShipmentJobResult, ShipmentJobUcError,
    ShipmentJobUseCase, WebhookOutcome,
};
use crate::AppSharedState;

fn resp_ack() -> HttpResponse {
    let body = serde_json::to_vec(&WebhookAckDto { success: true }).unwrap();
    HttpResponse::Ok()
        .append_header(ContentType::json())
        .body(body)
}

fn resp_error(status_5xx: bool, detail: &str) -> HttpResponse {
    let body = serde_json::to_vec(&WebhookErrorDto {
        error: detail.to_string(),
    })
    .unwrap();
    let mut builder = if status_5xx {
        HttpResponse::InternalServerError()
    } else {
        HttpResponse::BadRequest()
    };
    builder.append_header(ContentType::json()).body(body)
}

pub(super) async fn payment_webhook(
    raw_body: Bytes,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let logctx = shr_state.log_context();
    let logctx_p = &logctx;
    app_log_event!(logctx_p, AppLogLevel::DEBUG, "payment-webhook-api");

    let repo = match app_repo_order(shr_state.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx_p, AppLogLevel::ERROR, "repo-init-error {:?}", e);
            return Ok(resp_repo_init_failure());
        }
    };
    let uc = PaymentWebhookUseCase {
        auth: shr_state.webhook_auth(),
        repo,
    };
    let resp = match uc.execute(raw_body.as_ref()).await {
        Ok(outcome) => {
            if outcome.requires_follow_up() {
                if !outcome.first_transition {
                    // the provider may redeliver a paid event, shipment
                    // creation is re-entered and skips already-assigned jobs
                    let oid = outcome.order_id.as_str();
                    app_log_event!(logctx_p, AppLogLevel::INFO, "redelivered-event order:{oid}");
                }
                spawn_shipment_follow_up(shr_state.into_inner().as_ref().clone(), outcome);
            }
            // the provider only needs the acknowledgement, shipment creation
            // must never delay or fail this response
            resp_ack()
        }
        Err(uce) => match uce {
            PaymentWebhookUcError::MalformedBody(detail) => {
                app_log_event!(logctx_p, AppLogLevel::WARNING, "malformed-body {detail}");
                resp_error(false, "malformed body")
            }
            PaymentWebhookUcError::SignatureRejected(e) => {
                app_log_event!(logctx_p, AppLogLevel::WARNING, "bad-signature {:?}", e);
                resp_error(false, e.client_detail())
            }
            PaymentWebhookUcError::MissingField(name) => {
                app_log_event!(logctx_p, AppLogLevel::WARNING, "missing-field {name}");
                resp_error(false, "missing field")
            }
            PaymentWebhookUcError::OrderNotFound(oid) => {
                // a valid signature naming an unknown order points at data
                // loss on our side, not at the caller
                app_log_event!(logctx_p, AppLogLevel::ERROR, "order-not-found {oid}");
                resp_error(true, "order not found")
            }
            PaymentWebhookUcError::DataStoreError(e) => {
                app_log_event!(logctx_p, AppLogLevel::ERROR, "{:?}", e);
                resp_error(true, "internal error")
            }
        },
    }; // end of use-case execution
    Ok(resp)
} // end of fn payment_webhook

fn spawn_shipment_follow_up(shr_state: AppSharedState, outcome: WebhookOutcome) {
    rt::spawn(async move {
        let logctx = shr_state.log_context();
        let logctx_p = &logctx;
        let oid = outcome.order_id.as_str();
        let repo = match app_repo_order(shr_state.datastore()).await {
            Ok(v) => v,
            Err(e) => {
                app_log_event!(logctx_p, AppLogLevel::ERROR, "repo-init-error {:?}", e);
                return;
            }
        };
        if outcome.is_bulk_order {
            if let Err(e) = repo.update_parcel_statuses(oid, &OrderStatus::Paid).await {
                app_log_event!(logctx_p, AppLogLevel::ERROR, "order:{oid}, {:?}", e);
            }
        }
        let uc = ShipmentJobUseCase {
            processors: shr_state.processor_context(),
            repo,
            logctx: logctx.clone(),
        };
        match uc.execute(oid).await {
            Ok(ShipmentJobResult::Single(jid)) => {
                app_log_event!(logctx_p, AppLogLevel::INFO, "order:{oid}, job:{jid}");
            }
            Ok(ShipmentJobResult::AlreadyExists(jid)) => {
                app_log_event!(logctx_p, AppLogLevel::INFO, "order:{oid}, existing-job:{jid}");
            }
            Ok(ShipmentJobResult::Bulk {
                job_ids,
                num_failures,
            }) => {
                app_log_event!(
                    logctx_p,
                    AppLogLevel::INFO,
                    "order:{oid}, jobs:{}, failures:{num_failures}",
                    job_ids.len()
                );
            }
            Err(ShipmentJobUcError::NotConfigured) => {
                app_log_event!(logctx_p, AppLogLevel::WARNING, "order:{oid}, delivery-disabled");
            }
            Err(e) => {
                app_log_event!(logctx_p, AppLogLevel::ERROR, "order:{oid}, {:?}", e);
            }
        }
    });
} // end of fn spawn_shipment_follow_up
