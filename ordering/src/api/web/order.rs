use actix_web::http::header::ContentType;
use actix_web::web::{Data as WebData, Json as ExtJson};
use actix_web::{HttpResponse, Result as ActixResult};

use delivery_common::logging::{app_log_event, AppLogLevel};

use super::dto::{OrderCreateReqDto, OrderCreateRespDto};
use super::resp_repo_init_failure;
use crate::adapter::repository::app_repo_order;
use crate::usecase::{OrderCreateUcError, OrderCreateUseCase};
use crate::AppSharedState;

pub(super) async fn create_order(
    req_body: ExtJson<OrderCreateReqDto>,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let logctx = shr_state.log_context();
    let logctx_p = &logctx;
    app_log_event!(logctx_p, AppLogLevel::DEBUG, "create-order-api");

    let repo = match app_repo_order(shr_state.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx_p, AppLogLevel::ERROR, "repo-init-error {:?}", e);
            return Ok(resp_repo_init_failure());
        }
    };
    let uc = OrderCreateUseCase {
        repo,
        processors: shr_state.processor_context(),
    };
    let resp = match uc.execute(req_body.into_inner()).await {
        Ok(v) => {
            let body = OrderCreateRespDto {
                order_id: v.order_id,
                amount: v.amount.to_string(),
                payment_url: v.payment_url,
            };
            let body_serial = serde_json::to_vec(&body).unwrap();
            HttpResponse::Created()
                .append_header(ContentType::json())
                .body(body_serial)
        }
        Err(uce) => match uce {
            OrderCreateUcError::ClientBadRequest(e) => {
                let body = serde_json::to_vec(&e).unwrap();
                HttpResponse::BadRequest()
                    .append_header(ContentType::json())
                    .body(body)
            }
            OrderCreateUcError::ExternalProcessorError(e, oid) => {
                // the pending order survives, only the payment session failed
                app_log_event!(logctx_p, AppLogLevel::ERROR, "order:{oid}, {:?}", e);
                HttpResponse::BadGateway().finish()
            }
            OrderCreateUcError::DataStoreError(e) => {
                app_log_event!(logctx_p, AppLogLevel::ERROR, "{:?}", e);
                HttpResponse::InternalServerError().finish()
            }
        },
    }; // end of use-case execution
    Ok(resp)
} // end of fn create_order
