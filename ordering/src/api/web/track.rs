use actix_web::http::header::ContentType;
use actix_web::web::{Data as WebData, Path as ExtPath};
use actix_web::{HttpResponse, Result as ActixResult};

use delivery_common::logging::{app_log_event, AppLogLevel};

use super::dto::TrackingStatusRespDto;
use super::resp_repo_init_failure;
use crate::adapter::repository::app_repo_order;
use crate::usecase::{TrackStatusUcError, TrackStatusUseCase};
use crate::AppSharedState;

pub(super) async fn track_order_status(
    path: ExtPath<String>,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let logctx = shr_state.log_context();
    let logctx_p = &logctx;
    app_log_event!(logctx_p, AppLogLevel::DEBUG, "track-order-status-api");

    let repo = match app_repo_order(shr_state.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx_p, AppLogLevel::ERROR, "repo-init-error {:?}", e);
            return Ok(resp_repo_init_failure());
        }
    };
    let uc = TrackStatusUseCase {
        repo,
        processors: shr_state.processor_context(),
        logctx: logctx.clone(),
    };
    let resp = match uc.execute(path.as_str()).await {
        Ok(Some(view)) => {
            let body = TrackingStatusRespDto::from(view);
            let body_serial = serde_json::to_vec(&body).unwrap();
            HttpResponse::Ok()
                .append_header(ContentType::json())
                .body(body_serial)
        }
        // nothing to show yet, the frontend keeps polling
        Ok(None) => HttpResponse::NoContent().finish(),
        Err(TrackStatusUcError::InvalidReference(raw)) => {
            app_log_event!(logctx_p, AppLogLevel::WARNING, "invalid-reference {raw}");
            HttpResponse::BadRequest().finish()
        }
        Err(TrackStatusUcError::DataStoreError(e)) => {
            app_log_event!(logctx_p, AppLogLevel::ERROR, "{:?}", e);
            HttpResponse::InternalServerError().finish()
        }
    }; // end of use-case execution
    Ok(resp)
} // end of fn track_order_status
