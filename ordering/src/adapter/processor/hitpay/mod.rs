mod resources;

use std::boxed::Box;
use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use hyper::Method;
use serde::Deserialize;
use tokio_native_tls::{native_tls, TlsConnector as TlsConnectorWrapper};

use delivery_common::confidentiality::AbstractConfidentiality;
use delivery_common::config::App3rdPartyCfg;
use delivery_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use self::resources::{
    CreatePaymentRequest, PaymentAddress, PaymentRequestObject, PAYMENT_METHOD_PAYNOW,
    PAYMENT_PURPOSE, RESOURCE_PATH_PAYMENT_REQUESTS,
};
use super::base_client::{BaseClient, BaseClientError, BaseClientErrorReason};
use super::{AppProcessorError, AppProcessorErrorReason, AppProcessorFnLabel};
use crate::model::OrderModel;

const HEADER_NAME_API_KEY: &str = "X-BUSINESS-API-KEY";
const PAYMENT_CURRENCY: &str = "SGD";

#[allow(non_snake_case)]
#[derive(Deserialize)]
struct HitpaySecret {
    API_KEY: String,
}

#[async_trait]
pub(super) trait AbstHitpayContext: Send + Sync {
    async fn pay_in_start(
        &self,
        order: &OrderModel,
    ) -> Result<super::AppProcessorPayInResult, AppProcessorErrorReason>;
}

pub(super) struct AppProcessorHitpayCtx {
    cfg: Arc<App3rdPartyCfg>,
    secure_connector: TlsConnectorWrapper,
    api_key: String,
    site_base_url: String,
    logctx: Arc<AppLogContext>,
}

impl AppProcessorHitpayCtx {
    pub(super) fn try_build(
        cfg: Arc<App3rdPartyCfg>,
        site_base_url: &str,
        cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
        logctx: Arc<AppLogContext>,
    ) -> Result<Box<dyn AbstHitpayContext>, AppProcessorError> {
        let serial = cfdntl
            .try_get_payload(cfg.confidentiality_path.as_str())
            .map_err(|_e| AppProcessorError {
                reason: AppProcessorErrorReason::MissingCredential,
                fn_label: AppProcessorFnLabel::TryBuild,
            })?;
        let secret =
            serde_json::from_str::<HitpaySecret>(serial.as_str()).map_err(|_e| AppProcessorError {
                reason: AppProcessorErrorReason::CredentialCorrupted,
                fn_label: AppProcessorFnLabel::TryBuild,
            })?;
        let secure_connector = {
            let mut builder = native_tls::TlsConnector::builder();
            builder.min_protocol_version(Some(native_tls::Protocol::Tlsv12));
            let c = builder.build().map_err(|e| AppProcessorError {
                reason: AppProcessorErrorReason::LowLvlNet(BaseClientError { reason: e.into() }),
                fn_label: AppProcessorFnLabel::TryBuild,
            })?;
            c.into()
        };
        let obj = Self {
            cfg,
            secure_connector,
            api_key: secret.API_KEY,
            site_base_url: site_base_url.trim_end_matches('/').to_string(),
            logctx,
        };
        Ok(Box::new(obj))
    } // end of fn try_build
} // end of impl AppProcessorHitpayCtx

#[async_trait]
impl AbstHitpayContext for AppProcessorHitpayCtx {
    async fn pay_in_start(
        &self,
        order: &OrderModel,
    ) -> Result<super::AppProcessorPayInResult, AppProcessorErrorReason> {
        let logctx_p = &self.logctx;
        let body_obj = CreatePaymentRequest {
            amount: order.amount.to_string(),
            currency: PAYMENT_CURRENCY.to_string(),
            payment_methods: vec![PAYMENT_METHOD_PAYNOW.to_string()],
            email: order.sender.email.clone(),
            name: order.sender.name.clone(),
            phone: order.sender.contact_number.clone(),
            purpose: PAYMENT_PURPOSE.to_string(),
            reference_number: order.id.clone(),
            redirect_url: format!(
                "{}/payment/success?order={}",
                self.site_base_url, order.id
            ),
            webhook: format!("{}/api/hitpay/webhook", self.site_base_url),
            allow_repeated_payments: false,
            send_email: true,
            send_sms: false,
            address: PaymentAddress::from_single_line(order.sender.address.as_str()),
        };
        let raw_body = serde_json::to_vec(&body_obj)
            .map_err(|e| AppProcessorErrorReason::InvalidResponse(e.to_string()))?;
        let mut client = BaseClient::<Full<Bytes>>::try_build(
            self.logctx.clone(),
            &self.secure_connector,
            self.cfg.host.clone(),
            self.cfg.port,
        )
        .await
        .map_err(AppProcessorErrorReason::from)?;
        let headers = vec![
            (
                HeaderName::from_bytes(HEADER_NAME_API_KEY.as_bytes()).unwrap(),
                HeaderValue::from_str(self.api_key.as_str()).map_err(|_e| {
                    AppProcessorErrorReason::CredentialCorrupted
                })?,
            ),
            (ACCEPT, HeaderValue::from_static("application/json")),
            (CONTENT_TYPE, HeaderValue::from_static("application/json")),
        ];
        let (raw_resp, status) = client
            .execute_form(
                RESOURCE_PATH_PAYMENT_REQUESTS,
                Method::POST,
                Full::new(Bytes::from(raw_body)),
                headers,
            )
            .await
            .map_err(AppProcessorErrorReason::from)?;
        if !status.is_success() {
            let detail = String::from_utf8_lossy(&raw_resp).to_string();
            app_log_event!(
                logctx_p,
                AppLogLevel::ERROR,
                "payment-request-rejected, order:{}, status:{}",
                order.id.as_str(),
                status.as_u16()
            );
            let e = BaseClientError {
                reason: BaseClientErrorReason::DeserialiseFailure(
                    Box::new(detail),
                    status.as_u16(),
                ),
            };
            return Err(AppProcessorErrorReason::LowLvlNet(e));
        }
        let resp_obj = serde_json::from_slice::<PaymentRequestObject>(&raw_resp)
            .map_err(|e| AppProcessorErrorReason::InvalidResponse(e.to_string()))?;
        Ok(super::AppProcessorPayInResult {
            request_id: resp_obj.id,
            payment_url: resp_obj.url,
        })
    } // end of fn pay_in_start
} // end of impl AppProcessorHitpayCtx
