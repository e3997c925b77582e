mod resources;

use std::boxed::Box;
use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{FixedOffset, Utc};
use http_body_util::{Empty, Full};
use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use hyper::Method;
use serde::Deserialize;
use tokio_native_tls::{native_tls, TlsConnector as TlsConnectorWrapper};

use delivery_common::confidentiality::AbstractConfidentiality;
use delivery_common::config::App3rdPartyCfg;
use delivery_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use self::resources::{
    CreatedJobEnvelope, DeliveryJobItemReq, DeliveryJobReq, JobDetailEnvelope, JobEnvelope,
    RESOURCE_PATH_JOBS,
};
use super::base_client::{BaseClient, BaseClientError, BaseClientErrorReason};
use super::{
    AppDeliveryJobResult, AppProcessorError, AppProcessorErrorReason, AppProcessorFnLabel,
    DeliveryJobPlan,
};
use crate::model::{DeliveryJobSnapshot, DeliveryMethod};

const HEADER_NAME_API_KEY: &str = "X-API-KEY";
const JOB_TYPE_DELIVERY: &str = "Delivery";

#[allow(non_snake_case)]
#[derive(Deserialize)]
struct DetrackSecret {
    API_KEY: String,
}

#[async_trait]
pub(super) trait AbstDetrackContext: Send + Sync {
    fn configured(&self) -> bool;

    async fn create_job(
        &self,
        plan: &DeliveryJobPlan,
    ) -> Result<AppDeliveryJobResult, AppProcessorErrorReason>;

    async fn fetch_job(
        &self,
        do_number: &str,
    ) -> Result<Option<DeliveryJobSnapshot>, AppProcessorErrorReason>;
}

// delivery jobs are stamped with the provider's local business date
fn singapore_date_stamp() -> String {
    let tz = FixedOffset::east_opt(8 * 3600).unwrap();
    Utc::now().with_timezone(&tz).format("%Y-%m-%d").to_string()
}

pub(super) struct AppProcessorDetrackCtx {
    cfg: Arc<App3rdPartyCfg>,
    secure_connector: TlsConnectorWrapper,
    api_key: String,
    logctx: Arc<AppLogContext>,
}

impl AppProcessorDetrackCtx {
    pub(super) fn try_build(
        cfg: Arc<App3rdPartyCfg>,
        cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
        logctx: Arc<AppLogContext>,
    ) -> Result<Box<dyn AbstDetrackContext>, AppProcessorError> {
        let serial = cfdntl
            .try_get_payload(cfg.confidentiality_path.as_str())
            .map_err(|_e| AppProcessorError {
                reason: AppProcessorErrorReason::MissingCredential,
                fn_label: AppProcessorFnLabel::TryBuild,
            })?;
        let secret =
            serde_json::from_str::<DetrackSecret>(serial.as_str()).map_err(|_e| {
                AppProcessorError {
                    reason: AppProcessorErrorReason::CredentialCorrupted,
                    fn_label: AppProcessorFnLabel::TryBuild,
                }
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
            logctx,
        };
        Ok(Box::new(obj))
    } // end of fn try_build

    fn auth_headers(&self) -> Result<Vec<(HeaderName, HeaderValue)>, AppProcessorErrorReason> {
        let key_value = HeaderValue::from_str(self.api_key.as_str())
            .map_err(|_e| AppProcessorErrorReason::CredentialCorrupted)?;
        Ok(vec![
            (
                HeaderName::from_bytes(HEADER_NAME_API_KEY.as_bytes()).unwrap(),
                key_value,
            ),
            (ACCEPT, HeaderValue::from_static("application/json")),
            (CONTENT_TYPE, HeaderValue::from_static("application/json")),
        ])
    }

    fn job_request_from_plan(&self, plan: &DeliveryJobPlan) -> DeliveryJobReq {
        let date_stamp = singapore_date_stamp();
        let first_parcel = plan.parcels.first().cloned().unwrap_or_default();
        let items = plan
            .parcels
            .iter()
            .enumerate()
            .map(|(idx, p)| DeliveryJobItemReq {
                description: format!("Parcel {}", idx + 1),
                quantity: 1,
                weight: p.weight,
            })
            .collect();
        let (instructions, service_type) = match plan.delivery_method {
            DeliveryMethod::Atl => ("Delivery Method: Authorized to Leave", "Standard"),
            DeliveryMethod::HandToHand => ("Delivery Method: Hand to Hand", "Premium"),
        };
        DeliveryJobReq {
            job_type: JOB_TYPE_DELIVERY.to_string(),
            do_number: plan.do_number.clone(),
            date: date_stamp.clone(),
            start_date: date_stamp,
            address: plan.recipient.contact.address.clone(),
            order_number: plan.order_number.clone(),
            tracking_number: plan.do_number.clone(),
            deliver_to_collect_from: plan.recipient.contact.name.clone(),
            phone_number: plan.recipient.contact.contact_number.clone(),
            notify_email: plan.recipient.contact.email.clone(),
            address_1: plan.recipient.line1.clone(),
            address_2: plan.recipient.line2.clone().unwrap_or_default(),
            postal_code: plan.recipient.postal_code.clone(),
            pick_up_from: plan.sender.name.clone(),
            pick_up_address: plan.sender.address.clone(),
            pick_up_contact: plan.sender.contact_number.clone(),
            pick_up_email: plan.sender.email.clone(),
            sender_name: plan.sender.name.clone(),
            sender_phone_number: plan.sender.contact_number.clone(),
            weight: first_parcel.weight,
            parcel_length: first_parcel.length,
            parcel_width: first_parcel.width,
            parcel_height: first_parcel.height,
            instructions: instructions.to_string(),
            service_type: service_type.to_string(),
            webhook_url: String::new(),
            items,
        }
    } // end of fn job_request_from_plan
} // end of impl AppProcessorDetrackCtx

#[async_trait]
impl AbstDetrackContext for AppProcessorDetrackCtx {
    fn configured(&self) -> bool {
        true
    }

    async fn create_job(
        &self,
        plan: &DeliveryJobPlan,
    ) -> Result<AppDeliveryJobResult, AppProcessorErrorReason> {
        let logctx_p = &self.logctx;
        let envelope = JobEnvelope {
            data: self.job_request_from_plan(plan),
        };
        let raw_body = serde_json::to_vec(&envelope)
            .map_err(|e| AppProcessorErrorReason::InvalidResponse(e.to_string()))?;
        let mut client = BaseClient::<Full<Bytes>>::try_build(
            self.logctx.clone(),
            &self.secure_connector,
            self.cfg.host.clone(),
            self.cfg.port,
        )
        .await
        .map_err(AppProcessorErrorReason::from)?;
        let (raw_resp, status) = client
            .execute_form(
                RESOURCE_PATH_JOBS,
                Method::POST,
                Full::new(Bytes::from(raw_body)),
                self.auth_headers()?,
            )
            .await
            .map_err(AppProcessorErrorReason::from)?;
        if !status.is_success() {
            let detail = String::from_utf8_lossy(&raw_resp).to_string();
            app_log_event!(
                logctx_p,
                AppLogLevel::ERROR,
                "delivery-job-rejected, do:{}, status:{}",
                plan.do_number.as_str(),
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
        let resp_obj = serde_json::from_slice::<CreatedJobEnvelope>(&raw_resp)
            .map_err(|e| AppProcessorErrorReason::InvalidResponse(e.to_string()))?;
        let item_ids = resp_obj
            .data
            .items
            .into_iter()
            .filter_map(|i| i.id)
            .collect();
        Ok(AppDeliveryJobResult {
            job_id: resp_obj.data.id,
            item_ids,
        })
    } // end of fn create_job

    async fn fetch_job(
        &self,
        do_number: &str,
    ) -> Result<Option<DeliveryJobSnapshot>, AppProcessorErrorReason> {
        let mut client = BaseClient::<Empty<Bytes>>::try_build(
            self.logctx.clone(),
            &self.secure_connector,
            self.cfg.host.clone(),
            self.cfg.port,
        )
        .await
        .map_err(AppProcessorErrorReason::from)?;
        let path = format!("{RESOURCE_PATH_JOBS}/{do_number}");
        let (raw_resp, status) = client
            .execute(path.as_str(), Method::GET, self.auth_headers()?)
            .await
            .map_err(AppProcessorErrorReason::from)?;
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            let detail = String::from_utf8_lossy(&raw_resp).to_string();
            let e = BaseClientError {
                reason: BaseClientErrorReason::DeserialiseFailure(
                    Box::new(detail),
                    status.as_u16(),
                ),
            };
            return Err(AppProcessorErrorReason::LowLvlNet(e));
        }
        let resp_obj = serde_json::from_slice::<JobDetailEnvelope>(&raw_resp)
            .map_err(|e| AppProcessorErrorReason::InvalidResponse(e.to_string()))?;
        Ok(resp_obj.data.map(DeliveryJobSnapshot::from))
    } // end of fn fetch_job
} // end of impl AppProcessorDetrackCtx

/// stand-in used when delivery credentials are absent, paid orders then
/// stay without shipment jobs until the credentials are provisioned
pub(super) struct DisabledDetrackCtx;

impl DisabledDetrackCtx {
    pub(super) fn build() -> Box<dyn AbstDetrackContext> {
        Box::new(Self)
    }
}

#[async_trait]
impl AbstDetrackContext for DisabledDetrackCtx {
    fn configured(&self) -> bool {
        false
    }

    async fn create_job(
        &self,
        _plan: &DeliveryJobPlan,
    ) -> Result<AppDeliveryJobResult, AppProcessorErrorReason> {
        Err(AppProcessorErrorReason::NotConfigured)
    }

    async fn fetch_job(
        &self,
        _do_number: &str,
    ) -> Result<Option<DeliveryJobSnapshot>, AppProcessorErrorReason> {
        Err(AppProcessorErrorReason::NotConfigured)
    }
}
