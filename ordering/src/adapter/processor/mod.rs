mod base_client;
mod detrack;
mod hitpay;

use std::boxed::Box;
use std::marker::{Send, Sync};
use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;

use delivery_common::confidentiality::AbstractConfidentiality;
use delivery_common::config::App3rdPartyCfg;
use delivery_common::logging::{app_log_event, AppLogContext, AppLogLevel};

pub use self::base_client::{BaseClientError, BaseClientErrorReason};
use self::detrack::{AbstDetrackContext, AppProcessorDetrackCtx, DisabledDetrackCtx};
use self::hitpay::{AbstHitpayContext, AppProcessorHitpayCtx};
use crate::model::{
    ContactInfoModel, DeliveryJobSnapshot, DeliveryMethod, OrderModel, ParcelDimensions,
    RecipientInfoModel,
};

#[derive(Debug)]
pub enum AppProcessorErrorReason {
    InvalidConfig,
    MissingCredential,
    CredentialCorrupted,
    NotConfigured,
    LowLvlNet(BaseClientError),
    InvalidResponse(String),
}

#[derive(Debug)]
pub enum AppProcessorFnLabel {
    TryBuild,
    PayInStart,
    CreateDeliveryJob,
    FetchDeliveryJob,
}

#[derive(Debug)]
pub struct AppProcessorError {
    pub reason: AppProcessorErrorReason,
    pub fn_label: AppProcessorFnLabel,
}

impl From<BaseClientError> for AppProcessorErrorReason {
    fn from(value: BaseClientError) -> Self {
        Self::LowLvlNet(value)
    }
}

/// outcome of registering a payment request with the provider, the URL
/// is where the customer completes checkout
pub struct AppProcessorPayInResult {
    pub request_id: String,
    pub payment_url: String,
}

/// everything the delivery provider needs to open one job, assembled by
/// the shipment use-case from the order aggregate
pub struct DeliveryJobPlan {
    pub do_number: String,
    pub order_number: String,
    pub sender: ContactInfoModel,
    pub recipient: RecipientInfoModel,
    pub delivery_method: DeliveryMethod,
    pub parcels: Vec<ParcelDimensions>,
}

pub struct AppDeliveryJobResult {
    pub job_id: String,
    pub item_ids: Vec<String>,
}

#[async_trait]
pub trait AbstractOrderProcessor: Send + Sync {
    async fn pay_in_start(
        &self,
        order: &OrderModel,
    ) -> Result<AppProcessorPayInResult, AppProcessorError>;

    fn delivery_configured(&self) -> bool;

    async fn create_delivery_job(
        &self,
        plan: &DeliveryJobPlan,
    ) -> Result<AppDeliveryJobResult, AppProcessorError>;

    async fn fetch_delivery_job(
        &self,
        do_number: &str,
    ) -> Result<Option<DeliveryJobSnapshot>, AppProcessorError>;
}

struct AppProcessorContext {
    _hitpay: Box<dyn AbstHitpayContext>,
    _detrack: Box<dyn AbstDetrackContext>,
    _logctx: Arc<AppLogContext>,
}

impl AppProcessorContext {
    fn new(
        cfgs3pt: &[Arc<App3rdPartyCfg>],
        site_base_url: &str,
        cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
        _logctx: Arc<AppLogContext>,
    ) -> Result<Self, AppProcessorError> {
        let mut result_hitpay = None;
        let mut result_detrack = None;
        for c in cfgs3pt {
            match c.alias.to_lowercase().as_str() {
                "hitpay" if result_hitpay.is_none() => {
                    let ctx = AppProcessorHitpayCtx::try_build(
                        c.clone(),
                        site_base_url,
                        cfdntl.clone(),
                        _logctx.clone(),
                    )?;
                    result_hitpay = Some(ctx);
                }
                "detrack" if result_detrack.is_none() => {
                    // the delivery side may run without credentials, shipment
                    // requests then fail at call time instead of boot time
                    let ctx = match AppProcessorDetrackCtx::try_build(
                        c.clone(),
                        cfdntl.clone(),
                        _logctx.clone(),
                    ) {
                        Ok(v) => v,
                        Err(e) => {
                            app_log_event!(
                                _logctx,
                                AppLogLevel::WARNING,
                                "delivery-provider-disabled, {:?}",
                                e.reason
                            );
                            DisabledDetrackCtx::build()
                        }
                    };
                    result_detrack = Some(ctx);
                }
                _others => {}
            }
        } // end of third-party config loop
        let _hitpay = result_hitpay.ok_or(AppProcessorError {
            reason: AppProcessorErrorReason::InvalidConfig,
            fn_label: AppProcessorFnLabel::TryBuild,
        })?;
        let _detrack = result_detrack.unwrap_or_else(DisabledDetrackCtx::build);
        Ok(Self {
            _hitpay,
            _detrack,
            _logctx,
        })
    } // end of fn new
} // end of impl AppProcessorContext

#[async_trait]
impl AbstractOrderProcessor for AppProcessorContext {
    async fn pay_in_start(
        &self,
        order: &OrderModel,
    ) -> Result<AppProcessorPayInResult, AppProcessorError> {
        self._hitpay
            .pay_in_start(order)
            .await
            .map_err(|reason| AppProcessorError {
                reason,
                fn_label: AppProcessorFnLabel::PayInStart,
            })
    }

    fn delivery_configured(&self) -> bool {
        self._detrack.configured()
    }

    async fn create_delivery_job(
        &self,
        plan: &DeliveryJobPlan,
    ) -> Result<AppDeliveryJobResult, AppProcessorError> {
        self._detrack
            .create_job(plan)
            .await
            .map_err(|reason| AppProcessorError {
                reason,
                fn_label: AppProcessorFnLabel::CreateDeliveryJob,
            })
    }

    async fn fetch_delivery_job(
        &self,
        do_number: &str,
    ) -> Result<Option<DeliveryJobSnapshot>, AppProcessorError> {
        self._detrack
            .fetch_job(do_number)
            .await
            .map_err(|reason| AppProcessorError {
                reason,
                fn_label: AppProcessorFnLabel::FetchDeliveryJob,
            })
    }
} // end of impl AppProcessorContext

pub(crate) fn app_processor_context(
    cfgs3pt: &[Arc<App3rdPartyCfg>],
    site_base_url: &str,
    cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
    logctx: Arc<AppLogContext>,
) -> Result<Box<dyn AbstractOrderProcessor>, AppProcessorError> {
    let proc = AppProcessorContext::new(cfgs3pt, site_base_url, cfdntl, logctx)?;
    Ok(Box::new(proc))
}
