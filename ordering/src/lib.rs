pub mod adapter;
pub mod api;
pub mod auth;
pub mod model;
pub mod network;
pub mod usecase;

use std::result::Result;
use std::sync::Arc;

use delivery_common::confidentiality::{self, AbstractConfidentiality};
use delivery_common::config::AppConfig;
use delivery_common::error::AppConfidentialityError;
use delivery_common::logging::AppLogContext;

use crate::adapter::datastore::{AppDStoreError, AppDataStoreContext};
use crate::adapter::processor::{
    app_processor_context, AbstractOrderProcessor, AppProcessorError,
};
use crate::auth::{AppWebhookAuth, WebhookAuthError};

pub mod hard_limit {
    pub const MAX_DB_CONNECTIONS: u32 = 1800u32;
    pub const MAX_SECONDS_DB_IDLE: u16 = 360u16;
    pub const MAX_ITEMS_PER_INMEM_TABLE: u32 = 2200u32;
}

// the payment provider signs webhook payloads with a separate salt, it
// lives next to the API key under the provider's confidentiality path
const WEBHOOK_SALT_SUBPATH: &str = "/WEBHOOK_SALT";
const PAYMENT_PROVIDER_ALIAS: &str = "hitpay";

pub struct AppSharedState {
    _config: Arc<AppConfig>,
    _log_ctx: Arc<AppLogContext>,
    _dstore: Arc<AppDataStoreContext>,
    _processors: Arc<Box<dyn AbstractOrderProcessor>>,
    _webhook_auth: Arc<AppWebhookAuth>,
}

#[derive(Debug)]
pub enum ShrStateInitProgress {
    Confidentiality,
    DataStore,
    ExternalProcessor,
    WebhookAuth,
}

#[derive(Debug)]
pub struct ShrStateInitError {
    pub progress: ShrStateInitProgress,
}
impl From<AppConfidentialityError> for ShrStateInitError {
    fn from(_value: AppConfidentialityError) -> Self {
        Self {
            progress: ShrStateInitProgress::Confidentiality,
        }
    }
}
impl From<AppDStoreError> for ShrStateInitError {
    fn from(_value: AppDStoreError) -> Self {
        Self {
            progress: ShrStateInitProgress::DataStore,
        }
    }
}
impl From<AppProcessorError> for ShrStateInitError {
    fn from(_value: AppProcessorError) -> Self {
        Self {
            progress: ShrStateInitProgress::ExternalProcessor,
        }
    }
}
impl From<WebhookAuthError> for ShrStateInitError {
    fn from(_value: WebhookAuthError) -> Self {
        Self {
            progress: ShrStateInitProgress::WebhookAuth,
        }
    }
}

impl AppSharedState {
    pub fn new(cfg: AppConfig) -> Result<Self, ShrStateInitError> {
        let logctx = {
            let lc = AppLogContext::new(&cfg.basepath, &cfg.api_server.logging);
            Arc::new(lc)
        };
        let cfdntl: Arc<Box<dyn AbstractConfidentiality>> = {
            let c = confidentiality::build_context(&cfg)?;
            Arc::new(c)
        };
        let _dstore = {
            let d = AppDataStoreContext::new(
                &cfg.api_server.data_store,
                cfdntl.clone(),
                logctx.clone(),
            )?;
            Arc::new(d)
        };
        let _processors = {
            let proc = app_processor_context(
                &cfg.api_server.third_parties,
                cfg.api_server.site_base_url.as_str(),
                cfdntl.clone(),
                logctx.clone(),
            )?;
            Arc::new(proc)
        };
        let _webhook_auth = {
            let salt_path = cfg
                .api_server
                .third_parties
                .iter()
                .find(|c| c.alias.eq_ignore_ascii_case(PAYMENT_PROVIDER_ALIAS))
                .map(|c| c.confidentiality_path.clone() + WEBHOOK_SALT_SUBPATH)
                .ok_or(ShrStateInitError {
                    progress: ShrStateInitProgress::WebhookAuth,
                })?;
            let a = AppWebhookAuth::try_build(cfdntl, salt_path.as_str())?;
            Arc::new(a)
        };
        Ok(Self {
            _config: Arc::new(cfg),
            _log_ctx: logctx,
            _dstore,
            _processors,
            _webhook_auth,
        })
    } // end of fn new

    pub fn datastore(&self) -> Arc<AppDataStoreContext> {
        self._dstore.clone()
    }
    pub fn processor_context(&self) -> Arc<Box<dyn AbstractOrderProcessor>> {
        self._processors.clone()
    }
    pub fn webhook_auth(&self) -> Arc<AppWebhookAuth> {
        self._webhook_auth.clone()
    }
    pub fn log_context(&self) -> Arc<AppLogContext> {
        self._log_ctx.clone()
    }
    pub fn config(&self) -> Arc<AppConfig> {
        self._config.clone()
    }
} // end of impl AppSharedState

impl Clone for AppSharedState {
    fn clone(&self) -> Self {
        Self {
            _config: self._config.clone(),
            _log_ctx: self._log_ctx.clone(),
            _dstore: self._dstore.clone(),
            _processors: self._processors.clone(),
            _webhook_auth: self._webhook_auth.clone(),
        }
    }
}
