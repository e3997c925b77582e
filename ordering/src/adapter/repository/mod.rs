mod mariadb;

use std::boxed::Box;
use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;

use delivery_common::error::AppErrorCode;

use self::mariadb::MariadbOrderRepo;
use super::datastore::{AppDStoreError, AppDataStoreContext};
use crate::model::{BulkOrderModel, OrderModel, OrderStatus, ParcelModel};

#[derive(Debug, Clone, Copy)]
pub enum AppRepoErrorFnLabel {
    InitRepo,
    CreateOrder,
    FetchOrder,
    FetchParcels,
    UpdateOrderStatus,
    UpdateParcelStatus,
    UpdateShipmentRef,
    ResolveShortId,
}

#[derive(Debug)]
pub enum AppRepoErrorDetail {
    DataStore(AppDStoreError),
    DatabaseTxStart(String),
    DatabaseTxCommit(String),
    DatabaseExec(String),
    DatabaseQuery(String),
    DataRowParse(String),
    Unknown,
}

#[derive(Debug)]
pub struct AppRepoError {
    pub fn_label: AppRepoErrorFnLabel,
    pub code: AppErrorCode,
    pub detail: AppRepoErrorDetail,
}

#[async_trait]
pub trait AbstractOrderRepo: Sync + Send {
    /// persist a pending order together with its parcels, and the bulk-order
    /// aggregate when present, in one transaction
    async fn create_order(
        &self,
        order: &OrderModel,
        parcels: &[ParcelModel],
        bulk: Option<&BulkOrderModel>,
    ) -> Result<(), AppRepoError>;

    async fn fetch_order(&self, oid: &str) -> Result<Option<OrderModel>, AppRepoError>;

    async fn fetch_parcels(&self, oid: &str) -> Result<Vec<ParcelModel>, AppRepoError>;

    async fn fetch_parcel(&self, parcel_id: &str) -> Result<Option<ParcelModel>, AppRepoError>;

    /// returns whether any row actually changed, callers rely on this to
    /// detect replayed webhook events
    async fn update_order_status(
        &self,
        oid: &str,
        status: &OrderStatus,
    ) -> Result<bool, AppRepoError>;

    async fn update_parcel_statuses(
        &self,
        oid: &str,
        status: &OrderStatus,
    ) -> Result<(), AppRepoError>;

    async fn update_order_shipment_ref(
        &self,
        oid: &str,
        delivery_job_id: &str,
    ) -> Result<(), AppRepoError>;

    async fn update_parcel_job_ref(
        &self,
        parcel_id: &str,
        job_id: &str,
    ) -> Result<(), AppRepoError>;

    async fn update_parcel_item_ref(
        &self,
        parcel_id: &str,
        job_id: &str,
        item_id: &str,
    ) -> Result<(), AppRepoError>;

    /// maps the 12-hex-digit short form shown to customers back to the full
    /// order UUID, `None` when no order matches
    async fn resolve_short_id(&self, short_id: &str) -> Result<Option<String>, AppRepoError>;
} // end of trait AbstractOrderRepo

pub async fn app_repo_order(
    dstore: Arc<AppDataStoreContext>,
) -> Result<Box<dyn AbstractOrderRepo>, AppRepoError> {
    let repo = MariadbOrderRepo::new(dstore).await?;
    Ok(Box::new(repo))
}
