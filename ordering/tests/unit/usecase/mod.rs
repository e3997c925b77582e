mod create_order;
mod process_webhook;
mod track_status;

use std::boxed::Box;
use std::result::Result;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;

use ordering::adapter::processor::{
    AbstractOrderProcessor, AppDeliveryJobResult, AppProcessorError, AppProcessorPayInResult,
    DeliveryJobPlan,
};
use ordering::adapter::repository::{AbstractOrderRepo, AppRepoError};
use ordering::model::{
    BulkOrderModel, ContactInfoModel, DeliveryJobSnapshot, DeliveryMethod, OrderModel,
    OrderStatus, ParcelDimensions, ParcelModel, RecipientInfoModel,
};

pub(super) fn ut_sender() -> ContactInfoModel {
    ContactInfoModel {
        name: "Tan Ah Kow".to_string(),
        address: "8 Shenton Way".to_string(),
        contact_number: "+6591234567".to_string(),
        email: "ahkow@example.com".to_string(),
    }
}

pub(super) fn ut_recipient(name: &str) -> RecipientInfoModel {
    RecipientInfoModel {
        contact: ContactInfoModel {
            name: name.to_string(),
            address: "21 Jurong East Ave 1".to_string(),
            contact_number: "+6598765432".to_string(),
            email: "recipient@example.com".to_string(),
        },
        line1: "21 Jurong East Ave 1".to_string(),
        line2: Some("#05-12".to_string()),
        postal_code: "609731".to_string(),
    }
}

pub(super) fn ut_order(oid: &str, is_bulk: bool) -> OrderModel {
    OrderModel {
        id: oid.to_string(),
        sender: ut_sender(),
        recipient: if is_bulk {
            None
        } else {
            Some(ut_recipient("Lim Bee Hwa"))
        },
        amount: Decimal::new(350, 2),
        status: OrderStatus::Paid,
        delivery_method: DeliveryMethod::Atl,
        is_bulk_order: is_bulk,
        detrack_id: None,
        create_time: chrono::Utc::now(),
    }
}

pub(super) fn ut_parcel(pid: &str, oid: &str, recipient: Option<&str>) -> ParcelModel {
    ParcelModel {
        id: pid.to_string(),
        order_id: oid.to_string(),
        bulk_order_id: None,
        dimensions: ParcelDimensions {
            weight: 3.0,
            length: 20.0,
            width: 20.0,
            height: 20.0,
        },
        recipient: recipient.map(ut_recipient),
        detrack_job_id: None,
        detrack_item_id: None,
        status: OrderStatus::Paid,
    }
}

#[derive(Default)]
pub(super) struct MockOrderRepo {
    pub _create_order_result: Mutex<Option<Result<(), AppRepoError>>>,
    // (num-parcels, order-is-bulk, bulk-aggregate-present) of the last call
    pub _create_order_seen: Arc<Mutex<Option<(usize, bool, bool)>>>,
    pub _fetch_order_result: Mutex<Option<Result<Option<OrderModel>, AppRepoError>>>,
    pub _fetch_parcels_result: Mutex<Option<Result<Vec<ParcelModel>, AppRepoError>>>,
    pub _fetch_parcel_result: Mutex<Option<Result<Option<ParcelModel>, AppRepoError>>>,
    pub _update_order_status_result: Mutex<Option<Result<bool, AppRepoError>>>,
    pub _update_order_status_seen: Arc<Mutex<Vec<(String, String)>>>,
    pub _update_parcel_statuses_seen: Arc<Mutex<Vec<(String, String)>>>,
    pub _shipment_ref_seen: Arc<Mutex<Vec<(String, String)>>>,
    pub _parcel_job_ref_seen: Arc<Mutex<Vec<(String, String)>>>,
    pub _parcel_item_ref_seen: Arc<Mutex<Vec<(String, String, String)>>>,
    pub _resolve_short_id_result: Mutex<Option<Result<Option<String>, AppRepoError>>>,
}

#[async_trait]
impl AbstractOrderRepo for MockOrderRepo {
    async fn create_order(
        &self,
        order: &OrderModel,
        parcels: &[ParcelModel],
        bulk: Option<&BulkOrderModel>,
    ) -> Result<(), AppRepoError> {
        let mut g = self._create_order_seen.lock().unwrap();
        *g = Some((parcels.len(), order.is_bulk_order, bulk.is_some()));
        let mut g = self._create_order_result.lock().unwrap();
        g.take().unwrap_or(Ok(()))
    }
    async fn fetch_order(&self, _oid: &str) -> Result<Option<OrderModel>, AppRepoError> {
        let mut g = self._fetch_order_result.lock().unwrap();
        g.take().unwrap_or(Ok(None))
    }
    async fn fetch_parcels(&self, _oid: &str) -> Result<Vec<ParcelModel>, AppRepoError> {
        let mut g = self._fetch_parcels_result.lock().unwrap();
        g.take().unwrap_or(Ok(Vec::new()))
    }
    async fn fetch_parcel(&self, _parcel_id: &str) -> Result<Option<ParcelModel>, AppRepoError> {
        let mut g = self._fetch_parcel_result.lock().unwrap();
        g.take().unwrap_or(Ok(None))
    }
    async fn update_order_status(
        &self,
        oid: &str,
        status: &OrderStatus,
    ) -> Result<bool, AppRepoError> {
        let mut g = self._update_order_status_seen.lock().unwrap();
        g.push((oid.to_string(), status.as_str().to_string()));
        let mut g = self._update_order_status_result.lock().unwrap();
        g.take().unwrap_or(Ok(true))
    }
    async fn update_parcel_statuses(
        &self,
        oid: &str,
        status: &OrderStatus,
    ) -> Result<(), AppRepoError> {
        let mut g = self._update_parcel_statuses_seen.lock().unwrap();
        g.push((oid.to_string(), status.as_str().to_string()));
        Ok(())
    }
    async fn update_order_shipment_ref(
        &self,
        oid: &str,
        delivery_job_id: &str,
    ) -> Result<(), AppRepoError> {
        let mut g = self._shipment_ref_seen.lock().unwrap();
        g.push((oid.to_string(), delivery_job_id.to_string()));
        Ok(())
    }
    async fn update_parcel_job_ref(
        &self,
        parcel_id: &str,
        job_id: &str,
    ) -> Result<(), AppRepoError> {
        let mut g = self._parcel_job_ref_seen.lock().unwrap();
        g.push((parcel_id.to_string(), job_id.to_string()));
        Ok(())
    }
    async fn update_parcel_item_ref(
        &self,
        parcel_id: &str,
        job_id: &str,
        item_id: &str,
    ) -> Result<(), AppRepoError> {
        let mut g = self._parcel_item_ref_seen.lock().unwrap();
        g.push((parcel_id.to_string(), job_id.to_string(), item_id.to_string()));
        Ok(())
    }
    async fn resolve_short_id(&self, _short_id: &str) -> Result<Option<String>, AppRepoError> {
        let mut g = self._resolve_short_id_result.lock().unwrap();
        g.take().unwrap_or(Ok(None))
    }
} // end of impl MockOrderRepo

#[derive(Default)]
pub(super) struct MockOrderProcessor {
    pub _payin_start_result: Mutex<Option<Result<AppProcessorPayInResult, AppProcessorError>>>,
    pub _delivery_configured: bool,
    // popped front-first, one entry per expected job-creation call
    pub _create_job_results: Mutex<Vec<Result<AppDeliveryJobResult, AppProcessorError>>>,
    // (do-number, order-number, num-parcels) of every plan received
    pub _create_job_seen: Arc<Mutex<Vec<(String, String, usize)>>>,
    pub _fetch_job_result: Mutex<Option<Result<Option<DeliveryJobSnapshot>, AppProcessorError>>>,
    pub _fetch_job_seen: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl AbstractOrderProcessor for MockOrderProcessor {
    async fn pay_in_start(
        &self,
        _order: &OrderModel,
    ) -> Result<AppProcessorPayInResult, AppProcessorError> {
        let mut g = self._payin_start_result.lock().unwrap();
        g.take().unwrap()
    }
    fn delivery_configured(&self) -> bool {
        self._delivery_configured
    }
    async fn create_delivery_job(
        &self,
        plan: &DeliveryJobPlan,
    ) -> Result<AppDeliveryJobResult, AppProcessorError> {
        let mut g = self._create_job_seen.lock().unwrap();
        g.push((
            plan.do_number.clone(),
            plan.order_number.clone(),
            plan.parcels.len(),
        ));
        let mut g = self._create_job_results.lock().unwrap();
        g.remove(0)
    }
    async fn fetch_delivery_job(
        &self,
        do_number: &str,
    ) -> Result<Option<DeliveryJobSnapshot>, AppProcessorError> {
        let mut g = self._fetch_job_seen.lock().unwrap();
        g.push(do_number.to_string());
        let mut g = self._fetch_job_result.lock().unwrap();
        g.take().unwrap_or(Ok(None))
    }
} // end of impl MockOrderProcessor
