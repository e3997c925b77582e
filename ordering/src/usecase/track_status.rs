use std::boxed::Box;
use std::sync::Arc;

use delivery_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use crate::adapter::processor::AbstractOrderProcessor;
use crate::adapter::repository::{AbstractOrderRepo, AppRepoError};
use crate::model::{
    OrderIdRef, OrderModel, OrderStatus, TrackingStatusModel, BULK_ORDER_SENTINEL_JOB_ID,
};

#[derive(Debug)]
pub enum TrackStatusUcError {
    InvalidReference(String), // status code 400
    DataStoreError(AppRepoError),
}

impl From<AppRepoError> for TrackStatusUcError {
    fn from(value: AppRepoError) -> Self {
        Self::DataStoreError(value)
    }
}

pub struct TrackStatusUseCase {
    pub processors: Arc<Box<dyn AbstractOrderProcessor>>,
    pub repo: Box<dyn AbstractOrderRepo>,
    pub logctx: Arc<AppLogContext>,
}

impl TrackStatusUseCase {
    /// `Ok(None)` means "nothing to show yet", the caller turns it into an
    /// empty response the frontend keeps polling against
    pub async fn execute(
        &self,
        raw_ref: &str,
    ) -> Result<Option<TrackingStatusModel>, TrackStatusUcError> {
        let id_ref = OrderIdRef::parse(raw_ref)
            .ok_or_else(|| TrackStatusUcError::InvalidReference(raw_ref.to_string()))?;
        let full_id = match id_ref {
            OrderIdRef::Full(s) => s,
            OrderIdRef::Short(s) => match self.repo.resolve_short_id(s.as_str()).await? {
                Some(f) => f,
                None => return Ok(None),
            },
        };
        if let Some(order) = self.repo.fetch_order(full_id.as_str()).await? {
            return self.order_view(order).await;
        }
        // bulk-order parcels are tracked by their own id
        if let Some(parcel) = self.repo.fetch_parcel(full_id.as_str()).await? {
            if !matches!(parcel.status, OrderStatus::Paid) {
                return Ok(None);
            }
            return match parcel.detrack_job_id {
                None => Ok(Some(TrackingStatusModel::not_yet_tracked())),
                Some(_) => Ok(self.provider_view(parcel.id.as_str()).await),
            };
        }
        Ok(None)
    } // end of fn execute

    async fn order_view(
        &self,
        order: OrderModel,
    ) -> Result<Option<TrackingStatusModel>, TrackStatusUcError> {
        if !matches!(order.status, OrderStatus::Paid) {
            return Ok(None);
        }
        match order.detrack_id.as_deref() {
            None => Ok(Some(TrackingStatusModel::not_yet_tracked())),
            Some(BULK_ORDER_SENTINEL_JOB_ID) => {
                // per-parcel jobs exist, show the first tracked parcel as a
                // representative view of the whole bulk order
                let parcels = self.repo.fetch_parcels(order.id.as_str()).await?;
                let tracked = parcels.iter().find(|p| p.detrack_job_id.is_some());
                match tracked {
                    Some(p) => Ok(self.provider_view(p.id.as_str()).await),
                    None => Ok(Some(TrackingStatusModel::not_yet_tracked())),
                }
            }
            Some(_) => Ok(self.provider_view(order.id.as_str()).await),
        }
    } // end of fn order_view

    // any provider-side failure degrades to "not ready yet" instead of a
    // customer-facing error page
    async fn provider_view(&self, do_number: &str) -> Option<TrackingStatusModel> {
        let logctx_p = &self.logctx;
        match self.processors.fetch_delivery_job(do_number).await {
            Ok(Some(snapshot)) => Some(TrackingStatusModel::from_job_snapshot(snapshot)),
            Ok(None) => None,
            Err(e) => {
                app_log_event!(
                    logctx_p,
                    AppLogLevel::WARNING,
                    "delivery-status-fetch, do:{do_number}, {:?}",
                    e
                );
                None
            }
        }
    }
} // end of impl TrackStatusUseCase
