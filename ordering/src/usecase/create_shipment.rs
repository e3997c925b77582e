use std::boxed::Box;
use std::sync::Arc;

use futures_util::future::join_all;

use delivery_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use crate::adapter::processor::{
    AbstractOrderProcessor, AppProcessorError, DeliveryJobPlan,
};
use crate::adapter::repository::{AbstractOrderRepo, AppRepoError};
use crate::model::{
    OrderModel, ParcelModel, RecipientInfoModel, BULK_ORDER_SENTINEL_JOB_ID,
};

#[derive(Debug)]
pub enum ShipmentJobUcError {
    NotConfigured,
    OrderNotFound(String),
    NoParcels(String),
    MissingRecipient(String),
    AllJobsFailed(usize),
    DataStoreError(AppRepoError),
    ExternalProcessorError(AppProcessorError),
}

impl From<AppRepoError> for ShipmentJobUcError {
    fn from(value: AppRepoError) -> Self {
        Self::DataStoreError(value)
    }
}
impl From<AppProcessorError> for ShipmentJobUcError {
    fn from(value: AppProcessorError) -> Self {
        Self::ExternalProcessorError(value)
    }
}

#[derive(Debug)]
pub enum ShipmentJobResult {
    AlreadyExists(String),
    Single(String),
    Bulk {
        job_ids: Vec<String>,
        num_failures: usize,
    },
}

pub struct ShipmentJobUseCase {
    pub processors: Arc<Box<dyn AbstractOrderProcessor>>,
    pub repo: Box<dyn AbstractOrderRepo>,
    pub logctx: Arc<AppLogContext>,
}

impl ShipmentJobUseCase {
    pub async fn execute(&self, oid: &str) -> Result<ShipmentJobResult, ShipmentJobUcError> {
        if !self.processors.delivery_configured() {
            return Err(ShipmentJobUcError::NotConfigured);
        }
        let order = self
            .repo
            .fetch_order(oid)
            .await?
            .ok_or_else(|| ShipmentJobUcError::OrderNotFound(oid.to_string()))?;
        if let Some(jid) = &order.detrack_id {
            if !order.is_bulk_order {
                return Ok(ShipmentJobResult::AlreadyExists(jid.clone()));
            }
        }
        let parcels = self.repo.fetch_parcels(oid).await?;
        if parcels.is_empty() {
            return Err(ShipmentJobUcError::NoParcels(oid.to_string()));
        }
        if order.is_bulk_order {
            self.fan_out_bulk(&order, parcels).await
        } else {
            self.dispatch_single(&order, parcels).await
        }
    } // end of fn execute

    async fn dispatch_single(
        &self,
        order: &OrderModel,
        parcels: Vec<ParcelModel>,
    ) -> Result<ShipmentJobResult, ShipmentJobUcError> {
        let recipient = Self::pick_recipient(order, parcels.first())
            .ok_or_else(|| ShipmentJobUcError::MissingRecipient(order.id.clone()))?;
        let plan = DeliveryJobPlan {
            do_number: order.id.clone(),
            order_number: order.id.clone(),
            sender: order.sender.clone(),
            recipient,
            delivery_method: order.delivery_method,
            parcels: parcels.iter().map(|p| p.dimensions).collect(),
        };
        let created = self.processors.create_delivery_job(&plan).await?;
        self.repo
            .update_order_shipment_ref(order.id.as_str(), created.job_id.as_str())
            .await?;
        for (parcel, item_id) in parcels.iter().zip(created.item_ids.iter()) {
            self.repo
                .update_parcel_item_ref(
                    parcel.id.as_str(),
                    created.job_id.as_str(),
                    item_id.as_str(),
                )
                .await?;
        }
        Ok(ShipmentJobResult::Single(created.job_id))
    } // end of fn dispatch_single

    async fn fan_out_bulk(
        &self,
        order: &OrderModel,
        parcels: Vec<ParcelModel>,
    ) -> Result<ShipmentJobResult, ShipmentJobUcError> {
        let logctx_p = &self.logctx;
        let mut job_ids = parcels
            .iter()
            .filter_map(|p| p.detrack_job_id.clone())
            .collect::<Vec<_>>();
        let pending = parcels
            .iter()
            .filter(|p| p.detrack_job_id.is_none())
            .collect::<Vec<_>>();
        if pending.is_empty() {
            return Ok(ShipmentJobResult::Bulk {
                job_ids,
                num_failures: 0,
            });
        }
        // one independent request per parcel, a failing parcel never blocks
        // the rest
        let futs = pending.iter().map(|p| self.dispatch_one_parcel(order, p));
        let results = join_all(futs).await;
        let mut num_failures = 0usize;
        for (parcel, result) in pending.iter().zip(results) {
            match result {
                Ok(jid) => job_ids.push(jid),
                Err(e) => {
                    num_failures += 1;
                    app_log_event!(
                        logctx_p,
                        AppLogLevel::ERROR,
                        "parcel-job-failed, parcel:{}, {:?}",
                        parcel.id.as_str(),
                        e
                    );
                }
            }
        }
        if job_ids.is_empty() {
            return Err(ShipmentJobUcError::AllJobsFailed(num_failures));
        }
        // later status lookups consult parcels once they see this marker
        self.repo
            .update_order_shipment_ref(order.id.as_str(), BULK_ORDER_SENTINEL_JOB_ID)
            .await?;
        Ok(ShipmentJobResult::Bulk {
            job_ids,
            num_failures,
        })
    } // end of fn fan_out_bulk

    async fn dispatch_one_parcel(
        &self,
        order: &OrderModel,
        parcel: &ParcelModel,
    ) -> Result<String, ShipmentJobUcError> {
        let recipient = Self::pick_recipient(order, Some(parcel))
            .ok_or_else(|| ShipmentJobUcError::MissingRecipient(parcel.id.clone()))?;
        let plan = DeliveryJobPlan {
            // the parcel id doubles as DO number so each bulk parcel tracks
            // independently, the parent id rides along as order_number
            do_number: parcel.id.clone(),
            order_number: order.id.clone(),
            sender: order.sender.clone(),
            recipient,
            delivery_method: order.delivery_method,
            parcels: vec![parcel.dimensions],
        };
        let created = self.processors.create_delivery_job(&plan).await?;
        self.repo
            .update_parcel_job_ref(parcel.id.as_str(), created.job_id.as_str())
            .await?;
        Ok(created.job_id)
    }

    fn pick_recipient(
        order: &OrderModel,
        parcel: Option<&ParcelModel>,
    ) -> Option<RecipientInfoModel> {
        parcel
            .and_then(|p| p.recipient.clone())
            .or_else(|| order.recipient.clone())
    }
} // end of impl ShipmentJobUseCase
