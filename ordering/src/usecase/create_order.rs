use std::boxed::Box;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::adapter::processor::{AbstractOrderProcessor, AppProcessorError};
use crate::adapter::repository::{AbstractOrderRepo, AppRepoError};
use crate::api::web::dto::{OrderCreateErrorDto, OrderCreateReqDto};
use crate::model::{
    calculate_shipping_price, BulkOrderModel, DeliveryMethod, OrderModel, ParcelBoundError,
    ParcelDimensions, ParcelModel, RecipientInfoModel, MAX_SIDE_CM, MAX_WEIGHT_KG,
};

#[derive(Debug)]
pub enum OrderCreateUcError {
    ClientBadRequest(OrderCreateErrorDto), // status code 400
    DataStoreError(AppRepoError),
    // the pending order stays persisted in this case, payment can be
    // re-driven against it later
    ExternalProcessorError(AppProcessorError, String),
}

impl From<AppRepoError> for OrderCreateUcError {
    fn from(value: AppRepoError) -> Self {
        Self::DataStoreError(value)
    }
}

pub struct OrderCreatedOk {
    pub order_id: String,
    pub amount: Decimal,
    pub payment_url: String,
}

pub struct OrderCreateUseCase {
    pub processors: Arc<Box<dyn AbstractOrderProcessor>>,
    pub repo: Box<dyn AbstractOrderRepo>,
}

impl OrderCreateUseCase {
    pub async fn execute(
        &self,
        req_body: OrderCreateReqDto,
    ) -> Result<OrderCreatedOk, OrderCreateUcError> {
        let (order, parcels, maybe_bulk) = Self::validate_and_build(req_body)?;
        self.repo
            .create_order(&order, &parcels, maybe_bulk.as_ref())
            .await?;
        let payin = self
            .processors
            .pay_in_start(&order)
            .await
            .map_err(|e| OrderCreateUcError::ExternalProcessorError(e, order.id.clone()))?;
        Ok(OrderCreatedOk {
            order_id: order.id,
            amount: order.amount,
            payment_url: payin.payment_url,
        })
    } // end of fn execute

    fn validate_and_build(
        req_body: OrderCreateReqDto,
    ) -> Result<(OrderModel, Vec<ParcelModel>, Option<BulkOrderModel>), OrderCreateUcError> {
        let mut errors = Vec::new();
        if req_body.sender.name.trim().is_empty() {
            errors.push("sender name is required".to_string());
        }
        if req_body.sender.email.trim().is_empty() {
            errors.push("sender email is required".to_string());
        }
        if req_body.parcels.is_empty() {
            errors.push("at least one parcel is required".to_string());
        }
        let method = DeliveryMethod::try_parse(req_body.delivery_method.as_str());
        if method.is_none() {
            errors.push(format!(
                "unknown delivery method: {}",
                req_body.delivery_method
            ));
        }
        let is_bulk = req_body.parcels.len() > 1;
        if is_bulk {
            let missing = req_body
                .parcels
                .iter()
                .enumerate()
                .filter(|(_i, p)| p.recipient.is_none())
                .map(|(i, _p)| i)
                .collect::<Vec<_>>();
            if !missing.is_empty() {
                errors.push(format!("parcels missing recipient: {:?}", missing));
            }
        } else if req_body.recipient.is_none()
            && req_body.parcels.iter().all(|p| p.recipient.is_none())
        {
            errors.push("recipient is required".to_string());
        }
        let dims = req_body
            .parcels
            .iter()
            .map(|p| ParcelDimensions {
                weight: p.weight,
                length: p.length,
                width: p.width,
                height: p.height,
            })
            .collect::<Vec<_>>();
        for (idx, d) in dims.iter().enumerate() {
            if let Err(e) = d.check_service_bounds() {
                let reason = match e {
                    ParcelBoundError::NonPositiveDimension => {
                        "all dimensions must be positive".to_string()
                    }
                    ParcelBoundError::SideExceedsLimit(side) => {
                        format!("side {side} cm exceeds {MAX_SIDE_CM} cm limit")
                    }
                    ParcelBoundError::WeightExceedsLimit(w) => {
                        format!("weight {w} kg exceeds {MAX_WEIGHT_KG} kg limit")
                    }
                };
                errors.push(format!("parcel {idx}: {reason}"));
            }
        }
        if !errors.is_empty() {
            return Err(OrderCreateUcError::ClientBadRequest(OrderCreateErrorDto {
                errors,
            }));
        }
        let method = method.unwrap();
        // no cross-parcel discount, the total is a plain per-parcel sum
        let amount: Decimal = dims
            .iter()
            .map(|d| calculate_shipping_price(d, method))
            .sum();
        let OrderCreateReqDto {
            sender,
            recipient,
            parcels,
            delivery_method: _,
        } = req_body;
        let top_recipient: Option<RecipientInfoModel> = recipient.map(Into::into);
        let order = OrderModel::create(sender.into(), top_recipient, amount, method, is_bulk);
        let bulk_id = is_bulk.then(|| uuid::Uuid::new_v4().to_string());
        let parcel_models = parcels
            .into_iter()
            .zip(dims)
            .map(|(p, d)| {
                ParcelModel::create(
                    order.id.as_str(),
                    bulk_id.as_deref(),
                    d,
                    p.recipient.map(Into::into),
                )
            })
            .collect::<Vec<_>>();
        let bulk = bulk_id.map(|bid| {
            let mut b = BulkOrderModel::from_parcels(order.id.as_str(), &parcel_models);
            b.id = bid;
            b
        });
        Ok((order, parcel_models, bulk))
    } // end of fn validate_and_build
} // end of impl OrderCreateUseCase
