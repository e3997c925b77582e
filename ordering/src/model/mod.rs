mod order;
mod pricing;
mod tracking;

pub use order::{
    short_id_of, BulkOrderModel, ContactInfoModel, DeliveryMethod, OrderIdRef, OrderModel,
    OrderStatus, ParcelModel, RecipientInfoModel, BULK_ORDER_SENTINEL_JOB_ID,
};
pub use pricing::{
    calculate_shipping_price, ParcelBoundError, ParcelDimensions, PricingTier, MAX_SIDE_CM,
    MAX_WEIGHT_KG, PRICING_TIERS,
};
pub use tracking::{
    DeliveryJobSnapshot, MilestoneProgress, TrackingMilestoneModel, TrackingStatusModel,
};
