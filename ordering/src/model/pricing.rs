use rust_decimal::Decimal;

use super::order::DeliveryMethod;

// industry constant, 5000 cubic centimeters per chargeable kilogram
// (200 kg per cubic meter reference density)
const VOLUMETRIC_DIVISOR: f64 = 5000.0;

// service acceptance bounds, enforced at order creation, never inside
// the price function itself
pub const MAX_SIDE_CM: f64 = 150.0;
pub const MAX_WEIGHT_KG: f64 = 30.0;

const HAND_TO_HAND_SURCHARGE_CENT: i64 = 250;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParcelDimensions {
    pub weight: f64, // actual scale weight in kg
    pub length: f64, // cm
    pub width: f64,  // cm
    pub height: f64, // cm
}

#[derive(Debug, PartialEq)]
pub enum ParcelBoundError {
    NonPositiveDimension,
    SideExceedsLimit(f64),
    WeightExceedsLimit(f64),
}

impl ParcelDimensions {
    pub fn volumetric_weight(&self) -> f64 {
        self.length * self.width * self.height / VOLUMETRIC_DIVISOR
    }

    pub fn effective_weight(&self) -> f64 {
        self.weight.max(self.volumetric_weight())
    }

    pub fn check_service_bounds(&self) -> Result<(), ParcelBoundError> {
        let sides = [self.length, self.width, self.height];
        if self.weight <= 0.0 || sides.iter().any(|s| *s <= 0.0) {
            return Err(ParcelBoundError::NonPositiveDimension);
        }
        if let Some(s) = sides.iter().find(|s| **s > MAX_SIDE_CM) {
            return Err(ParcelBoundError::SideExceedsLimit(*s));
        }
        if self.weight > MAX_WEIGHT_KG {
            return Err(ParcelBoundError::WeightExceedsLimit(self.weight));
        }
        Ok(())
    }
} // end of impl ParcelDimensions

pub struct PricingTier {
    pub max_weight_kg: f64,
    pub max_volumetric: f64,
    price_cent: i64,
}

impl PricingTier {
    pub fn price(&self) -> Decimal {
        Decimal::new(self.price_cent, 2)
    }

    fn accepts(&self, effective_weight: f64, volumetric_weight: f64) -> bool {
        effective_weight <= self.max_weight_kg && volumetric_weight <= self.max_volumetric
    }
}

// ordered, strictly increasing in `max_weight_kg`, the final tier is the
// unbounded catch-all every oversized parcel falls into
pub static PRICING_TIERS: [PricingTier; 4] = [
    PricingTier {
        max_weight_kg: 4.0,
        max_volumetric: 2.0,
        price_cent: 350,
    },
    PricingTier {
        max_weight_kg: 10.0,
        max_volumetric: 10.0,
        price_cent: 720,
    },
    PricingTier {
        max_weight_kg: 20.0,
        max_volumetric: 20.0,
        price_cent: 1190,
    },
    PricingTier {
        max_weight_kg: 30.0,
        max_volumetric: f64::INFINITY,
        price_cent: 1740,
    },
];

fn select_tier(dims: &ParcelDimensions) -> &'static PricingTier {
    let (effective, volumetric) = (dims.effective_weight(), dims.volumetric_weight());
    PRICING_TIERS
        .iter()
        .find(|t| t.accepts(effective, volumetric))
        .unwrap_or(&PRICING_TIERS[3])
}

/// pure and total over its numeric domain, callers are responsible for
/// rejecting out-of-range dimensions beforehand (`check_service_bounds`),
/// nonsensical input simply lands in the catch-all tier.
pub fn calculate_shipping_price(dims: &ParcelDimensions, method: DeliveryMethod) -> Decimal {
    let base = select_tier(dims).price();
    match method {
        DeliveryMethod::Atl => base,
        DeliveryMethod::HandToHand => base + Decimal::new(HAND_TO_HAND_SURCHARGE_CENT, 2),
    }
}
