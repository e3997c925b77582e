use rust_decimal::Decimal;

use ordering::model::{
    calculate_shipping_price, DeliveryMethod, ParcelBoundError, ParcelDimensions, PRICING_TIERS,
};

fn ut_dims(weight: f64, length: f64, width: f64, height: f64) -> ParcelDimensions {
    ParcelDimensions {
        weight,
        length,
        width,
        height,
    }
}

#[test]
fn volumetric_weight_formula() {
    let dims = ut_dims(1.0, 50.0, 40.0, 25.0);
    assert!((dims.volumetric_weight() - 10.0).abs() < f64::EPSILON);
    assert!((dims.effective_weight() - 10.0).abs() < f64::EPSILON);
    // scale weight dominates when heavier
    let dense = ut_dims(12.0, 10.0, 10.0, 10.0);
    assert!((dense.effective_weight() - 12.0).abs() < f64::EPSILON);
}

#[test]
fn price_small_parcel_base_tier() {
    let dims = ut_dims(3.0, 20.0, 20.0, 20.0);
    let atl = calculate_shipping_price(&dims, DeliveryMethod::Atl);
    assert_eq!(atl, Decimal::new(350, 2));
    let hth = calculate_shipping_price(&dims, DeliveryMethod::HandToHand);
    assert_eq!(hth, Decimal::new(600, 2));
}

#[test]
fn price_volumetric_pushes_tier_up() {
    // 1 kg on the scale but 25 kg volumetric, lands in the catch-all tier
    let dims = ut_dims(1.0, 50.0, 50.0, 50.0);
    let out = calculate_shipping_price(&dims, DeliveryMethod::Atl);
    assert_eq!(out, Decimal::new(1740, 2));
}

#[test]
fn price_heavy_parcel_catch_all() {
    let dims = ut_dims(25.0, 50.0, 50.0, 50.0);
    let out = calculate_shipping_price(&dims, DeliveryMethod::Atl);
    assert_eq!(out, Decimal::new(1740, 2));
}

#[test]
fn price_tier_upper_bounds_inclusive() {
    let cases = [
        (ut_dims(4.0, 10.0, 10.0, 10.0), Decimal::new(350, 2)),
        (ut_dims(4.1, 10.0, 10.0, 10.0), Decimal::new(720, 2)),
        (ut_dims(10.0, 10.0, 10.0, 10.0), Decimal::new(720, 2)),
        (ut_dims(20.0, 10.0, 10.0, 10.0), Decimal::new(1190, 2)),
        (ut_dims(20.1, 10.0, 10.0, 10.0), Decimal::new(1740, 2)),
    ];
    for (dims, expect) in cases {
        let out = calculate_shipping_price(&dims, DeliveryMethod::Atl);
        assert_eq!(out, expect);
    }
}

#[test]
fn price_monotonic_in_weight() {
    let mut last = Decimal::ZERO;
    for w10 in 1..=300 {
        let dims = ut_dims((w10 as f64) / 10.0, 10.0, 10.0, 10.0);
        let out = calculate_shipping_price(&dims, DeliveryMethod::Atl);
        assert!(out >= last, "weight {} dropped the price", dims.weight);
        last = out;
    }
}

#[test]
fn tiers_strictly_increasing() {
    for pair in PRICING_TIERS.windows(2) {
        assert!(pair[0].max_weight_kg < pair[1].max_weight_kg);
        assert!(pair[0].price() < pair[1].price());
    }
}

#[test]
fn service_bounds_rejections() {
    let zero_side = ut_dims(2.0, 0.0, 10.0, 10.0);
    assert_eq!(
        zero_side.check_service_bounds(),
        Err(ParcelBoundError::NonPositiveDimension)
    );
    let negative_weight = ut_dims(-1.0, 10.0, 10.0, 10.0);
    assert_eq!(
        negative_weight.check_service_bounds(),
        Err(ParcelBoundError::NonPositiveDimension)
    );
    let too_long = ut_dims(2.0, 151.0, 10.0, 10.0);
    assert_eq!(
        too_long.check_service_bounds(),
        Err(ParcelBoundError::SideExceedsLimit(151.0))
    );
    let too_heavy = ut_dims(30.5, 10.0, 10.0, 10.0);
    assert_eq!(
        too_heavy.check_service_bounds(),
        Err(ParcelBoundError::WeightExceedsLimit(30.5))
    );
    let at_limit = ut_dims(30.0, 150.0, 150.0, 150.0);
    assert!(at_limit.check_service_bounds().is_ok());
}
