use std::boxed::Box;
use std::sync::{Arc, Mutex};

use ordering::adapter::processor::{
    AbstractOrderProcessor, AppProcessorError, AppProcessorErrorReason, AppProcessorFnLabel,
};
use ordering::model::{
    DeliveryJobSnapshot, OrderStatus, BULK_ORDER_SENTINEL_JOB_ID,
};
use ordering::usecase::{TrackStatusUcError, TrackStatusUseCase};

use super::{ut_order, ut_parcel, MockOrderProcessor, MockOrderRepo};
use crate::ut_logctx;

const UT_ORDER_ID: &str = "a1b2c3d4-e5f6-7a8b-9c0d-e1f2a3b4c5d6";
const UT_SHORT_ID: &str = "e1f2a3b4c5d6";

fn ut_snapshot() -> DeliveryJobSnapshot {
    DeliveryJobSnapshot {
        status: Some("in_progress".to_string()),
        tracking_status: Some("Out for delivery".to_string()),
        info_received_at: Some("2024-05-01T08:00:00+08:00".to_string()),
        updated_at: Some("2024-05-02T09:00:00+08:00".to_string()),
        ..Default::default()
    }
}

fn ut_usecase(repo: MockOrderRepo, processor: MockOrderProcessor) -> TrackStatusUseCase {
    TrackStatusUseCase {
        processors: Arc::new(Box::new(processor) as Box<dyn AbstractOrderProcessor>),
        repo: Box::new(repo),
        logctx: ut_logctx(),
    }
}

#[actix_web::test]
async fn tracked_order_returns_provider_view() {
    let mut order = ut_order(UT_ORDER_ID, false);
    order.detrack_id = Some("dt-900".to_string());
    let repo = MockOrderRepo {
        _fetch_order_result: Mutex::new(Some(Ok(Some(order)))),
        ..Default::default()
    };
    let processor = MockOrderProcessor {
        _fetch_job_result: Mutex::new(Some(Ok(Some(ut_snapshot())))),
        ..Default::default()
    };
    let fetch_seen = processor._fetch_job_seen.clone();
    let uc = ut_usecase(repo, processor);
    let out = uc.execute(UT_ORDER_ID).await.unwrap().unwrap();
    assert_eq!(out.status.as_str(), "in_progress");
    assert_eq!(out.tracking_status.as_str(), "Out for delivery");
    // the DO number used with the provider is the order UUID itself
    let seen = fetch_seen.lock().unwrap();
    assert_eq!(seen.as_slice(), &[UT_ORDER_ID.to_string()]);
}

#[actix_web::test]
async fn short_reference_resolved_first() {
    let mut order = ut_order(UT_ORDER_ID, false);
    order.detrack_id = Some("dt-900".to_string());
    let repo = MockOrderRepo {
        _resolve_short_id_result: Mutex::new(Some(Ok(Some(UT_ORDER_ID.to_string())))),
        _fetch_order_result: Mutex::new(Some(Ok(Some(order)))),
        ..Default::default()
    };
    let processor = MockOrderProcessor {
        _fetch_job_result: Mutex::new(Some(Ok(Some(ut_snapshot())))),
        ..Default::default()
    };
    let uc = ut_usecase(repo, processor);
    let out = uc.execute(UT_SHORT_ID).await.unwrap();
    assert!(out.is_some());
}

#[actix_web::test]
async fn unresolved_short_reference_is_empty() {
    let uc = ut_usecase(MockOrderRepo::default(), MockOrderProcessor::default());
    let out = uc.execute(UT_SHORT_ID).await.unwrap();
    assert!(out.is_none());
}

#[actix_web::test]
async fn malformed_reference_rejected() {
    let uc = ut_usecase(MockOrderRepo::default(), MockOrderProcessor::default());
    let out = uc.execute("not-an-order-ref").await;
    assert!(matches!(
        out.err().unwrap(),
        TrackStatusUcError::InvalidReference(_)
    ));
}

#[actix_web::test]
async fn unpaid_order_hidden() {
    let mut order = ut_order(UT_ORDER_ID, false);
    order.status = OrderStatus::Pending;
    order.detrack_id = Some("dt-900".to_string());
    let repo = MockOrderRepo {
        _fetch_order_result: Mutex::new(Some(Ok(Some(order)))),
        ..Default::default()
    };
    let uc = ut_usecase(repo, MockOrderProcessor::default());
    let out = uc.execute(UT_ORDER_ID).await.unwrap();
    assert!(out.is_none());
}

#[actix_web::test]
async fn paid_order_without_job_gets_placeholder() {
    let repo = MockOrderRepo {
        _fetch_order_result: Mutex::new(Some(Ok(Some(ut_order(UT_ORDER_ID, false))))),
        ..Default::default()
    };
    let uc = ut_usecase(repo, MockOrderProcessor::default());
    let out = uc.execute(UT_ORDER_ID).await.unwrap().unwrap();
    assert_eq!(out.status.as_str(), "detrack_missing");
    assert_eq!(out.milestones.len(), 4);
}

#[actix_web::test]
async fn bulk_sentinel_consults_parcels() {
    let mut order = ut_order(UT_ORDER_ID, true);
    order.detrack_id = Some(BULK_ORDER_SENTINEL_JOB_ID.to_string());
    let mut p1 = ut_parcel("a9b8c7d6-0000-4000-8000-aaaaaaaaaaaa", UT_ORDER_ID, None);
    p1.detrack_job_id = Some("dt-901".to_string());
    let repo = MockOrderRepo {
        _fetch_order_result: Mutex::new(Some(Ok(Some(order)))),
        _fetch_parcels_result: Mutex::new(Some(Ok(vec![p1]))),
        ..Default::default()
    };
    let processor = MockOrderProcessor {
        _fetch_job_result: Mutex::new(Some(Ok(Some(ut_snapshot())))),
        ..Default::default()
    };
    let fetch_seen = processor._fetch_job_seen.clone();
    let uc = ut_usecase(repo, processor);
    let out = uc.execute(UT_ORDER_ID).await.unwrap();
    assert!(out.is_some());
    // bulk parcels are tracked by their own id, not the parent order id
    let seen = fetch_seen.lock().unwrap();
    assert_eq!(
        seen.as_slice(),
        &["a9b8c7d6-0000-4000-8000-aaaaaaaaaaaa".to_string()]
    );
}

#[actix_web::test]
async fn bulk_sentinel_without_any_job_gets_placeholder() {
    let mut order = ut_order(UT_ORDER_ID, true);
    order.detrack_id = Some(BULK_ORDER_SENTINEL_JOB_ID.to_string());
    let repo = MockOrderRepo {
        _fetch_order_result: Mutex::new(Some(Ok(Some(order)))),
        _fetch_parcels_result: Mutex::new(Some(Ok(vec![ut_parcel(
            "a9b8c7d6-0000-4000-8000-aaaaaaaaaaaa",
            UT_ORDER_ID,
            None,
        )]))),
        ..Default::default()
    };
    let uc = ut_usecase(repo, MockOrderProcessor::default());
    let out = uc.execute(UT_ORDER_ID).await.unwrap().unwrap();
    assert_eq!(out.status.as_str(), "detrack_missing");
}

#[actix_web::test]
async fn parcel_reference_tracked_directly() {
    let parcel_id = "a9b8c7d6-0000-4000-8000-aaaaaaaaaaaa";
    let mut parcel = ut_parcel(parcel_id, UT_ORDER_ID, Some("Lim Bee Hwa"));
    parcel.detrack_job_id = Some("dt-901".to_string());
    let repo = MockOrderRepo {
        _fetch_order_result: Mutex::new(Some(Ok(None))),
        _fetch_parcel_result: Mutex::new(Some(Ok(Some(parcel)))),
        ..Default::default()
    };
    let processor = MockOrderProcessor {
        _fetch_job_result: Mutex::new(Some(Ok(Some(ut_snapshot())))),
        ..Default::default()
    };
    let fetch_seen = processor._fetch_job_seen.clone();
    let uc = ut_usecase(repo, processor);
    let out = uc.execute(parcel_id).await.unwrap();
    assert!(out.is_some());
    let seen = fetch_seen.lock().unwrap();
    assert_eq!(seen.as_slice(), &[parcel_id.to_string()]);
}

#[actix_web::test]
async fn provider_failure_degrades_to_empty() {
    let mut order = ut_order(UT_ORDER_ID, false);
    order.detrack_id = Some("dt-900".to_string());
    let repo = MockOrderRepo {
        _fetch_order_result: Mutex::new(Some(Ok(Some(order)))),
        ..Default::default()
    };
    let e = AppProcessorError {
        reason: AppProcessorErrorReason::InvalidResponse("http-503".to_string()),
        fn_label: AppProcessorFnLabel::FetchDeliveryJob,
    };
    let processor = MockOrderProcessor {
        _fetch_job_result: Mutex::new(Some(Err(e))),
        ..Default::default()
    };
    let uc = ut_usecase(repo, processor);
    let out = uc.execute(UT_ORDER_ID).await.unwrap();
    assert!(out.is_none());
}
