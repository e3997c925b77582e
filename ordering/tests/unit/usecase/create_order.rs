use std::boxed::Box;
use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;

use ordering::adapter::processor::{
    AbstractOrderProcessor, AppProcessorError, AppProcessorErrorReason, AppProcessorFnLabel,
    AppProcessorPayInResult,
};
use ordering::api::web::dto::{
    ContactInfoDto, OrderCreateReqDto, ParcelReqDto, RecipientInfoDto,
};
use ordering::usecase::{OrderCreateUcError, OrderCreateUseCase};

use super::{MockOrderProcessor, MockOrderRepo};

fn ut_sender_dto() -> ContactInfoDto {
    ContactInfoDto {
        name: "Tan Ah Kow".to_string(),
        address: "8 Shenton Way".to_string(),
        contact_number: "+6591234567".to_string(),
        email: "ahkow@example.com".to_string(),
    }
}

fn ut_recipient_dto() -> RecipientInfoDto {
    RecipientInfoDto {
        name: "Lim Bee Hwa".to_string(),
        address: "21 Jurong East Ave 1".to_string(),
        contact_number: "+6598765432".to_string(),
        email: "beehwa@example.com".to_string(),
        line1: "21 Jurong East Ave 1".to_string(),
        line2: None,
        postal_code: "609731".to_string(),
    }
}

fn ut_parcel_dto(weight: f64, side: f64, recipient: Option<RecipientInfoDto>) -> ParcelReqDto {
    ParcelReqDto {
        weight,
        length: side,
        width: side,
        height: side,
        recipient,
    }
}

fn ut_payin_ok() -> AppProcessorPayInResult {
    AppProcessorPayInResult {
        request_id: "hp-req-9f2".to_string(),
        payment_url: "https://securecheckout.example/9f2".to_string(),
    }
}

#[actix_web::test]
async fn single_parcel_ok() {
    let repo = MockOrderRepo::default();
    let create_seen = repo._create_order_seen.clone();
    let processor = MockOrderProcessor {
        _payin_start_result: Mutex::new(Some(Ok(ut_payin_ok()))),
        ..Default::default()
    };
    let uc = OrderCreateUseCase {
        repo: Box::new(repo),
        processors: Arc::new(Box::new(processor) as Box<dyn AbstractOrderProcessor>),
    };
    let req = OrderCreateReqDto {
        sender: ut_sender_dto(),
        recipient: Some(ut_recipient_dto()),
        parcels: vec![ut_parcel_dto(3.0, 20.0, None)],
        delivery_method: "atl".to_string(),
    };
    let out = uc.execute(req).await.unwrap();
    assert_eq!(out.amount, Decimal::new(350, 2));
    assert_eq!(
        out.payment_url.as_str(),
        "https://securecheckout.example/9f2"
    );
    assert!(!out.order_id.is_empty());
    let seen = create_seen.lock().unwrap().take().unwrap();
    assert_eq!(seen, (1usize, false, false));
}

#[actix_web::test]
async fn bulk_parcels_amount_summed() {
    let repo = MockOrderRepo::default();
    let create_seen = repo._create_order_seen.clone();
    let processor = MockOrderProcessor {
        _payin_start_result: Mutex::new(Some(Ok(ut_payin_ok()))),
        ..Default::default()
    };
    let uc = OrderCreateUseCase {
        repo: Box::new(repo),
        processors: Arc::new(Box::new(processor) as Box<dyn AbstractOrderProcessor>),
    };
    let req = OrderCreateReqDto {
        sender: ut_sender_dto(),
        recipient: None,
        parcels: vec![
            ut_parcel_dto(3.0, 20.0, Some(ut_recipient_dto())),
            ut_parcel_dto(25.0, 50.0, Some(ut_recipient_dto())),
        ],
        delivery_method: "hand-to-hand".to_string(),
    };
    let out = uc.execute(req).await.unwrap();
    // 6.00 for the small parcel, 19.90 for the heavy one, each carrying
    // the hand-to-hand surcharge
    assert_eq!(out.amount, Decimal::new(2590, 2));
    let seen = create_seen.lock().unwrap().take().unwrap();
    assert_eq!(seen, (2usize, true, true));
}

#[actix_web::test]
async fn rejects_out_of_bound_parcel() {
    let uc = OrderCreateUseCase {
        repo: Box::new(MockOrderRepo::default()),
        processors: Arc::new(
            Box::new(MockOrderProcessor::default()) as Box<dyn AbstractOrderProcessor>
        ),
    };
    let req = OrderCreateReqDto {
        sender: ut_sender_dto(),
        recipient: Some(ut_recipient_dto()),
        parcels: vec![ut_parcel_dto(31.0, 20.0, None), ut_parcel_dto(3.0, 151.0, None)],
        delivery_method: "atl".to_string(),
    };
    let out = uc.execute(req).await;
    if let Err(OrderCreateUcError::ClientBadRequest(detail)) = out {
        // the message names the measured value and the service limit
        assert!(detail
            .errors
            .iter()
            .any(|m| m.contains("weight 31 kg exceeds 30 kg limit")));
        assert!(detail
            .errors
            .iter()
            .any(|m| m.contains("side 151 cm exceeds 150 cm limit")));
    } else {
        panic!("expect client-bad-request error");
    }
}

#[actix_web::test]
async fn rejects_bulk_without_per_parcel_recipients() {
    let uc = OrderCreateUseCase {
        repo: Box::new(MockOrderRepo::default()),
        processors: Arc::new(
            Box::new(MockOrderProcessor::default()) as Box<dyn AbstractOrderProcessor>
        ),
    };
    let req = OrderCreateReqDto {
        sender: ut_sender_dto(),
        recipient: Some(ut_recipient_dto()),
        parcels: vec![
            ut_parcel_dto(3.0, 20.0, Some(ut_recipient_dto())),
            ut_parcel_dto(3.0, 20.0, None),
        ],
        delivery_method: "atl".to_string(),
    };
    let out = uc.execute(req).await;
    if let Err(OrderCreateUcError::ClientBadRequest(detail)) = out {
        assert!(detail
            .errors
            .iter()
            .any(|m| m.contains("missing recipient")));
    } else {
        panic!("expect client-bad-request error");
    }
}

#[actix_web::test]
async fn rejects_unknown_delivery_method_and_empty_parcels() {
    let uc = OrderCreateUseCase {
        repo: Box::new(MockOrderRepo::default()),
        processors: Arc::new(
            Box::new(MockOrderProcessor::default()) as Box<dyn AbstractOrderProcessor>
        ),
    };
    let req = OrderCreateReqDto {
        sender: ut_sender_dto(),
        recipient: Some(ut_recipient_dto()),
        parcels: Vec::new(),
        delivery_method: "teleport".to_string(),
    };
    let out = uc.execute(req).await;
    if let Err(OrderCreateUcError::ClientBadRequest(detail)) = out {
        assert!(detail
            .errors
            .iter()
            .any(|m| m.contains("at least one parcel")));
        assert!(detail
            .errors
            .iter()
            .any(|m| m.contains("unknown delivery method")));
    } else {
        panic!("expect client-bad-request error");
    }
}

#[actix_web::test]
async fn payment_session_failure_keeps_order() {
    let repo = MockOrderRepo::default();
    let create_seen = repo._create_order_seen.clone();
    let e = AppProcessorError {
        reason: AppProcessorErrorReason::InvalidResponse("http-502".to_string()),
        fn_label: AppProcessorFnLabel::PayInStart,
    };
    let processor = MockOrderProcessor {
        _payin_start_result: Mutex::new(Some(Err(e))),
        ..Default::default()
    };
    let uc = OrderCreateUseCase {
        repo: Box::new(repo),
        processors: Arc::new(Box::new(processor) as Box<dyn AbstractOrderProcessor>),
    };
    let req = OrderCreateReqDto {
        sender: ut_sender_dto(),
        recipient: Some(ut_recipient_dto()),
        parcels: vec![ut_parcel_dto(3.0, 20.0, None)],
        delivery_method: "atl".to_string(),
    };
    let out = uc.execute(req).await;
    if let Err(OrderCreateUcError::ExternalProcessorError(_e, oid)) = out {
        assert!(!oid.is_empty());
        // the order row was written before the payment call failed
        assert!(create_seen.lock().unwrap().is_some());
    } else {
        panic!("expect external-processor error");
    }
}
