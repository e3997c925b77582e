use std::result::Result;

use mysql_async::prelude::FromValue;
use mysql_async::{Params, Row};
use rust_decimal::Decimal;

use delivery_common::error::AppErrorCode;

use super::super::AppRepoErrorDetail;
use super::{raw_column_to_datetime, DATETIME_FMT_P0F};
use crate::model::{
    BulkOrderModel, ContactInfoModel, OrderModel, OrderStatus, ParcelDimensions, ParcelModel,
    RecipientInfoModel,
};

pub(super) type RowParseError = (AppErrorCode, AppRepoErrorDetail);

struct InsertOrderArgs(String, Params);
struct InsertParcelArgs(String, Vec<Params>);
struct InsertBulkOrderArgs(String, Params);

/// statements and parameter lists covering one order aggregate,
/// executed in a single transaction
pub(super) struct InsertOrderTreeArgs(pub(super) Vec<(String, Vec<Params>)>);

impl<'a> From<&'a OrderModel> for InsertOrderArgs {
    fn from(value: &'a OrderModel) -> Self {
        let recipient = value.recipient.as_ref();
        let arg = vec![
            value.id.as_str().into(),
            value.sender.name.as_str().into(),
            value.sender.address.as_str().into(),
            value.sender.contact_number.as_str().into(),
            value.sender.email.as_str().into(),
            recipient.map(|r| r.contact.name.as_str()).into(),
            recipient.map(|r| r.contact.address.as_str()).into(),
            recipient.map(|r| r.contact.contact_number.as_str()).into(),
            recipient.map(|r| r.contact.email.as_str()).into(),
            recipient.map(|r| r.line1.as_str()).into(),
            recipient.and_then(|r| r.line2.as_deref()).into(),
            recipient.map(|r| r.postal_code.as_str()).into(),
            value.amount.into(),
            value.status.as_str().into(),
            value.delivery_method.as_str().into(),
            value.is_bulk_order.into(),
            value.detrack_id.as_deref().into(),
            value
                .create_time
                .format(DATETIME_FMT_P0F)
                .to_string()
                .into(),
        ];
        let params = Params::Positional(arg);
        let stmt = "INSERT INTO `orders`(`id`,`sender_name`,`sender_address`, \
            `sender_contact_number`,`sender_email`,`recipient_name`,`recipient_address`, \
            `recipient_contact_number`,`recipient_email`,`recipient_line1`,`recipient_line2`, \
            `recipient_postal_code`,`amount`,`status`,`delivery_method`,`is_bulk_order`, \
            `detrack_id`,`create_time`) VALUES (?,?,?,?,?, ?,?,?,?,?, ?,?,?,?,?, ?,?,?)";
        Self(stmt.to_string(), params)
    }
} // end of impl InsertOrderArgs

impl<'a> From<&'a [ParcelModel]> for InsertParcelArgs {
    fn from(value: &'a [ParcelModel]) -> Self {
        let params = value
            .iter()
            .map(|p| {
                let recipient = p.recipient.as_ref();
                let arg = vec![
                    p.id.as_str().into(),
                    p.order_id.as_str().into(),
                    p.bulk_order_id.as_deref().into(),
                    p.dimensions.weight.into(),
                    p.dimensions.length.into(),
                    p.dimensions.width.into(),
                    p.dimensions.height.into(),
                    recipient.map(|r| r.contact.name.as_str()).into(),
                    recipient.map(|r| r.contact.address.as_str()).into(),
                    recipient.map(|r| r.contact.contact_number.as_str()).into(),
                    recipient.map(|r| r.contact.email.as_str()).into(),
                    recipient.map(|r| r.line1.as_str()).into(),
                    recipient.and_then(|r| r.line2.as_deref()).into(),
                    recipient.map(|r| r.postal_code.as_str()).into(),
                    p.detrack_job_id.as_deref().into(),
                    p.detrack_item_id.as_deref().into(),
                    p.status.as_str().into(),
                ];
                Params::Positional(arg)
            })
            .collect::<Vec<_>>();
        let stmt = "INSERT INTO `parcels`(`id`,`order_id`,`bulk_order_id`,`weight`, \
            `length`,`width`,`height`,`recipient_name`,`recipient_address`, \
            `recipient_contact_number`,`recipient_email`,`recipient_line1`, \
            `recipient_line2`,`recipient_postal_code`,`detrack_job_id`, \
            `detrack_item_id`,`status`) VALUES (?,?,?,?,?, ?,?,?,?,?, ?,?,?,?,?, ?,?)";
        Self(stmt.to_string(), params)
    }
} // end of impl InsertParcelArgs

impl<'a> From<&'a BulkOrderModel> for InsertBulkOrderArgs {
    fn from(value: &'a BulkOrderModel) -> Self {
        let arg = vec![
            value.id.as_str().into(),
            value.order_id.as_str().into(),
            value.total_parcels.into(),
            value.total_weight.into(),
        ];
        let params = Params::Positional(arg);
        let stmt = "INSERT INTO `bulk_orders`(`id`,`order_id`,`total_parcels`, \
            `total_weight`) VALUES (?,?,?,?)";
        Self(stmt.to_string(), params)
    }
}

impl<'a, 'b, 'c> From<(&'a OrderModel, &'b [ParcelModel], Option<&'c BulkOrderModel>)>
    for InsertOrderTreeArgs
{
    fn from(value: (&'a OrderModel, &'b [ParcelModel], Option<&'c BulkOrderModel>)) -> Self {
        let (order, parcels, maybe_bulk) = value;
        let order_arg = InsertOrderArgs::from(order);
        let parcel_arg = InsertParcelArgs::from(parcels);
        let mut inner = vec![
            (order_arg.0, vec![order_arg.1]),
            (parcel_arg.0, parcel_arg.1),
        ];
        if let Some(b) = maybe_bulk {
            let bulk_arg = InsertBulkOrderArgs::from(b);
            inner.push((bulk_arg.0, vec![bulk_arg.1]));
        }
        Self(inner)
    }
} // end of impl InsertOrderTreeArgs

pub(super) const FETCH_ORDER_STMT: &str = "SELECT `id`,`sender_name`,`sender_address`, \
    `sender_contact_number`,`sender_email`,`recipient_name`,`recipient_address`, \
    `recipient_contact_number`,`recipient_email`,`recipient_line1`,`recipient_line2`, \
    `recipient_postal_code`,`amount`,`status`,`delivery_method`,`is_bulk_order`, \
    `detrack_id`,`create_time` FROM `orders` WHERE `id`=?";

pub(super) const FETCH_PARCELS_STMT: &str = "SELECT `id`,`order_id`,`bulk_order_id`, \
    `weight`,`length`,`width`,`height`,`recipient_name`,`recipient_address`, \
    `recipient_contact_number`,`recipient_email`,`recipient_line1`,`recipient_line2`, \
    `recipient_postal_code`,`detrack_job_id`,`detrack_item_id`,`status` \
    FROM `parcels` WHERE `order_id`=?";

pub(super) const FETCH_PARCEL_BY_ID_STMT: &str = "SELECT `id`,`order_id`,`bulk_order_id`, \
    `weight`,`length`,`width`,`height`,`recipient_name`,`recipient_address`, \
    `recipient_contact_number`,`recipient_email`,`recipient_line1`,`recipient_line2`, \
    `recipient_postal_code`,`detrack_job_id`,`detrack_item_id`,`status` \
    FROM `parcels` WHERE `id`=?";

// the short form shown to customers is the last 12 hex digits of the
// compact UUID, scanning on a derived column is acceptable at this scale
pub(super) const RESOLVE_SHORT_ID_STMT: &str =
    "SELECT `id` FROM `orders` WHERE RIGHT(REPLACE(`id`,'-',''),12)=? LIMIT 1";

fn take_column<T: FromValue>(row: &mut Row, idx: usize, col: &str) -> Result<T, RowParseError> {
    let outer = row.take_opt::<T, usize>(idx).ok_or_else(|| {
        (
            AppErrorCode::DataCorruption,
            AppRepoErrorDetail::DataRowParse(format!("missing-column: {col}")),
        )
    })?;
    outer.map_err(|e| {
        (
            AppErrorCode::DataCorruption,
            AppRepoErrorDetail::DataRowParse(format!("column-decode: {col}, {e}")),
        )
    })
}

fn recipient_from_columns(
    name: Option<String>,
    address: Option<String>,
    contact_number: Option<String>,
    email: Option<String>,
    line1: Option<String>,
    line2: Option<String>,
    postal_code: Option<String>,
) -> Option<RecipientInfoModel> {
    let contact = ContactInfoModel {
        name: name?,
        address: address.unwrap_or_default(),
        contact_number: contact_number.unwrap_or_default(),
        email: email.unwrap_or_default(),
    };
    Some(RecipientInfoModel {
        contact,
        line1: line1.unwrap_or_default(),
        line2,
        postal_code: postal_code.unwrap_or_default(),
    })
}

// the row is wider than the tuple-conversion limit in the driver, decode
// column by column instead
pub(super) fn order_from_row(mut row: Row) -> Result<OrderModel, RowParseError> {
    let id = take_column::<String>(&mut row, 0, "id")?;
    let sender = ContactInfoModel {
        name: take_column(&mut row, 1, "sender_name")?,
        address: take_column(&mut row, 2, "sender_address")?,
        contact_number: take_column(&mut row, 3, "sender_contact_number")?,
        email: take_column(&mut row, 4, "sender_email")?,
    };
    let recipient = recipient_from_columns(
        take_column(&mut row, 5, "recipient_name")?,
        take_column(&mut row, 6, "recipient_address")?,
        take_column(&mut row, 7, "recipient_contact_number")?,
        take_column(&mut row, 8, "recipient_email")?,
        take_column(&mut row, 9, "recipient_line1")?,
        take_column(&mut row, 10, "recipient_line2")?,
        take_column(&mut row, 11, "recipient_postal_code")?,
    );
    let amount = take_column::<Decimal>(&mut row, 12, "amount")?;
    let status_raw = take_column::<String>(&mut row, 13, "status")?;
    let mthd_raw = take_column::<String>(&mut row, 14, "delivery_method")?;
    let delivery_method = crate::model::DeliveryMethod::try_parse(mthd_raw.as_str()).ok_or((
        AppErrorCode::DataCorruption,
        AppRepoErrorDetail::DataRowParse(format!("delivery-method: {mthd_raw}")),
    ))?;
    let is_bulk_order = take_column::<bool>(&mut row, 15, "is_bulk_order")?;
    let detrack_id = take_column::<Option<String>>(&mut row, 16, "detrack_id")?;
    let ctime_raw = take_column::<mysql_async::Value>(&mut row, 17, "create_time")?;
    let create_time = raw_column_to_datetime(ctime_raw, 0)?;
    Ok(OrderModel {
        id,
        sender,
        recipient,
        amount,
        status: OrderStatus::from_stored(status_raw.as_str()),
        delivery_method,
        is_bulk_order,
        detrack_id,
        create_time,
    })
} // end of fn order_from_row

pub(super) fn parcel_from_row(mut row: Row) -> Result<ParcelModel, RowParseError> {
    let id = take_column::<String>(&mut row, 0, "id")?;
    let order_id = take_column::<String>(&mut row, 1, "order_id")?;
    let bulk_order_id = take_column::<Option<String>>(&mut row, 2, "bulk_order_id")?;
    let dimensions = ParcelDimensions {
        weight: take_column(&mut row, 3, "weight")?,
        length: take_column(&mut row, 4, "length")?,
        width: take_column(&mut row, 5, "width")?,
        height: take_column(&mut row, 6, "height")?,
    };
    let recipient = recipient_from_columns(
        take_column(&mut row, 7, "recipient_name")?,
        take_column(&mut row, 8, "recipient_address")?,
        take_column(&mut row, 9, "recipient_contact_number")?,
        take_column(&mut row, 10, "recipient_email")?,
        take_column(&mut row, 11, "recipient_line1")?,
        take_column(&mut row, 12, "recipient_line2")?,
        take_column(&mut row, 13, "recipient_postal_code")?,
    );
    let detrack_job_id = take_column::<Option<String>>(&mut row, 14, "detrack_job_id")?;
    let detrack_item_id = take_column::<Option<String>>(&mut row, 15, "detrack_item_id")?;
    let status_raw = take_column::<String>(&mut row, 16, "status")?;
    Ok(ParcelModel {
        id,
        order_id,
        bulk_order_id,
        dimensions,
        recipient,
        detrack_job_id,
        detrack_item_id,
        status: OrderStatus::from_stored(status_raw.as_str()),
    })
} // end of fn parcel_from_row
