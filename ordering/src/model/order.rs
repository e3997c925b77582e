use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use uuid::Uuid;

use delivery_common::constant::order_ref as ref_patterns;

use super::pricing::ParcelDimensions;

// marker saved in `detrack_id` of a bulk order once per-parcel jobs were
// created, status lookups seeing it must consult the parcels instead
pub const BULK_ORDER_SENTINEL_JOB_ID: &str = "BULK_ORDER_MULTIPLE_JOBS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMethod {
    Atl,
    HandToHand,
}

impl DeliveryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Atl => "atl",
            Self::HandToHand => "hand-to-hand",
        }
    }

    pub fn try_parse(raw: &str) -> Option<Self> {
        match raw {
            "atl" => Some(Self::Atl),
            "hand-to-hand" => Some(Self::HandToHand),
            _others => None,
        }
    }
}

/// closed set of lifecycle states, provider-reported statuses not mapped
/// yet are preserved verbatim in the escape hatch variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Paid,
    Other(String),
}

impl OrderStatus {
    // the payment provider reports `completed` on a successful charge,
    // internally that is the `paid` state. Status matching is
    // case-insensitive, anything unknown is stored lower-cased as-is.
    pub fn from_provider(raw: &str) -> Self {
        let normalized = raw.to_lowercase();
        match normalized.as_str() {
            "completed" | "paid" => Self::Paid,
            "pending" => Self::Pending,
            _others => Self::Other(normalized),
        }
    }

    pub fn from_stored(raw: &str) -> Self {
        match raw {
            "pending" => Self::Pending,
            "paid" => Self::Paid,
            _others => Self::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Other(s) => s.as_str(),
        }
    }
} // end of impl OrderStatus

#[derive(Debug, Clone)]
pub struct ContactInfoModel {
    pub name: String,
    pub address: String,
    pub contact_number: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct RecipientInfoModel {
    pub contact: ContactInfoModel,
    pub line1: String,
    pub line2: Option<String>,
    pub postal_code: String,
}

#[derive(Debug, Clone)]
pub struct OrderModel {
    pub id: String, // UUID, doubles as payment reference and delivery DO number
    pub sender: ContactInfoModel,
    pub recipient: Option<RecipientInfoModel>, // absent on bulk orders
    pub amount: Decimal,
    pub status: OrderStatus,
    pub delivery_method: DeliveryMethod,
    pub is_bulk_order: bool,
    pub detrack_id: Option<String>,
    pub create_time: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ParcelModel {
    pub id: String,
    pub order_id: String,
    pub bulk_order_id: Option<String>,
    pub dimensions: ParcelDimensions,
    // bulk orders carry one recipient per parcel, single-recipient orders
    // keep the block on the order row instead
    pub recipient: Option<RecipientInfoModel>,
    pub detrack_job_id: Option<String>,
    pub detrack_item_id: Option<String>,
    pub status: OrderStatus,
}

#[derive(Debug, Clone)]
pub struct BulkOrderModel {
    pub id: String,
    pub order_id: String,
    pub total_parcels: u32,
    pub total_weight: f64,
}

impl OrderModel {
    pub fn create(
        sender: ContactInfoModel,
        recipient: Option<RecipientInfoModel>,
        amount: Decimal,
        delivery_method: DeliveryMethod,
        is_bulk_order: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
            recipient,
            amount,
            status: OrderStatus::Pending,
            delivery_method,
            is_bulk_order,
            detrack_id: None,
            create_time: Utc::now(),
        }
    }

    pub fn short_id(&self) -> String {
        short_id_of(self.id.as_str())
    }
}

impl ParcelModel {
    pub fn create(
        order_id: &str,
        bulk_order_id: Option<&str>,
        dimensions: ParcelDimensions,
        recipient: Option<RecipientInfoModel>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            bulk_order_id: bulk_order_id.map(ToString::to_string),
            dimensions,
            recipient,
            detrack_job_id: None,
            detrack_item_id: None,
            status: OrderStatus::Pending,
        }
    }
}

impl BulkOrderModel {
    pub fn from_parcels(order_id: &str, parcels: &[ParcelModel]) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            total_parcels: parcels.len() as u32,
            total_weight: parcels.iter().map(|p| p.dimensions.weight).sum(),
        }
    }
}

/// the shape of an order reference a caller handed in, resolved once at
/// the entry of any lookup path
#[derive(Debug, PartialEq, Eq)]
pub enum OrderIdRef {
    Full(String),
    Short(String),
}

impl OrderIdRef {
    /// accepts a short id (trailing 12 hex chars), a compact 32-char UUID
    /// or the canonical hyphenated form, anything else is rejected
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned: String = raw
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect();
        let re_short = Regex::new(ref_patterns::REGEX_SHORT_ID).unwrap();
        let re_compact = Regex::new(ref_patterns::REGEX_UUID_COMPACT).unwrap();
        let re_full = Regex::new(ref_patterns::REGEX_UUID_HYPHENATED).unwrap();
        if re_short.is_match(cleaned.as_str()) {
            Some(Self::Short(cleaned.to_lowercase()))
        } else if re_compact.is_match(cleaned.as_str()) {
            let lo = cleaned.to_lowercase();
            let parts = [&lo[0..8], &lo[8..12], &lo[12..16], &lo[16..20], &lo[20..]];
            Some(Self::Full(parts.join("-")))
        } else if re_full.is_match(cleaned.as_str()) {
            Some(Self::Full(cleaned.to_lowercase()))
        } else {
            None
        }
    }
} // end of impl OrderIdRef

/// trailing 12 hex characters of the compact UUID form
pub fn short_id_of(full_id: &str) -> String {
    let compact: String = full_id.chars().filter(|c| *c != '-').collect();
    let start = compact.len().saturating_sub(12);
    compact[start..].to_lowercase()
}
