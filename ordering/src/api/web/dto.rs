use serde::{Deserialize, Serialize};

use crate::model::{
    ContactInfoModel, MilestoneProgress, RecipientInfoModel, TrackingMilestoneModel,
    TrackingStatusModel,
};

#[derive(Deserialize)]
pub struct ContactInfoDto {
    pub name: String,
    pub address: String,
    pub contact_number: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct RecipientInfoDto {
    pub name: String,
    pub address: String,
    pub contact_number: String,
    pub email: String,
    pub line1: String,
    pub line2: Option<String>,
    pub postal_code: String,
}

#[derive(Deserialize)]
pub struct ParcelReqDto {
    pub weight: f64,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    // per-parcel recipient, required when the request carries several parcels
    pub recipient: Option<RecipientInfoDto>,
}

#[derive(Deserialize)]
pub struct OrderCreateReqDto {
    pub sender: ContactInfoDto,
    pub recipient: Option<RecipientInfoDto>,
    pub parcels: Vec<ParcelReqDto>,
    pub delivery_method: String,
}

#[derive(Serialize)]
pub struct OrderCreateRespDto {
    pub order_id: String,
    pub amount: String,
    pub payment_url: String,
}

#[derive(Debug, Serialize)]
pub struct OrderCreateErrorDto {
    pub errors: Vec<String>,
}

#[derive(Serialize)]
pub struct WebhookAckDto {
    pub success: bool,
}

#[derive(Serialize)]
pub struct WebhookErrorDto {
    pub error: String,
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneProgressDto {
    Completed,
    Current,
    Upcoming,
}

#[derive(Serialize)]
pub struct TrackingMilestoneDto {
    pub name: String,
    pub status: MilestoneProgressDto,
    pub timestamp: Option<String>,
    pub description: String,
}

#[derive(Serialize)]
pub struct TrackingStatusRespDto {
    pub status: String,
    pub tracking_status: String,
    pub milestones: Vec<TrackingMilestoneDto>,
    pub last_updated: String,
}

impl From<ContactInfoDto> for ContactInfoModel {
    fn from(value: ContactInfoDto) -> Self {
        Self {
            name: value.name,
            address: value.address,
            contact_number: value.contact_number,
            email: value.email,
        }
    }
}

impl From<RecipientInfoDto> for RecipientInfoModel {
    fn from(value: RecipientInfoDto) -> Self {
        Self {
            contact: ContactInfoModel {
                name: value.name,
                address: value.address,
                contact_number: value.contact_number,
                email: value.email,
            },
            line1: value.line1,
            line2: value.line2,
            postal_code: value.postal_code,
        }
    }
}

impl From<MilestoneProgress> for MilestoneProgressDto {
    fn from(value: MilestoneProgress) -> Self {
        match value {
            MilestoneProgress::Completed => Self::Completed,
            MilestoneProgress::Current => Self::Current,
            MilestoneProgress::Upcoming => Self::Upcoming,
        }
    }
}

impl From<TrackingMilestoneModel> for TrackingMilestoneDto {
    fn from(value: TrackingMilestoneModel) -> Self {
        Self {
            name: value.name.to_string(),
            status: value.progress.into(),
            timestamp: value.timestamp,
            description: value.description.to_string(),
        }
    }
}

impl From<TrackingStatusModel> for TrackingStatusRespDto {
    fn from(value: TrackingStatusModel) -> Self {
        Self {
            status: value.status,
            tracking_status: value.tracking_status,
            milestones: value.milestones.into_iter().map(Into::into).collect(),
            last_updated: value.last_updated,
        }
    }
}
