use serde::{Deserialize, Serialize};

use crate::model::DeliveryJobSnapshot;

pub(super) const RESOURCE_PATH_JOBS: &str = "/api/v2/dn/jobs";

/// the provider wraps every payload, both directions, in a `data` envelope
#[derive(Serialize)]
pub(super) struct JobEnvelope {
    pub data: DeliveryJobReq,
}

#[derive(Serialize)]
pub(super) struct DeliveryJobItemReq {
    pub description: String,
    pub quantity: u32,
    pub weight: f64,
}

#[derive(Serialize)]
pub(super) struct DeliveryJobReq {
    #[serde(rename = "type")]
    pub job_type: String,
    pub do_number: String,
    pub date: String,
    pub start_date: String,
    pub address: String,
    pub order_number: String,
    pub tracking_number: String,
    pub deliver_to_collect_from: String,
    pub phone_number: String,
    pub notify_email: String,
    pub address_1: String,
    pub address_2: String,
    pub postal_code: String,
    pub pick_up_from: String,
    pub pick_up_address: String,
    pub pick_up_contact: String,
    pub pick_up_email: String,
    pub sender_name: String,
    pub sender_phone_number: String,
    pub weight: f64,
    pub parcel_length: f64,
    pub parcel_width: f64,
    pub parcel_height: f64,
    pub instructions: String,
    pub service_type: String,
    pub webhook_url: String,
    pub items: Vec<DeliveryJobItemReq>,
}

#[derive(Deserialize)]
pub(super) struct CreatedJobItem {
    pub id: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct CreatedJob {
    pub id: String,
    #[serde(default)]
    pub items: Vec<CreatedJobItem>,
}

#[derive(Deserialize)]
pub(super) struct CreatedJobEnvelope {
    pub data: CreatedJob,
}

#[derive(Deserialize)]
pub(super) struct JobDetail {
    pub status: Option<String>,
    pub tracking_status: Option<String>,
    pub info_received_at: Option<String>,
    pub scheduled_at: Option<String>,
    pub out_for_delivery_at: Option<String>,
    pub pod_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct JobDetailEnvelope {
    pub data: Option<JobDetail>,
}

impl From<JobDetail> for DeliveryJobSnapshot {
    fn from(value: JobDetail) -> Self {
        Self {
            status: value.status,
            tracking_status: value.tracking_status,
            info_received_at: value.info_received_at,
            scheduled_at: value.scheduled_at,
            out_for_delivery_at: value.out_for_delivery_at,
            pod_at: value.pod_at,
            updated_at: value.updated_at,
        }
    }
}
