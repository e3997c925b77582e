use chrono::{FixedOffset, Utc};

// delivery operations run on Singapore time (UTC+8)
const SG_UTC_OFFSET_SECS: i32 = 8 * 3600;

pub fn singapore_now_rfc3339() -> String {
    let tz = FixedOffset::east_opt(SG_UTC_OFFSET_SECS).unwrap();
    Utc::now().with_timezone(&tz).to_rfc3339()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneProgress {
    Completed,
    Current,
    Upcoming,
}

#[derive(Debug, Clone)]
pub struct TrackingMilestoneModel {
    pub name: &'static str,
    pub progress: MilestoneProgress,
    pub timestamp: Option<String>,
    pub description: &'static str,
}

/// raw per-job record consumed from the delivery-tracking provider,
/// timestamps are passed through verbatim
#[derive(Debug, Default, Clone)]
pub struct DeliveryJobSnapshot {
    pub status: Option<String>,
    pub tracking_status: Option<String>,
    pub info_received_at: Option<String>,
    pub scheduled_at: Option<String>,
    pub out_for_delivery_at: Option<String>,
    pub pod_at: Option<String>,
    pub updated_at: Option<String>,
}

pub struct TrackingStatusModel {
    pub status: String,
    pub tracking_status: String,
    pub milestones: Vec<TrackingMilestoneModel>,
    pub last_updated: String,
}

impl TrackingStatusModel {
    /// placeholder shown while the order is paid but no delivery job has
    /// been assigned yet, lets the frontend keep polling smoothly
    pub fn not_yet_tracked() -> Self {
        let sg_time = singapore_now_rfc3339();
        let milestones = vec![
            TrackingMilestoneModel {
                name: "Order Received",
                progress: MilestoneProgress::Completed,
                timestamp: Some(sg_time.clone()),
                description: "Your order has been received and is being processed",
            },
            TrackingMilestoneModel {
                name: "Tracking Setup",
                progress: MilestoneProgress::Current,
                timestamp: None,
                description: "Waiting for tracking ID to be assigned",
            },
            TrackingMilestoneModel {
                name: "Out for Delivery",
                progress: MilestoneProgress::Upcoming,
                timestamp: None,
                description: "Your order will be out for delivery soon",
            },
            TrackingMilestoneModel {
                name: "Delivered",
                progress: MilestoneProgress::Upcoming,
                timestamp: None,
                description: "Your order will be delivered soon",
            },
        ];
        Self {
            status: "detrack_missing".to_string(),
            tracking_status: "Tracking ID Missing".to_string(),
            milestones,
            last_updated: sg_time,
        }
    } // end of fn not_yet_tracked

    /// maps the provider's raw milestone timestamps onto the fixed 4-stage
    /// list. Scanning from the last stage backward, a stage with a
    /// timestamp is `completed` unless a later `current` was already
    /// assigned, the first stage lacking a timestamp right after a stamped
    /// one becomes `current`.
    pub fn from_job_snapshot(job: DeliveryJobSnapshot) -> Self {
        let fallback_now = Utc::now().to_rfc3339();
        let mut milestones = vec![
            TrackingMilestoneModel {
                name: "Order Received",
                progress: MilestoneProgress::Completed,
                timestamp: job.info_received_at.or(Some(fallback_now.clone())),
                description: "Your order has been received and is being processed",
            },
            TrackingMilestoneModel {
                name: "Preparing for Shipment",
                progress: MilestoneProgress::Upcoming,
                timestamp: job.scheduled_at,
                description: "Your order is being prepared for shipment",
            },
            TrackingMilestoneModel {
                name: "Out for Delivery",
                progress: MilestoneProgress::Upcoming,
                timestamp: job.out_for_delivery_at,
                description: "Your order is out for delivery",
            },
            TrackingMilestoneModel {
                name: "Delivered",
                progress: MilestoneProgress::Upcoming,
                timestamp: job.pod_at,
                description: "Your order has been delivered",
            },
        ];
        let mut current_found = false;
        for idx in (0..milestones.len()).rev() {
            if milestones[idx].timestamp.is_some() {
                if !current_found {
                    milestones[idx].progress = MilestoneProgress::Completed;
                }
            } else if !current_found && idx > 0 && milestones[idx - 1].timestamp.is_some() {
                milestones[idx].progress = MilestoneProgress::Current;
                current_found = true;
            }
        }
        Self {
            status: job.status.unwrap_or_else(|| "processing".to_string()),
            tracking_status: job
                .tracking_status
                .unwrap_or_else(|| "Order received".to_string()),
            milestones,
            last_updated: job.updated_at.unwrap_or(fallback_now),
        }
    } // end of fn from_job_snapshot
} // end of impl TrackingStatusModel
