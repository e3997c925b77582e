mod create_order;
mod create_shipment;
mod process_webhook;
mod track_status;

pub use create_order::{OrderCreateUcError, OrderCreateUseCase, OrderCreatedOk};
pub use create_shipment::{ShipmentJobResult, ShipmentJobUcError, ShipmentJobUseCase};
pub use process_webhook::{PaymentWebhookUcError, PaymentWebhookUseCase, WebhookOutcome};
pub use track_status::{TrackStatusUcError, TrackStatusUseCase};
