pub mod dto;
mod order;
mod track;
mod webhook;

use actix_http::Method;
use actix_web::{HttpResponse, Route};
use std::collections::HashMap;

use order::create_order;
use track::track_order_status;
use webhook::payment_webhook;

pub struct AppRouteTable {
    pub version: String,
    pub entries: HashMap<String, Route>,
} // note, figure out how do multiple versions of API endpoints co-exist

impl AppRouteTable {
    pub fn get(ver_req: &str) -> Self {
        let (version, entries) = match ver_req {
            "0.1.0" => (format!("v{ver_req}"), Self::v0_1_0_entries()),
            _others => (String::new(), HashMap::new()),
        };
        Self { version, entries }
    }
    fn v0_1_0_entries() -> HashMap<String, Route> {
        let data = [
            (
                "create_new_order".to_string(),
                Route::new().method(Method::POST).to(create_order),
            ),
            (
                "payment_webhook".to_string(),
                Route::new().method(Method::POST).to(payment_webhook),
            ),
            (
                "track_order_status".to_string(),
                Route::new().method(Method::GET).to(track_order_status),
            ),
        ];
        HashMap::from(data)
    }
} // end of impl AppRouteTable

fn resp_repo_init_failure() -> HttpResponse {
    HttpResponse::ServiceUnavailable()
        .append_header(actix_web::http::header::ContentType::plaintext())
        .body("")
}
