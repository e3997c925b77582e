use std::collections::HashMap;
use std::env;
use std::result::Result;

use actix_web::rt;

use delivery_common::config::{AppCfgHardLimit, AppCfgInitArgs, AppConfig};
use delivery_common::constant::env_vars::EXPECTED_LABELS;
use delivery_common::logging::{app_log_event, AppLogLevel};

use ordering::api::web::AppRouteTable;
use ordering::network::{app_web_service, net_server_listener};
use ordering::{hard_limit, AppSharedState};

fn init_config() -> Result<AppConfig, ()> {
    let iter = env::vars().filter(|(k, _v)| EXPECTED_LABELS.contains(&k.as_str()));
    let env_var_map = HashMap::from_iter(iter);
    let limit = AppCfgHardLimit {
        nitems_per_inmem_table: hard_limit::MAX_ITEMS_PER_INMEM_TABLE,
        num_db_conns: hard_limit::MAX_DB_CONNECTIONS,
        seconds_db_idle: hard_limit::MAX_SECONDS_DB_IDLE,
    };
    let args = AppCfgInitArgs { env_var_map, limit };
    AppConfig::new(args).map_err(|e| {
        println!(
            "[ERROR] config failure, code:{:?}, detail:{:?}",
            e.code, e.detail
        );
    })
}

fn main() -> Result<(), ()> {
    let cfg = init_config()?;
    let shr_state = AppSharedState::new(cfg).map_err(|e| {
        println!("[ERROR] shared state init failure, {:?}", e);
    })?;
    let cfg = shr_state.config();
    let logctx = shr_state.log_context();
    let listen = &cfg.api_server.listen;
    let cfg_routes = listen
        .routes
        .iter()
        .map(|r| (r.path.clone(), r.handler.clone()))
        .collect::<Vec<_>>();
    let api_ver = listen.api_version.clone();
    let cors_origin = listen.cors.clone();
    /*
     * `App` instance is created on each server worker thread. To share the
     * same data between all `App` instances, initialize the data outside
     * the factory closure in `HttpServer::new(F)`, clone what the closure
     * needs to move in, by doing so the closure stays `Fn()` instead of
     * `FnOnce()`.
     *
     * https://docs.rs/actix-web/latest/actix_web/struct.App.html#shared-mutable-state
     * */
    let shr_state_factory = shr_state.clone();
    let logctx_factory = logctx.clone();
    let app_init = move || {
        let route_table = AppRouteTable::get(api_ver.as_str());
        let (app, num_applied) = app_web_service(
            route_table,
            cfg_routes.clone(),
            cors_origin.clone(),
            shr_state_factory.clone(),
        );
        if num_applied == 0 {
            let logctx_p = &logctx_factory;
            app_log_event!(logctx_p, AppLogLevel::ERROR, "no-route-applied");
        }
        app
    };
    let ht_srv = net_server_listener(app_init, listen.host.as_str(), listen.port)
        .workers(cfg.api_server.num_workers as usize)
        .max_connections(listen.max_connections as usize);
    app_log_event!(
        logctx,
        AppLogLevel::INFO,
        "web-server-starting, {}:{}",
        listen.host.as_str(),
        listen.port
    );
    let runner = rt::System::new();
    runner.block_on(ht_srv.run()).map_err(|e| {
        app_log_event!(logctx, AppLogLevel::ERROR, "web-server-exit, {:?}", e);
    })
} // end of fn main
