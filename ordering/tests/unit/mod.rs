mod usecase;

use std::sync::Arc;

use delivery_common::config::AppLoggingCfg;
use delivery_common::logging::AppLogContext;

// loggers stay unconfigured in unit tests, events fall back to stdout
pub(crate) fn ut_logctx() -> Arc<AppLogContext> {
    let basepath = delivery_common::config::AppBasepathCfg {
        system: "/tmp".to_string(),
        service: "/tmp".to_string(),
    };
    let cfg = AppLoggingCfg {
        handlers: Vec::new(),
        loggers: Vec::new(),
    };
    Arc::new(AppLogContext::new(&basepath, &cfg))
}
