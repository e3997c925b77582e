mod userspace;

use std::boxed::Box;
use std::marker::{Send, Sync};
use std::result::Result as DefaultResult;

use crate::config::{AppConfidentialCfg, AppConfig};
use crate::error::AppConfidentialityError;

pub use userspace::UserSpaceConfidentiality;

/// read-only access to secret material kept outside the main config
/// file, entries are addressed by a path-style identifier
pub trait AbstractConfidentiality: Send + Sync {
    fn try_get_payload(&self, id_: &str) -> DefaultResult<String, AppConfidentialityError>;
}

pub fn build_context(
    cfg: &AppConfig,
) -> DefaultResult<Box<dyn AbstractConfidentiality>, AppConfidentialityError> {
    match &cfg.api_server.confidentiality {
        AppConfidentialCfg::UserSpace { sys_path } => {
            // the store location in config is relative to the system base path
            let fullpath = cfg.basepath.system.clone() + sys_path;
            Ok(Box::new(UserSpaceConfidentiality::build(fullpath)))
        }
    }
}
