mod mariadb;

use std::boxed::Box;
use std::io::ErrorKind;
use std::result::Result;
use std::sync::Arc;

use delivery_common::confidentiality::AbstractConfidentiality;
use delivery_common::config::{AppDataStoreCfg, AppDbServerType};
use delivery_common::error::AppErrorCode;
use delivery_common::logging::AppLogContext;

pub(crate) use mariadb::AppDStoreMariaDB;

#[derive(Debug)]
pub enum AppDStoreError {
    ConfidentialLoad(AppErrorCode, String),
    ConfidentialResolve(String),
    GetConnIo(ErrorKind, String),
    GetConnTls(String),
    GetConnDbDriver(String),
    GetConnDbServer(AppErrorCode, u16, String),
    GetConnUnclassified(AppErrorCode, String),
    BackendNotSupport,
}

pub struct AppDataStoreContext {
    _mariadb: Vec<Arc<AppDStoreMariaDB>>,
}

impl AppDataStoreContext {
    pub fn new(
        cfgs: &[AppDataStoreCfg],
        cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
        logctx: Arc<AppLogContext>,
    ) -> Result<Self, AppDStoreError> {
        let mut db_servers = Vec::new();
        for cfg in cfgs {
            match cfg {
                AppDataStoreCfg::InMemory(_c) => return Err(AppDStoreError::BackendNotSupport),
                AppDataStoreCfg::DbServer(c) => match c.srv_type {
                    AppDbServerType::MariaDB => {
                        let ds = AppDStoreMariaDB::try_build(c, cfdntl.clone(), logctx.clone())?;
                        db_servers.push(Arc::new(ds));
                    }
                    AppDbServerType::PostgreSQL => return Err(AppDStoreError::BackendNotSupport),
                },
            }
        }
        Ok(Self {
            _mariadb: db_servers,
        })
    }

    pub(crate) fn mariadb(&self, maybe_alias: Option<&str>) -> Option<Arc<AppDStoreMariaDB>> {
        let found = if let Some(a) = maybe_alias {
            self._mariadb.iter().find(|m| m.alias() == a)
        } else {
            self._mariadb.first()
        };
        found.map(Clone::clone)
    }
} // end of impl AppDataStoreContext
