use std::collections::hash_map::RandomState;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use serde::de::{Error as DeserializeError, Expected};
use serde::Deserialize;

use crate::constant::{env_vars, logging as const_log};
use crate::error::{AppCfgError, AppErrorCode};
use crate::{AppLogAlias, WebApiPath};

#[derive(Deserialize, Debug)]
pub struct AppLogHandlerCfg {
    pub min_level: const_log::Level,
    pub destination: const_log::Destination,
    pub alias: AppLogAlias,
    pub path: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct AppLoggerCfg {
    pub alias: AppLogAlias,
    pub handlers: Vec<String>,
    pub level: Option<const_log::Level>,
}

#[derive(Deserialize, Debug)]
pub struct AppLoggingCfg {
    pub handlers: Vec<AppLogHandlerCfg>,
    pub loggers: Vec<AppLoggerCfg>,
}

#[derive(Deserialize, Debug)]
pub struct WebApiRouteCfg {
    pub path: WebApiPath,
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub handler: String,
}

impl std::fmt::Display for WebApiRouteCfg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "path:{}, handler:{}", self.path, self.handler)
    }
}

#[derive(Deserialize, Debug)]
pub struct WebApiListenCfg {
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub api_version: String,
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub cors: String,
    pub routes: Vec<WebApiRouteCfg>,
}

// endpoint of one third-party service this app talks to, the secret
// (API key, signing salt ... etc) is stored at `confidentiality_path`
// of the confidentiality handler, never in this config file.
#[derive(Deserialize, Debug)]
pub struct App3rdPartyCfg {
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub alias: String,
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub host: String,
    pub port: u16,
    pub confidentiality_path: String,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "source")]
pub enum AppConfidentialCfg {
    UserSpace {
        #[serde(deserialize_with = "jsn_deny_empty_string")]
        sys_path: String,
    },
}

#[allow(non_camel_case_types)]
#[derive(Deserialize, Debug, Clone)]
pub enum AppDbServerType {
    MariaDB,
    PostgreSQL,
}

#[derive(Deserialize, Debug)]
pub struct AppInMemoryDbCfg {
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub alias: String,
    pub max_items: u32,
}

#[derive(Deserialize, Debug)]
pub struct AppDbServerCfg {
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub alias: String,
    pub srv_type: AppDbServerType,
    pub max_conns: u32,
    pub acquire_timeout_secs: u16, // for acquiring connection from pool
    pub idle_timeout_secs: u16,
    pub confidentiality_path: String,
    pub db_name: String,
}

#[allow(non_camel_case_types)]
#[derive(Deserialize, Debug)]
#[serde(tag = "_type")]
pub enum AppDataStoreCfg {
    InMemory(AppInMemoryDbCfg),
    DbServer(AppDbServerCfg),
}

#[derive(Deserialize, Debug)]
pub struct ApiServerCfg {
    pub logging: AppLoggingCfg,
    pub listen: WebApiListenCfg,
    pub limit_req_body_in_bytes: usize,
    pub num_workers: u8,
    pub stack_sz_kb: u16,
    // public base URL of the storefront, the payment redirect / webhook
    // URLs handed to the payment provider are templated from it
    #[serde(deserialize_with = "jsn_deny_empty_string")]
    pub site_base_url: String,
    pub data_store: Vec<AppDataStoreCfg>,
    pub third_parties: Vec<Arc<App3rdPartyCfg>>,
    pub confidentiality: AppConfidentialCfg,
}

pub struct AppBasepathCfg {
    pub system: String,
    pub service: String,
}

pub struct AppConfig {
    pub basepath: AppBasepathCfg,
    pub api_server: ApiServerCfg,
}

pub struct AppCfgHardLimit {
    pub nitems_per_inmem_table: u32,
    pub num_db_conns: u32,
    pub seconds_db_idle: u16,
}
pub struct AppCfgInitArgs {
    pub env_var_map: HashMap<String, String, RandomState>,
    pub limit: AppCfgHardLimit,
}

fn cfg_err(code: AppErrorCode, detail: Option<String>) -> AppCfgError {
    AppCfgError { code, detail }
}

impl AppConfig {
    pub fn new(args: AppCfgInitArgs) -> DefaultResult<Self, AppCfgError> {
        let (mut env_var_map, limit) = (args.env_var_map, args.limit);
        let sys_basepath = env_var_map
            .remove(env_vars::SYS_BASEPATH)
            .map(|s| s + "/")
            .ok_or_else(|| cfg_err(AppErrorCode::MissingSysBasePath, None))?;
        let app_basepath = env_var_map
            .remove(env_vars::SERVICE_BASEPATH)
            .map(|s| s + "/")
            .ok_or_else(|| cfg_err(AppErrorCode::MissingAppBasePath, None))?;
        let cfg_rel_path = env_var_map
            .remove(env_vars::CFG_FILEPATH)
            .ok_or_else(|| cfg_err(AppErrorCode::MissingConfigPath, None))?;
        let fullpath = app_basepath.clone() + &cfg_rel_path;
        let api_srv_cfg = Self::parse_from_file(fullpath, limit)?;
        Ok(Self {
            api_server: api_srv_cfg,
            basepath: AppBasepathCfg {
                system: sys_basepath,
                service: app_basepath,
            },
        })
    } // end of fn new

    pub fn parse_from_file(
        filepath: String,
        limit: AppCfgHardLimit,
    ) -> DefaultResult<ApiServerCfg, AppCfgError> {
        let fileobj = File::open(filepath)
            .map_err(|e| cfg_err(AppErrorCode::IOerror(e.kind()), Some(e.to_string())))?;
        let reader = BufReader::new(fileobj);
        let jsnobj = serde_json::from_reader::<BufReader<File>, ApiServerCfg>(reader)
            .map_err(|e| cfg_err(AppErrorCode::InvalidJsonFormat, Some(e.to_string())))?;
        Self::_check_web_listener(&jsnobj.listen)?;
        Self::_check_logging(&jsnobj.logging)?;
        Self::_check_datastore(&jsnobj.data_store, limit)?;
        Self::_check_third_parties(&jsnobj.third_parties)?;
        Ok(jsnobj)
    }

    fn _check_web_listener(obj: &WebApiListenCfg) -> DefaultResult<(), AppCfgError> {
        let mut non_numeric = obj
            .api_version
            .split('.')
            .filter(|tok| tok.parse::<u16>().is_err());
        let mut incomplete_routes = obj
            .routes
            .iter()
            .filter(|i| i.path.is_empty() || i.handler.is_empty());
        if obj.routes.is_empty() {
            Err(cfg_err(AppErrorCode::NoRouteApiServerCfg, None))
        } else if non_numeric.next().is_some() {
            let msg = "version must be numeric".to_string();
            Err(cfg_err(AppErrorCode::InvalidVersion, Some(msg)))
        } else if let Some(badroute) = incomplete_routes.next() {
            Err(cfg_err(
                AppErrorCode::InvalidRouteConfig,
                Some(badroute.to_string()),
            ))
        } else {
            Ok(())
        }
    } // end of fn _check_web_listener

    fn _check_logging(obj: &AppLoggingCfg) -> DefaultResult<(), AppCfgError> {
        if obj.handlers.is_empty() {
            return Err(cfg_err(AppErrorCode::NoLogHandlerCfg, None));
        }
        if obj.loggers.is_empty() {
            return Err(cfg_err(AppErrorCode::NoLoggerCfg, None));
        }
        if obj.handlers.iter().any(|item| item.alias.is_empty()) {
            return Err(cfg_err(AppErrorCode::MissingAliasLogHdlerCfg, None));
        }
        if obj.loggers.iter().any(|item| item.alias.is_empty()) {
            return Err(cfg_err(AppErrorCode::MissingAliasLoggerCfg, None));
        }
        if let Some(alogger) = obj.loggers.iter().find(|item| item.handlers.is_empty()) {
            let msg = format!("the logger does not have handler: {}", alogger.alias);
            return Err(cfg_err(AppErrorCode::NoHandlerInLoggerCfg, Some(msg)));
        }
        // for file-type handler, the field `path` has to be always present
        let mut pathless_files = obj.handlers.iter().filter(|item| {
            matches!(item.destination, const_log::Destination::LOCALFS) && item.path.is_none()
        });
        if let Some(hdlr) = pathless_files.next() {
            let msg = format!("file-type handler does not contain path: {}", hdlr.alias);
            return Err(cfg_err(AppErrorCode::InvalidHandlerLoggerCfg, Some(msg)));
        }
        let known_aliases: HashSet<&str> =
            HashSet::from_iter(obj.handlers.iter().map(|i| i.alias.as_str()));
        let mut dangling = obj.loggers.iter().filter(|item| {
            item.handlers
                .iter()
                .any(|a| !known_aliases.contains(a.as_str()))
        });
        if let Some(alogger) = dangling.next() {
            let msg = format!(
                "the logger contains invalid handler alias: {}",
                alogger.alias
            );
            return Err(cfg_err(AppErrorCode::InvalidHandlerLoggerCfg, Some(msg)));
        }
        Ok(())
    } // end of fn _check_logging

    fn _check_datastore(
        obj: &[AppDataStoreCfg],
        limit: AppCfgHardLimit,
    ) -> DefaultResult<(), AppCfgError> {
        if obj.is_empty() {
            return Err(cfg_err(AppErrorCode::NoDatabaseCfg, None));
        }
        for item in obj {
            match item {
                AppDataStoreCfg::InMemory(c) => {
                    let lmt = limit.nitems_per_inmem_table;
                    if c.max_items > lmt {
                        let msg = format!("limit:{}", lmt);
                        return Err(cfg_err(AppErrorCode::ExceedingMaxLimit, Some(msg)));
                    }
                }
                AppDataStoreCfg::DbServer(c) => {
                    if c.max_conns > limit.num_db_conns {
                        let msg = format!("limit-conn:{}", limit.num_db_conns);
                        return Err(cfg_err(AppErrorCode::ExceedingMaxLimit, Some(msg)));
                    }
                    if c.idle_timeout_secs > limit.seconds_db_idle {
                        let msg = format!("limit-idle-time:{}", limit.seconds_db_idle);
                        return Err(cfg_err(AppErrorCode::ExceedingMaxLimit, Some(msg)));
                    }
                }
            }
        } // end of loop
        Ok(())
    } // end of fn _check_datastore

    fn _check_third_parties(obj: &[Arc<App3rdPartyCfg>]) -> DefaultResult<(), AppCfgError> {
        let mut uniq = HashSet::new();
        for item in obj {
            if !uniq.insert(item.alias.as_str()) {
                let msg = format!("duplicate third-party alias: {}", item.alias);
                return Err(cfg_err(AppErrorCode::No3rdPartyCfg, Some(msg)));
            }
        }
        Ok(())
    }
} // end of impl AppConfig

struct ExpectNonEmptyString {
    min_len: u32,
}

impl Expected for ExpectNonEmptyString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        let msg = format!("minimum string length >= {}", self.min_len);
        formatter.write_str(msg.as_str())
    }
}

fn jsn_deny_empty_string<'de, D>(raw: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(raw)?;
    if s.is_empty() {
        let exp = ExpectNonEmptyString { min_len: 1 };
        Err(DeserializeError::invalid_length(0, &exp))
    } else {
        Ok(s)
    }
}
