use std::fs::File;
use std::io::BufReader;
use std::result::Result as DefaultResult;

use serde_json::Value as JsnVal;

use super::AbstractConfidentiality;
use crate::error::{AppConfidentialityError, AppErrorCode};

// secrets stored in a plain JSON file somewhere in the local file system,
// a record is addressed by slash-separated object keys / array indexes,
// e.g. `backend_apps/databases/store_front/PASSWORD`
pub struct UserSpaceConfidentiality {
    _fullpath: String,
}

impl UserSpaceConfidentiality {
    pub fn build(fullpath: String) -> Self {
        Self {
            _fullpath: fullpath,
        }
    }

    fn _load_whole(&self) -> DefaultResult<JsnVal, AppConfidentialityError> {
        let fileobj =
            File::open(self._fullpath.as_str()).map_err(|e| AppConfidentialityError {
                code: AppErrorCode::IOerror(e.kind()),
                detail: e.to_string(),
            })?;
        let reader = BufReader::new(fileobj);
        serde_json::from_reader::<BufReader<File>, JsnVal>(reader).map_err(|e| {
            AppConfidentialityError {
                code: AppErrorCode::InvalidJsonFormat,
                detail: e.to_string(),
            }
        })
    }

    fn _resolve<'a>(
        node: &'a JsnVal,
        token: &str,
    ) -> DefaultResult<&'a JsnVal, AppConfidentialityError> {
        let found = match node {
            JsnVal::Object(map) => map.get(token),
            JsnVal::Array(elms) => token.parse::<usize>().ok().and_then(|idx| elms.get(idx)),
            _others => None,
        };
        found.ok_or(AppConfidentialityError {
            code: AppErrorCode::NoConfidentialityCfg,
            detail: format!("missing entry `{}` in object / array node", token),
        })
    }
} // end of impl UserSpaceConfidentiality

impl AbstractConfidentiality for UserSpaceConfidentiality {
    fn try_get_payload(&self, id_: &str) -> DefaultResult<String, AppConfidentialityError> {
        let whole = self._load_whole()?;
        let mut node = &whole;
        for token in id_.split('/').filter(|t| !t.is_empty()) {
            node = Self::_resolve(node, token)?;
        }
        Ok(node.to_string())
    }
}
