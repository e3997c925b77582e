pub mod confidentiality;
pub mod config;
pub mod constant;
pub mod error;
pub mod logging;

use std::sync::Arc;

pub type WebApiPath = String;
pub(crate) type AppLogAlias = Arc<String>;

pub mod util {
    use crate::error::AppErrorCode;
    use std::result::Result;

    /// decode a hex string into raw octets, the input length has to be even,
    /// every 2 characters form one byte.
    pub fn hex_to_octet(src: &str) -> Result<Vec<u8>, (AppErrorCode, String)> {
        if src.len() % 2 != 0 {
            let detail = format!("hex-string-incorrect-size: {src}");
            return Err((AppErrorCode::InvalidInput, detail));
        }
        let mut out = Vec::with_capacity(src.len() >> 1);
        for idx in (0..src.len()).step_by(2) {
            let chunk = src
                .get(idx..idx + 2)
                .ok_or((AppErrorCode::InvalidInput, format!("no-chars-at-idx: {idx}")))?;
            let byte = u8::from_str_radix(chunk, 16).map_err(|_e| {
                (
                    AppErrorCode::InvalidInput,
                    format!("parse-char-at-idx: {chunk} , {idx}"),
                )
            })?;
            out.push(byte);
        }
        Ok(out)
    } // end of fn hex_to_octet
}
