use std::collections::HashMap;
use std::sync::Arc;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use delivery_common::confidentiality::AbstractConfidentiality;
use delivery_common::util::hex_to_octet;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_FIELD: &str = "hmac";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookAuthError {
    MissingSignature,
    MalformedSignature(String),
    Mismatch,
    CredentialMissing(String),
}

impl WebhookAuthError {
    /// short label safe to return to the caller, an absent header is
    /// reported apart from a digest that fails verification
    pub fn client_detail(&self) -> &'static str {
        match self {
            Self::MissingSignature => "missing signature",
            Self::MalformedSignature(_) | Self::Mismatch | Self::CredentialMissing(_) => {
                "invalid signature"
            }
        }
    }
}

/// Verifies payment-provider webhook payloads signed with HMAC-SHA256.
/// The signing salt is loaded once at startup from the confidentiality
/// store and kept in memory for the process lifetime.
pub struct AppWebhookAuth {
    _salt: Vec<u8>,
}

impl AppWebhookAuth {
    pub fn try_build(
        cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
        secret_path: &str,
    ) -> Result<Self, WebhookAuthError> {
        let serial = cfdntl
            .try_get_payload(secret_path)
            .map_err(|e| WebhookAuthError::CredentialMissing(e.detail))?;
        let salt = serial.trim_matches('"').as_bytes().to_vec();
        Ok(Self { _salt: salt })
    }

    /// Canonical signing payload, all fields except the signature itself,
    /// sorted by key ascending, each key immediately followed by its value,
    /// no separators in between.
    fn canonical_payload(fields: &HashMap<String, String>) -> String {
        let mut keys = fields
            .keys()
            .filter(|k| k.as_str() != SIGNATURE_FIELD)
            .collect::<Vec<_>>();
        keys.sort();
        keys.into_iter().fold(String::new(), |mut acc, k| {
            acc.push_str(k);
            acc.push_str(fields[k].as_str());
            acc
        })
    }

    pub fn verify(&self, fields: &HashMap<String, String>) -> Result<(), WebhookAuthError> {
        let sig_hex = fields
            .get(SIGNATURE_FIELD)
            .ok_or(WebhookAuthError::MissingSignature)?;
        let sig_octets = hex_to_octet(sig_hex.as_str())
            .map_err(|(_code, detail)| WebhookAuthError::MalformedSignature(detail))?;
        let payload = Self::canonical_payload(fields);
        #[allow(clippy::unwrap_used)]
        let mut mac = HmacSha256::new_from_slice(self._salt.as_slice()).unwrap();
        mac.update(payload.as_bytes());
        // constant-time comparison happens inside verify_slice
        mac.verify_slice(sig_octets.as_slice())
            .map_err(|_e| WebhookAuthError::Mismatch)
    } // end of fn verify
} // end of impl AppWebhookAuth

// end of mod tests
