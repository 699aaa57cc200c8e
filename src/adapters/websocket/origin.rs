//! Origin policy for upgrade requests.

use axum::http::{header, HeaderMap};

use crate::domain::relay::UpgradeError;

/// Accepts exactly one `Origin` value.
///
/// The comparison is byte-for-byte: no case folding, no trimming, no
/// wildcards. A missing header is rejected just like a wrong one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginPolicy {
    allowed: String,
}

impl OriginPolicy {
    pub fn new(allowed: impl Into<String>) -> Self {
        Self {
            allowed: allowed.into(),
        }
    }

    pub fn allowed(&self) -> &str {
        &self.allowed
    }

    /// Checks the first `Origin` header of a request.
    pub fn check(&self, headers: &HeaderMap) -> Result<(), UpgradeError> {
        let presented = headers
            .get(header::ORIGIN)
            .ok_or(UpgradeError::MissingOrigin)?;

        if presented.as_bytes() == self.allowed.as_bytes() {
            Ok(())
        } else {
            Err(UpgradeError::OriginMismatch {
                presented: String::from_utf8_lossy(presented.as_bytes()).into_owned(),
            })
        }
    }
}
