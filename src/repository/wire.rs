//! Wire types for the admin backend's JSON response envelope.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{FieldError, RepositoryError};

/// Response envelope every backend operation uses: a success flag, an
/// optional human-readable message, optional field-level errors, and the
/// payload on success.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<Vec<FieldError>>,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Converts a parsed envelope into the operation result. A rejected
    /// envelope becomes [`RepositoryError::Rejected`] carrying the
    /// backend's message and any per-field errors verbatim.
    pub(crate) fn into_result(self) -> Result<Option<T>, RepositoryError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(RepositoryError::Rejected {
                message: self
                    .message
                    .unwrap_or_else(|| "operation failed".to_owned()),
                field_errors: self.errors.unwrap_or_default(),
            })
        }
    }
}

/// Parses a response body as an envelope. A body that is not the expected
/// shape falls back to a plain status error for non-2xx responses.
pub(crate) fn parse_envelope<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
) -> Result<Envelope<T>, RepositoryError> {
    match serde_json::from_slice(body) {
        Ok(envelope) => Ok(envelope),
        Err(err) if status.is_success() => Err(RepositoryError::InvalidBody(err.to_string())),
        Err(_) => Err(RepositoryError::HttpStatus(status.as_u16())),
    }
}
