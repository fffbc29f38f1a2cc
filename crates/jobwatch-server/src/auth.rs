use subtle::ConstantTimeEq;

use crate::error::ApiError;

/// Compare the token Slack sent against the configured verification token.
///
/// Constant-time so response timing does not leak how much of a guess matched.
pub fn verify_token(expected: &str, provided: &str) -> Result<(), ApiError> {
    if expected.is_empty() {
        return Err(ApiError::Forbidden);
    }
    if bool::from(expected.as_bytes().ct_eq(provided.as_bytes())) {
        Ok(())
    } else {
        tracing::warn!("Rejected request with an invalid verification token");
        Err(ApiError::Forbidden)
    }
}
