use subtle::ConstantTimeEq;

use crate::error::ApiError;

/// Verify an `Authorization` header value against the configured API key.
///
/// The header must carry exactly `Bearer <token>`: a single space, a
/// non-empty token, scheme keyword matched case-insensitively. The token is
/// compared to the expected key over the full byte slices with
/// [`ConstantTimeEq`], so rejection cost does not depend on where the values
/// differ. A length mismatch short-circuits inside `ct_eq` and leaks only
/// the length, which is not secret.
pub fn verify_bearer(header: Option<&str>, expected_key: &str) -> Result<(), ApiError> {
    let raw = header
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;

    let (scheme, token) = raw
        .split_once(' ')
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header format".into()))?;

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() || token.contains(' ') {
        return Err(ApiError::Unauthorized(
            "Invalid Authorization header format".into(),
        ));
    }

    if token.as_bytes().ct_eq(expected_key.as_bytes()).unwrap_u8() == 0 {
        return Err(ApiError::Unauthorized("Invalid API key".into()));
    }

    Ok(())
}
