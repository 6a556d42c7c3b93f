use crate::errors::ServiceError;
use validator::Validate;

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input
        .validate()
        .map_err(|e| ServiceError::ValidationError(format!("Validation failed: {e}")))
}

/// Clamp a per-page limit to something the database should be asked for.
pub fn clamp_limit(limit: u64) -> u64 {
    limit.clamp(1, 200)
}
