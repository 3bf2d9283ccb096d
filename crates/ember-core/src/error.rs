use thiserror::Error;

/// Structural configuration problems caught once at composition time.
/// Runtime misbehavior (missing bindings, out-of-range inputs) degrades
/// with clamping and warn-once logging instead of erroring.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("non-finite value for `{field}`: {value}")]
    NonFinite { field: &'static str, value: f32 },

    #[error("`{field}` must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("growth split must lie strictly inside (0, 1), got {0}")]
    SplitOutOfRange(f32),

    #[error("gaze volume height range inverted: min {min} > max {max}")]
    InvertedHeightRange { min: f32, max: f32 },
}

/// Rejects NaN and infinity; the runtime clamps everything else.
pub(crate) fn finite(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { field, value })
    }
}

pub(crate) fn positive(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    let value = finite(field, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}
