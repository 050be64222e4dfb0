//! Range checks shared by exercise profiles, feedback tables and
//! analysis settings. Each returns `CoreError::Validation` naming the field.

use crate::error::CoreError;

/// Validate that a value falls within `[0.0, 1.0]`.
pub fn validate_unit_range(value: f64, name: &str) -> Result<(), CoreError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{name} must be between 0.0 and 1.0, got {value}"
        )));
    }
    Ok(())
}

/// Validate that an angle lies within `[0.0, 180.0]` degrees.
pub fn validate_angle_range(value: f64, name: &str) -> Result<(), CoreError> {
    if !(0.0..=180.0).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{name} must be between 0 and 180 degrees, got {value}"
        )));
    }
    Ok(())
}

/// Validate that a value is strictly positive (and not NaN).
pub fn validate_positive(value: f64, name: &str) -> Result<(), CoreError> {
    if value.is_nan() || value <= 0.0 {
        return Err(CoreError::Validation(format!(
            "{name} must be > 0, got {value}"
        )));
    }
    Ok(())
}
