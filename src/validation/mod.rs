// SPDX-License-Identifier: GPL-3.0-only
use serde::Serialize;
use thiserror::Error;

use crate::store::SpotInput;

/// Maximum license plate length, in characters
pub const MAX_LICENSE_PLATE_LENGTH: usize = 7;

const BLANK_MESSAGE: &str = "must not be blank";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// JSON name of the offending field
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation failed for {} field(s)", .0.len())]
pub struct ValidationErrors(pub Vec<FieldError>);

/// Validate a spot submission before it reaches the registry
///
/// Checks:
/// - Every field is present and not just whitespace
/// - The license plate fits in 7 characters
///
/// All violations are reported, not only the first one.
pub fn validate_spot_input(input: &SpotInput) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    let required = [
        ("parkingSpotNumber", &input.spot_number),
        ("licensePlateCar", &input.license_plate),
        ("brandCar", &input.brand),
        ("modelCar", &input.model),
        ("colorCar", &input.color),
        ("responsibleName", &input.responsible_name),
        ("apartment", &input.apartment),
        ("block", &input.block),
    ];
    for (field, value) in required {
        if is_blank(value) {
            errors.push(FieldError {
                field,
                message: BLANK_MESSAGE.to_string(),
            });
        }
    }

    // A blank plate was already reported above
    if !is_blank(&input.license_plate)
        && input.license_plate.chars().count() > MAX_LICENSE_PLATE_LENGTH
    {
        errors.push(FieldError {
            field: "licensePlateCar",
            message: format!("size must be between 0 and {}", MAX_LICENSE_PLATE_LENGTH),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
