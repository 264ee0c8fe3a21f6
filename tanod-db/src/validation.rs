//! Coordinate validation
//!
//! Rejected input is never written and never broadcast:
//!
//! 1. **Presence**: both `latitude` and `longitude` must be present
//! 2. **Type**: both must be JSON numbers (numeric strings are rejected)
//! 3. **Range**: finite, latitude in [-90, 90], longitude in [-180, 180]

use serde_json::Value;
use tanod_core::{GeoPoint, TrackingError, TrackingResult};
use tanod_core::constants::{MAX_LATITUDE, MAX_LONGITUDE, MIN_LATITUDE, MIN_LONGITUDE};

/// Validates a coordinate pair.
///
/// # Returns
/// The validated point, or `TrackingError::Validation` naming the bad field
pub fn validate_coordinates(latitude: f64, longitude: f64) -> TrackingResult<GeoPoint> {
    if !latitude.is_finite() || !(MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude) {
        return Err(TrackingError::Validation(format!(
            "latitude must be a finite number between {} and {}, got {}",
            MIN_LATITUDE, MAX_LATITUDE, latitude
        )));
    }
    if !longitude.is_finite() || !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude) {
        return Err(TrackingError::Validation(format!(
            "longitude must be a finite number between {} and {}, got {}",
            MIN_LONGITUDE, MAX_LONGITUDE, longitude
        )));
    }
    Ok(GeoPoint::new(latitude, longitude))
}

/// Extracts and validates `{latitude, longitude}` from an untyped report body.
pub fn coordinates_from_json(body: &Value) -> TrackingResult<GeoPoint> {
    let latitude = number_field(body, "latitude")?;
    let longitude = number_field(body, "longitude")?;
    validate_coordinates(latitude, longitude)
}

fn number_field(body: &Value, field: &str) -> TrackingResult<f64> {
    match body.get(field) {
        None | Some(Value::Null) => Err(TrackingError::Validation(format!("{} is required", field))),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| TrackingError::Validation(format!("{} is not representable", field))),
        Some(other) => Err(TrackingError::Validation(format!(
            "{} must be a number, got {}",
            field, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_coordinates() {
        let point = validate_coordinates(14.70, 121.05).unwrap();
        assert_eq!(point, GeoPoint::new(14.70, 121.05));
        assert!(validate_coordinates(-90.0, -180.0).is_ok());
        assert!(validate_coordinates(90.0, 180.0).is_ok());
    }

    #[test]
    fn test_out_of_range_and_non_finite() {
        assert!(matches!(
            validate_coordinates(91.0, 0.0),
            Err(TrackingError::Validation(_))
        ));
        assert!(validate_coordinates(0.0, 180.5).is_err());
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
        assert!(validate_coordinates(0.0, f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_json_missing_and_non_numeric() {
        let err = coordinates_from_json(&json!({"longitude": 121.05})).unwrap_err();
        assert!(err.to_string().contains("latitude is required"));

        let err = coordinates_from_json(&json!({"latitude": null, "longitude": 1.0})).unwrap_err();
        assert!(err.to_string().contains("latitude is required"));

        let err = coordinates_from_json(&json!({"latitude": "14.7", "longitude": 121.05})).unwrap_err();
        assert!(err.to_string().contains("latitude must be a number"));

        let err = coordinates_from_json(&json!({"latitude": 14.7, "longitude": true})).unwrap_err();
        assert!(err.to_string().contains("longitude must be a number"));
    }

    #[test]
    fn test_json_integer_coordinates_accepted() {
        let point = coordinates_from_json(&json!({"latitude": 14, "longitude": 121})).unwrap();
        assert_eq!(point, GeoPoint::new(14.0, 121.0));
    }
}
