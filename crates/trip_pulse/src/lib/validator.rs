//! # Request validation
//!
//! Turns a raw key/value parameter map into a [`TripRequest`]. Only presence
//! is checked; values are trimmed and otherwise passed through untouched.

use std::collections::HashMap;

use crate::{error::Error, types::TripRequest};

/// Required parameter names in the order they are reported.
pub const REQUIRED_PARAMS: [&str; 5] = [
    "destination",
    "startLocation",
    "duration",
    "tripType",
    "budget",
];

/// Validates the request parameters.
///
/// # Returns
/// * `Ok(TripRequest)` when all five parameters are present and non-blank.
/// * `Err(Error::InvalidRequest)` listing every missing or blank parameter.
pub fn validate(params: &HashMap<String, String>) -> Result<TripRequest, Error> {
    let value = |key: &str| {
        params
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    };

    let missing = REQUIRED_PARAMS
        .iter()
        .copied()
        .filter(|key| value(key).is_none())
        .collect::<Vec<_>>();

    if !missing.is_empty() {
        return Err(Error::InvalidRequest { missing });
    }

    let field = |key: &str| value(key).unwrap_or_default().to_string();

    Ok(TripRequest {
        destination: field("destination"),
        start_location: field("startLocation"),
        duration: field("duration"),
        trip_type: field("tripType"),
        budget: field("budget"),
    })
}
