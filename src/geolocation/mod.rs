//! Geolocation enrichment.
//!
//! This module provides:
//! - The [`GeoLocator`] seam over the external lookup service
//! - [`IpInfoLocator`], the ipinfo.io-compatible HTTP implementation
//! - The [`Enricher`], which resolves pending Record Store rows one at a time

mod enricher;
mod ipinfo;

use std::future::Future;

use serde::Serialize;

use crate::error_handling::GeolocationError;

pub use enricher::{Enricher, EnricherSettings, EnrichmentReport};
pub use ipinfo::IpInfoLocator;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Resolves an IP address to coordinates.
pub trait GeoLocator {
    fn locate(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Coordinates, GeolocationError>> + Send;
}

/// Parses a combined `"latitude,longitude"` location string.
///
/// # Errors
///
/// Returns [`GeolocationError::Malformed`] when the string is not two numbers
/// or the numbers are out of range.
pub fn parse_location(loc: &str) -> Result<Coordinates, GeolocationError> {
    let (lat, lon) = loc
        .split_once(',')
        .ok_or_else(|| GeolocationError::Malformed(format!("location {loc:?} has no comma")))?;

    let parse = |value: &str| {
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| GeolocationError::Malformed(format!("invalid coordinate {value:?}")))
    };
    let latitude = parse(lat)?;
    let longitude = parse(lon)?;

    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(GeolocationError::Malformed(format!(
            "coordinates out of range: {loc}"
        )));
    }

    Ok(Coordinates {
        latitude,
        longitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location() {
        assert_eq!(
            parse_location("37.4056,-122.0775").unwrap(),
            Coordinates {
                latitude: 37.4056,
                longitude: -122.0775,
            }
        );
        assert_eq!(
            parse_location(" -33.8688 , 151.2093 ").unwrap(),
            Coordinates {
                latitude: -33.8688,
                longitude: 151.2093,
            }
        );
    }

    #[test]
    fn test_parse_location_zero_is_valid() {
        let coords = parse_location("0.0000,0.0000").unwrap();
        assert_eq!(coords.latitude, 0.0);
        assert_eq!(coords.longitude, 0.0);
    }

    #[test]
    fn test_parse_location_malformed() {
        for loc in ["", "37.4", "a,b", "37.4,", ",1", "NaN,1", "91,0", "0,181", "1,2,3"] {
            assert!(
                matches!(parse_location(loc), Err(GeolocationError::Malformed(_))),
                "{loc:?} should be rejected"
            );
        }
    }
}
