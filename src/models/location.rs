//! Resolved location model

use serde::{Deserialize, Serialize};

/// A place resolved by the geocoder
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeocodeResult {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// "Name, Region, Country" or "Coordinates: lat, lon"
    pub display_name: String,
    /// Index of the chosen candidate in the provider's list
    pub source_rank: usize,
}

impl GeocodeResult {
    /// Result for literal coordinate input
    #[must_use]
    pub fn from_coordinates(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            display_name: format!("Coordinates: {latitude:.4}, {longitude:.4}"),
            source_rank: 0,
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Parse `"lat,lon"` input. Exactly one comma, both parts floats, both in range.
#[must_use]
pub fn parse_coordinates(input: &str) -> Option<(f64, f64)> {
    let (lat, lon) = input.split_once(',')?;
    if lon.contains(',') {
        return None;
    }
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
        Some((lat, lon))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_from_coordinates_display_name() {
        let result = GeocodeResult::from_coordinates(55.953_251, -3.188_267);
        assert_eq!(result.display_name, "Coordinates: 55.9533, -3.1883");
        assert_eq!(result.source_rank, 0);
        assert_eq!(result.format_coordinates(), "55.9533, -3.1883");
    }

    #[rstest]
    #[case("55.9533,-3.1883", Some((55.9533, -3.1883)))]
    #[case(" 57.2 , -3.83 ", Some((57.2, -3.83)))]
    #[case("-90,180", Some((-90.0, 180.0)))]
    #[case("91.0,0.0", None)]
    #[case("0.0,-180.5", None)]
    #[case("1,2,3", None)]
    #[case("Edinburgh", None)]
    #[case("Fort William, Scotland", None)]
    #[case("", None)]
    fn test_parse_coordinates(#[case] input: &str, #[case] expected: Option<(f64, f64)>) {
        assert_eq!(parse_coordinates(input), expected);
    }
}
