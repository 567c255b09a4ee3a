//! Encoded polyline decoding (precision 5)

use haversine::{Location as HaversineLocation, Units, distance};

const PRECISION: f64 = 1e5;

/// Decode an encoded polyline into `(lat, lon)` pairs.
///
/// Each point is the running sum of every delta read so far. Malformed input
/// (characters below `?`, a value cut off mid-chunk, a latitude without its
/// longitude, a running sum past `i64`) yields an empty path rather than an error.
#[must_use]
pub fn decode(encoded: &str) -> Vec<(f64, f64)> {
    try_decode(encoded).unwrap_or_default()
}

fn try_decode(encoded: &str) -> Option<Vec<(f64, f64)>> {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;
    let mut points = Vec::new();

    while index < bytes.len() {
        lat = lat.checked_add(next_value(bytes, &mut index)?)?;
        lon = lon.checked_add(next_value(bytes, &mut index)?)?;
        points.push((lat as f64 / PRECISION, lon as f64 / PRECISION));
    }

    Some(points)
}

/// Read one zig-zag encoded delta starting at `index`
fn next_value(bytes: &[u8], index: &mut usize) -> Option<i64> {
    let mut result: i64 = 0;
    let mut shift = 0u32;

    loop {
        let byte = *bytes.get(*index)?;
        *index += 1;
        let chunk = i64::from(byte.checked_sub(63)?);
        if shift > 60 {
            return None;
        }
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk & 0x20 == 0 {
            break;
        }
    }

    Some(if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

/// Length of a decoded path in kilometres
#[must_use]
pub fn path_length_km(points: &[(f64, f64)]) -> f64 {
    points
        .windows(2)
        .map(|pair| {
            let from = HaversineLocation {
                latitude: pair[0].0,
                longitude: pair[0].1,
            };
            let to = HaversineLocation {
                latitude: pair[1].0,
                longitude: pair[1].1,
            };
            distance(from, to, Units::Kilometers)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: (f64, f64), expected: (f64, f64)) {
        assert!((actual.0 - expected.0).abs() < 1e-9, "{actual:?} != {expected:?}");
        assert!((actual.1 - expected.1).abs() < 1e-9, "{actual:?} != {expected:?}");
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode("").is_empty());
    }

    #[test]
    fn test_decode_reference_fixture() {
        let points = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@");
        assert_eq!(points.len(), 3);
        assert_close(points[0], (38.5, -120.2));
        assert_close(points[1], (40.7, -120.95));
        assert_close(points[2], (43.252, -126.453));
    }

    #[test]
    fn test_decode_accumulates_deltas() {
        // "??" is a zero delta pair, so the second point repeats the first
        let points = decode("_p~iF~ps|U??");
        assert_eq!(points.len(), 2);
        assert_close(points[0], (38.5, -120.2));
        assert_close(points[1], (38.5, -120.2));
    }

    #[test]
    fn test_decode_dangling_latitude_is_empty() {
        assert!(decode("_p~iF").is_empty());
    }

    #[test]
    fn test_decode_truncated_chunk_is_empty() {
        // continuation bit set on the final character
        assert!(decode("_p~iF~ps|").is_empty());
    }

    #[test]
    fn test_decode_invalid_character_is_empty() {
        assert!(decode("_p~iF ~ps|U").is_empty());
    }

    #[test]
    fn test_decode_runaway_shift_is_empty() {
        let encoded = "~".repeat(40);
        assert!(decode(&encoded).is_empty());
    }

    #[test]
    fn test_decode_overflowing_sum_is_empty() {
        // each latitude delta is close to 2^62, so the third one overflows
        let big = format!("}}{}F", "~".repeat(11));
        let encoded = format!("{big}?{big}?{big}?");
        assert!(decode(&encoded).is_empty());
    }

    #[test]
    fn test_path_length() {
        assert_eq!(path_length_km(&[]), 0.0);
        assert_eq!(path_length_km(&[(56.0, -4.0)]), 0.0);

        // Edinburgh to Glasgow, roughly 67 km as the crow flies
        let length = path_length_km(&[(55.9533, -3.1883), (55.8642, -4.2518)]);
        assert!((60.0..75.0).contains(&length), "got {length}");
    }
}
