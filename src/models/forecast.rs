//! Daily forecast model and activity advisory

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Codes treated as settled weather
const SETTLED_CODES: [u16; 3] = [0, 1, 2];
/// Codes treated as rain
const RAIN_CODES: [u16; 3] = [61, 63, 65];

/// One day of forecast
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastDay {
    pub date: NaiveDate,
    /// Minimum temperature in Celsius
    pub temp_min_c: f64,
    /// Maximum temperature in Celsius
    pub temp_max_c: f64,
    /// WMO weather interpretation code
    pub weather_code: u16,
    /// Precipitation sum in mm
    pub precipitation_mm: f64,
    /// Maximum sustained wind in km/h
    pub wind_max_kmh: f64,
    /// Maximum gusts in km/h, 0 when unknown
    pub wind_gusts_kmh: f64,
}

/// Outdoor suitability verdict, at most one per day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    Great,
    Wet,
    Windy,
}

impl Advisory {
    /// Rendered advisory line
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Advisory::Great => "✅ Great for outdoor activities!",
            Advisory::Wet => "⚠️  Wet weather - plan indoor alternatives",
            Advisory::Windy => "⚠️  Very windy - avoid exposed areas",
        }
    }
}

impl ForecastDay {
    /// Pick the advisory for this day. Checks run in priority order.
    #[must_use]
    pub fn advisory(&self) -> Option<Advisory> {
        if SETTLED_CODES.contains(&self.weather_code)
            && self.wind_max_kmh < 25.0
            && self.precipitation_mm == 0.0
        {
            Some(Advisory::Great)
        } else if RAIN_CODES.contains(&self.weather_code) || self.precipitation_mm > 5.0 {
            Some(Advisory::Wet)
        } else if self.wind_max_kmh > 40.0 {
            Some(Advisory::Windy)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn day(code: u16, wind: f64, precipitation: f64) -> ForecastDay {
        ForecastDay {
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            temp_min_c: 8.0,
            temp_max_c: 16.0,
            weather_code: code,
            precipitation_mm: precipitation,
            wind_max_kmh: wind,
            wind_gusts_kmh: 0.0,
        }
    }

    #[rstest]
    #[case(0, 10.0, 0.0, Some(Advisory::Great))]
    #[case(2, 24.9, 0.0, Some(Advisory::Great))]
    #[case(1, 25.0, 0.0, None)]
    #[case(3, 10.0, 10.0, Some(Advisory::Wet))]
    #[case(63, 10.0, 0.0, Some(Advisory::Wet))]
    #[case(3, 45.0, 0.0, Some(Advisory::Windy))]
    #[case(3, 45.0, 10.0, Some(Advisory::Wet))]
    #[case(0, 45.0, 0.0, Some(Advisory::Windy))]
    #[case(3, 40.0, 1.0, None)]
    #[case(80, 30.0, 4.0, None)]
    fn test_advisory_priority(
        #[case] code: u16,
        #[case] wind: f64,
        #[case] precipitation: f64,
        #[case] expected: Option<Advisory>,
    ) {
        assert_eq!(day(code, wind, precipitation).advisory(), expected);
    }
}
