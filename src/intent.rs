//! Keyword heuristics over a user message
//!
//! Decides which data sources a message is asking about and pulls out the
//! places, date, difficulty and activity it mentions. Everything here is
//! synchronous and allocation-light; the patterns are compiled once.

use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;
use tracing::debug;

use crate::daylight::uk_today;
use crate::weather::{DEFAULT_FORECAST_DAYS, MAX_FORECAST_DAYS};

const WEATHER_WORDS: &[&str] = &[
    "weather",
    "forecast",
    "rain",
    "temperature",
    "sunny",
    "cloudy",
    "wind",
    "conditions",
    "snow",
    "storm",
    "cold",
    "warm",
    "wet",
    "dry",
    "freezing",
    "fog",
    "good for",
];

const DAYLIGHT_WORDS: &[&str] = &[
    "sunrise",
    "sunset",
    "golden hour",
    "blue hour",
    "daylight",
    "dawn",
    "dusk",
    "photo",
];

const DRIVING_WORDS: &[&str] = &[
    "drive",
    "driving",
    "distance",
    "how far",
    "road trip",
    "travel",
    "journey",
    "route",
];

const ROUTE_WORDS: &[&str] = &[
    "walk", "hike", "hiking", "trail", "munro", "corbett", "climb", "scramble", "route", "trek",
];

const PLANNING_WORDS: &[&str] = &[
    "plan",
    "planning",
    "trip",
    "trips",
    "itinerary",
    "adventure",
    "visit",
    "visiting",
    "explore",
    "exploring",
    "tour",
];

const FORECAST_WORDS: &[&str] = &["forecast", "days", "week", "weekend", "tomorrow"];

/// Multi-word activities come first so "rock climbing" wins over "climbing"
const ACTIVITIES: &[&str] = &[
    "rock climbing",
    "ice climbing",
    "wild swimming",
    "camping",
    "hiking",
    "climbing",
    "photography",
    "cycling",
    "walking",
    "fishing",
    "kayaking",
    "skiing",
    "snowboarding",
    "birdwatching",
    "running",
    "surfing",
    "sailing",
    "mountaineering",
    "backpacking",
    "trekking",
    "sightseeing",
    "canoeing",
    "rafting",
    "paragliding",
];

const GENERIC_ACTIVITY: &str = "outdoor activity";

const GENERIC_ACTIVITY_WORDS: &[&str] = &[
    "trip",
    "adventure",
    "outdoor",
    "visit",
    "travel",
    "explore",
    "tour",
    "excursion",
];

const TIMEFRAMES: &[&str] = &[
    "next week",
    "this week",
    "tomorrow",
    "weekend",
    "friday",
    "today",
];

/// Places the extractor recognises, in their canonical spelling
pub const GAZETTEER: &[&str] = &[
    "Edinburgh",
    "Glasgow",
    "Aberdeen",
    "Dundee",
    "Stirling",
    "Inverness",
    "Fort William",
    "Aviemore",
    "Perth",
    "Paisley",
    "Greenock",
    "Dunfermline",
    "Kirkcaldy",
    "Ayr",
    "Kilmarnock",
    "Dumfries",
    "Oban",
    "Pitlochry",
    "Callander",
    "Balloch",
    "Helensburgh",
    "Falkirk",
    "Livingston",
    "Isle of Skye",
    "Skye",
    "Arran",
    "Mull",
    "Islay",
    "Orkney",
    "Shetland",
    "Ben Nevis",
    "Loch Lomond",
    "Loch Ness",
    "Cairngorms",
    "Glencoe",
    "St Andrews",
    "Melrose",
    "Jedburgh",
    "Galashiels",
    "Hawick",
    "Braemar",
    "Ballater",
    "Dunkeld",
    "Trossachs",
];

/// Keyword set matched at word starts, so `rain` hits `rainy` but not `terrain`
struct KeywordSet(Regex);

impl KeywordSet {
    fn prefixes(words: &[&str]) -> Self {
        Self::build(words, "")
    }

    fn whole_words(words: &[&str]) -> Self {
        Self::build(words, r"\b")
    }

    fn build(words: &[&str], suffix: &str) -> Self {
        let alternatives: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
        let pattern = format!(r"(?i)\b(?:{}){suffix}", alternatives.join("|"));
        Self(compile(&pattern))
    }

    fn matches(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("keyword patterns are escaped literals or fixed expressions")
}

static WEATHER: LazyLock<KeywordSet> = LazyLock::new(|| KeywordSet::prefixes(WEATHER_WORDS));
static DAYLIGHT: LazyLock<KeywordSet> = LazyLock::new(|| KeywordSet::prefixes(DAYLIGHT_WORDS));
static DRIVING: LazyLock<KeywordSet> = LazyLock::new(|| KeywordSet::prefixes(DRIVING_WORDS));
static ROUTES: LazyLock<KeywordSet> = LazyLock::new(|| KeywordSet::prefixes(ROUTE_WORDS));
static PLANNING: LazyLock<KeywordSet> = LazyLock::new(|| KeywordSet::whole_words(PLANNING_WORDS));
static FORECAST: LazyLock<KeywordSet> = LazyLock::new(|| KeywordSet::whole_words(FORECAST_WORDS));
static GENERIC_ACTIVITY_SET: LazyLock<KeywordSet> =
    LazyLock::new(|| KeywordSet::whole_words(GENERIC_ACTIVITY_WORDS));

static ACTIVITY_PATTERNS: LazyLock<Vec<(&'static str, KeywordSet)>> = LazyLock::new(|| {
    ACTIVITIES
        .iter()
        .map(|a| (*a, KeywordSet::whole_words(&[*a])))
        .collect()
});

static TIMEFRAME_PATTERNS: LazyLock<Vec<(&'static str, KeywordSet)>> = LazyLock::new(|| {
    TIMEFRAMES
        .iter()
        .map(|t| (*t, KeywordSet::whole_words(&[*t])))
        .collect()
});

/// Gazetteer patterns, longest name first
static PLACE_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    let mut names: Vec<&'static str> = GAZETTEER.to_vec();
    names.sort_by_key(|name| std::cmp::Reverse(name.len()));
    names
        .into_iter()
        .map(|name| (name, compile(&format!(r"(?i)\b{}\b", regex::escape(name)))))
        .collect()
});

static START_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)\b(?:from|start(?:ing)?\s+(?:in|at|from)|begin(?:ning)?\s+(?:in|at)|leaving)\s+")
});
static END_MARKER: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)\b(?:end(?:ing)?|finish(?:ing)?)\s+(?:in|at)\s+"));
static FROM_TO: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\bfrom\s+.+?\s+to\s+"));
static WEAK_START: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)\b(?:start|from|begin)"));

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| compile(r"\b(\d{4}-\d{2}-\d{2})\b"));
static WEEK: LazyLock<KeywordSet> = LazyLock::new(|| KeywordSet::prefixes(&["week"]));
static SEVEN: LazyLock<Regex> = LazyLock::new(|| compile(r"\b7\b"));
static FIVE: LazyLock<Regex> = LazyLock::new(|| compile(r"\b5\b"));

/// Relative day words in priority order; `None` means the coming weekend
static RELATIVE_DAYS: LazyLock<Vec<(KeywordSet, Option<i64>)>> = LazyLock::new(|| {
    [
        ("tomorrow", Some(1)),
        ("yesterday", Some(-1)),
        ("next week", Some(7)),
        ("weekend", None),
        ("today", Some(0)),
    ]
    .into_iter()
    .map(|(word, offset)| (KeywordSet::whole_words(&[word]), offset))
    .collect()
});

static VERY_HARD: LazyLock<KeywordSet> =
    LazyLock::new(|| KeywordSet::whole_words(&["extreme", "very hard", "very difficult"]));
static EASY: LazyLock<KeywordSet> =
    LazyLock::new(|| KeywordSet::whole_words(&["easy", "beginner", "gentle", "family"]));
static MODERATE: LazyLock<KeywordSet> =
    LazyLock::new(|| KeywordSet::whole_words(&["moderate", "medium", "intermediate"]));
static HARD: LazyLock<KeywordSet> =
    LazyLock::new(|| KeywordSet::whole_words(&["hard", "difficult", "challenging", "tough"]));

/// What a message is asking for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intent {
    pub wants_weather: bool,
    pub wants_forecast: bool,
    pub wants_daylight: bool,
    pub wants_driving: bool,
    pub wants_routes: bool,
    pub locations: Vec<String>,
    pub difficulty: Option<u8>,
    pub date: Option<NaiveDate>,
    pub forecast_days: u8,
    pub activity: Option<String>,
    pub timeframe: Option<String>,
}

impl Intent {
    /// True when at least one data source is requested
    #[must_use]
    pub fn wants_any_data(&self) -> bool {
        self.wants_weather || self.wants_daylight || self.wants_driving || self.wants_routes
    }
}

/// Extract intent relative to today's UK date
#[must_use]
pub fn extract(message: &str) -> Intent {
    extract_on(message, uk_today())
}

/// Extract intent relative to a given "today"
#[must_use]
pub fn extract_on(message: &str, today: NaiveDate) -> Intent {
    let planning = PLANNING.matches(message);
    let date = parse_date(message, today);

    let intent = Intent {
        wants_weather: planning || WEATHER.matches(message),
        wants_forecast: FORECAST.matches(message) || date.is_some_and(|d| d > today),
        wants_daylight: DAYLIGHT.matches(message),
        wants_driving: planning || DRIVING.matches(message),
        wants_routes: ROUTES.matches(message),
        locations: extract_locations(message),
        difficulty: parse_difficulty(message),
        date,
        forecast_days: forecast_days(message),
        activity: detect_activity(message),
        timeframe: detect_timeframe(message),
    };
    debug!(?intent, "Extracted intent");
    intent
}

/// Gazetteer places in journey order
#[must_use]
pub fn extract_locations(message: &str) -> Vec<String> {
    let mut claimed: Vec<(usize, usize)> = Vec::new();
    let mut found: Vec<(usize, &'static str)> = Vec::new();

    for (name, pattern) in PLACE_PATTERNS.iter() {
        let mut first = None;
        for m in pattern.find_iter(message) {
            let overlaps = claimed
                .iter()
                .any(|&(start, end)| m.start() < end && start < m.end());
            if overlaps {
                continue;
            }
            claimed.push((m.start(), m.end()));
            first.get_or_insert(m.start());
        }
        if let Some(position) = first {
            found.push((position, name));
        }
    }

    found.sort_by_key(|&(position, _)| position);
    reorder_for_journey(message, &mut found);
    found.into_iter().map(|(_, name)| name.to_string()).collect()
}

fn first_place_after(found: &[(usize, &str)], offset: usize) -> Option<usize> {
    found.iter().position(|&(position, _)| position >= offset)
}

fn reorder_for_journey(message: &str, found: &mut Vec<(usize, &'static str)>) {
    if found.len() < 2 {
        return;
    }

    let start = START_MARKER
        .find(message)
        .and_then(|m| first_place_after(found, m.end()))
        .map(|i| found[i].1);
    let end = END_MARKER
        .find(message)
        .or_else(|| FROM_TO.find(message))
        .and_then(|m| first_place_after(found, m.end()))
        .map(|i| found[i].1);

    if start.is_none() && end.is_none() {
        weak_start_reorder(message, found);
        return;
    }

    if let Some(name) = start
        && let Some(i) = found.iter().position(|&(_, n)| n == name)
    {
        let entry = found.remove(i);
        found.insert(0, entry);
    }
    if let Some(name) = end
        && start != Some(name)
        && let Some(i) = found.iter().position(|&(_, n)| n == name)
    {
        let entry = found.remove(i);
        found.push(entry);
    }
}

/// Move the place closest to a bare start word to the front
fn weak_start_reorder(message: &str, found: &mut Vec<(usize, &'static str)>) {
    let Some(marker) = WEAK_START.find(message) else {
        return;
    };
    let anchor = marker.start();
    let nearest = found
        .iter()
        .enumerate()
        .min_by_key(|(_, (position, _))| position.abs_diff(anchor))
        .map(|(i, _)| i);
    if let Some(i) = nearest.filter(|&i| i > 0) {
        let entry = found.remove(i);
        found.insert(0, entry);
    }
}

fn parse_difficulty(message: &str) -> Option<u8> {
    if VERY_HARD.matches(message) {
        Some(5)
    } else if EASY.matches(message) {
        Some(1)
    } else if MODERATE.matches(message) {
        Some(3)
    } else if HARD.matches(message) {
        Some(4)
    } else {
        None
    }
}

fn parse_date(message: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(date) = ISO_DATE
        .captures(message)
        .and_then(|c| NaiveDate::parse_from_str(&c[1], "%Y-%m-%d").ok())
    {
        return Some(date);
    }

    RELATIVE_DAYS
        .iter()
        .find(|(pattern, _)| pattern.matches(message))
        .map(|(_, offset)| match offset {
            Some(days) => today + Duration::days(*days),
            None => next_saturday(today),
        })
}

/// The coming Saturday, or `today` when it is one
#[must_use]
pub fn next_saturday(today: NaiveDate) -> NaiveDate {
    let weekday = i64::from(today.weekday().num_days_from_monday());
    today + Duration::days((5 - weekday).rem_euclid(7))
}

fn forecast_days(message: &str) -> u8 {
    if SEVEN.is_match(message) || WEEK.matches(message) {
        MAX_FORECAST_DAYS
    } else if FIVE.is_match(message) {
        5
    } else {
        DEFAULT_FORECAST_DAYS
    }
}

fn detect_activity(message: &str) -> Option<String> {
    ACTIVITY_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.matches(message))
        .map(|(activity, _)| (*activity).to_string())
        .or_else(|| {
            GENERIC_ACTIVITY_SET
                .matches(message)
                .then(|| GENERIC_ACTIVITY.to_string())
        })
}

fn detect_timeframe(message: &str) -> Option<String> {
    TIMEFRAME_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.matches(message))
        .map(|(timeframe, _)| (*timeframe).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 12).unwrap()
    }

    #[test]
    fn test_weather_in_edinburgh() {
        let intent = extract_on("What's the weather like in Edinburgh?", wednesday());
        assert!(intent.wants_weather);
        assert!(!intent.wants_daylight);
        assert_eq!(intent.locations, vec!["Edinburgh"]);
    }

    #[test]
    fn test_road_trip_keeps_journey_order() {
        let intent = extract_on("Road trip from Glasgow to Skye", wednesday());
        assert!(intent.wants_driving);
        assert_eq!(intent.locations, vec!["Glasgow", "Skye"]);
    }

    #[test]
    fn test_golden_hour_is_daylight_only() {
        let intent = extract_on("Golden hour photography times in Glencoe", wednesday());
        assert!(intent.wants_daylight);
        assert!(!intent.wants_weather);
        assert_eq!(intent.locations, vec!["Glencoe"]);
        assert_eq!(intent.activity.as_deref(), Some("photography"));
    }

    #[test]
    fn test_hiking_in_aviemore_today() {
        let intent = extract_on("Is it good for hiking in Aviemore today?", wednesday());
        assert!(intent.wants_weather);
        assert!(intent.wants_routes);
        assert!(!intent.wants_forecast);
        assert_eq!(intent.locations, vec!["Aviemore"]);
        assert_eq!(intent.date, Some(wednesday()));
        assert_eq!(intent.activity.as_deref(), Some("hiking"));
        assert_eq!(intent.timeframe.as_deref(), Some("today"));
    }

    #[test]
    fn test_longest_name_claims_span() {
        let locations = extract_locations("Camping on the Isle of Skye");
        assert_eq!(locations, vec!["Isle of Skye"]);
    }

    #[test]
    fn test_end_marker_moves_place_last() {
        let locations =
            extract_locations("Ending in Oban, passing Stirling and Pitlochry on the way");
        assert_eq!(locations, vec!["Stirling", "Pitlochry", "Oban"]);
    }

    #[test]
    fn test_start_marker_moves_place_first() {
        let locations = extract_locations("Visit Oban and Mull, starting in Glasgow");
        assert_eq!(locations, vec!["Glasgow", "Oban", "Mull"]);
    }

    #[test]
    fn test_weak_start_heuristic() {
        let locations = extract_locations("Perth then Dundee, Inverness is the start");
        assert_eq!(locations, vec!["Inverness", "Perth", "Dundee"]);
    }

    #[test]
    fn test_word_start_anchoring() {
        assert!(extract_on("Will it be rainy?", wednesday()).wants_weather);
        assert!(!extract_on("Rough terrain near Oban", wednesday()).wants_weather);
    }

    #[test]
    fn test_planning_forces_weather_and_driving() {
        let intent = extract_on("Help me plan an adventure on Arran", wednesday());
        assert!(intent.wants_weather);
        assert!(intent.wants_driving);
        assert_eq!(intent.activity.as_deref(), Some(GENERIC_ACTIVITY));
    }

    #[rstest]
    #[case("an easy family walk", Some(1))]
    #[case("something moderate", Some(3))]
    #[case("a hard scramble", Some(4))]
    #[case("a very hard ridge", Some(5))]
    #[case("extreme winter routes", Some(5))]
    #[case("a nice walk", None)]
    fn test_difficulty(#[case] message: &str, #[case] expected: Option<u8>) {
        assert_eq!(extract_on(message, wednesday()).difficulty, expected);
    }

    #[rstest]
    #[case("weather on 2024-07-01", Some((2024, 7, 1)))]
    #[case("sunset tomorrow", Some((2024, 6, 13)))]
    #[case("what was it like yesterday", Some((2024, 6, 11)))]
    #[case("camping next week", Some((2024, 6, 19)))]
    #[case("this weekend in Oban", Some((2024, 6, 15)))]
    #[case("no date here", None)]
    fn test_dates(#[case] message: &str, #[case] expected: Option<(i32, u32, u32)>) {
        let expected = expected.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap());
        assert_eq!(extract_on(message, wednesday()).date, expected);
    }

    #[test]
    fn test_weekend_on_saturday_is_today() {
        let saturday = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(next_saturday(saturday), saturday);
        let sunday = NaiveDate::from_ymd_opt(2024, 6, 16).unwrap();
        assert_eq!(next_saturday(sunday), NaiveDate::from_ymd_opt(2024, 6, 22).unwrap());
    }

    #[rstest]
    #[case("weather for the week in Oban", 7)]
    #[case("7 day forecast", 7)]
    #[case("5 day forecast", 5)]
    #[case("forecast for Perth", 3)]
    fn test_forecast_days(#[case] message: &str, #[case] expected: u8) {
        let intent = extract_on(message, wednesday());
        assert!(intent.wants_forecast);
        assert_eq!(intent.forecast_days, expected);
    }

    #[test]
    fn test_future_date_wants_forecast() {
        let intent = extract_on("weather in Oban on 2024-06-14", wednesday());
        assert!(intent.wants_forecast);
    }

    #[test]
    fn test_rock_climbing_beats_climbing() {
        let intent = extract_on("rock climbing near Glencoe", wednesday());
        assert_eq!(intent.activity.as_deref(), Some("rock climbing"));
    }
}
