//! Candidate scoring for ambiguous place names

use serde::Deserialize;

use super::preferences::preferences_for;

const UK_AND_IRELAND: [&str; 2] = ["united kingdom", "ireland"];

/// One candidate returned by the geocoding provider
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GeocodeCandidate {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    pub admin1: Option<String>,
    pub admin2: Option<String>,
    pub population: Option<u64>,
}

impl GeocodeCandidate {
    /// "Name, Region, Country", skipping absent parts
    #[must_use]
    pub fn display_name(&self) -> String {
        let mut display = self.name.clone();
        for part in [&self.admin1, &self.country].into_iter().flatten() {
            display.push_str(", ");
            display.push_str(part);
        }
        display
    }
}

/// Score one candidate against the user's query
#[must_use]
pub fn score_candidate(query: &str, candidate: &GeocodeCandidate) -> f64 {
    let query = query.trim().to_lowercase();
    let country = candidate.country.as_deref().unwrap_or_default().to_lowercase();
    let admin1 = candidate.admin1.as_deref().unwrap_or_default().to_lowercase();
    let mut score = 0.0;

    if candidate.name.to_lowercase() == query {
        score += 100.0;
    }

    match preferences_for(&query) {
        Some(preferred) => {
            if let Some(i) = preferred
                .iter()
                .position(|token| country.contains(token) || admin1.contains(token))
            {
                score += 2000.0 - 100.0 * i as f64;
            }
        }
        None => {
            if UK_AND_IRELAND.contains(&country.as_str()) {
                score += 100.0;
            }
        }
    }

    if let Some(population) = candidate.population.filter(|p| *p > 0) {
        score += (population as f64 / 50_000.0).min(300.0);
    }

    if candidate.admin1.is_some() {
        score += 30.0;
    }
    if candidate.admin2.is_some() {
        score += 15.0;
    }

    score
}

/// Index of the best candidate; the first one wins a tie
#[must_use]
pub fn select_best(query: &str, candidates: &[GeocodeCandidate]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let score = score_candidate(query, candidate);
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((index, score));
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, country: &str, admin1: &str, population: u64) -> GeocodeCandidate {
        GeocodeCandidate {
            name: name.to_string(),
            latitude: 0.0,
            longitude: 0.0,
            country: Some(country.to_string()),
            admin1: Some(admin1.to_string()),
            admin2: None,
            population: Some(population),
        }
    }

    #[test]
    fn test_scottish_perth_beats_australian_perth() {
        let candidates = vec![
            candidate("Perth", "Australia", "Western Australia", 2_000_000),
            candidate("Perth", "United Kingdom", "Scotland", 47_000),
        ];
        assert_eq!(select_best("Perth", &candidates), Some(1));
    }

    #[test]
    fn test_first_preference_outranks_second() {
        // same population, one matches only the second token
        let first = candidate("Carlisle", "United Kingdom", "England", 75_000);
        let second = GeocodeCandidate {
            country: Some("Elsewhere".to_string()),
            ..candidate("Carlisle", "Elsewhere", "England", 75_000)
        };
        assert!(score_candidate("carlisle", &first) > score_candidate("carlisle", &second));
    }

    #[test]
    fn test_unknown_place_prefers_uk_and_ireland() {
        let uk = candidate("Tyndrum", "United Kingdom", "Scotland", 0);
        let us = candidate("Tyndrum", "United States", "Ohio", 0);
        assert_eq!(score_candidate("Tyndrum", &uk) - score_candidate("Tyndrum", &us), 100.0);
    }

    #[test]
    fn test_population_bonus_is_capped() {
        let huge = candidate("Somewhere", "Chile", "Region", 1_000_000_000);
        // exact name 100 + capped population 300 + admin1 30
        assert_eq!(score_candidate("somewhere", &huge), 430.0);
    }

    #[test]
    fn test_ties_keep_provider_order() {
        let candidates = vec![
            candidate("Ayr", "United Kingdom", "Scotland", 46_000),
            candidate("Ayr", "United Kingdom", "Scotland", 46_000),
        ];
        assert_eq!(select_best("Ayr", &candidates), Some(0));
    }

    #[test]
    fn test_select_best_empty() {
        assert_eq!(select_best("Oban", &[]), None);
    }

    #[test]
    fn test_display_name() {
        let full = candidate("Aviemore", "United Kingdom", "Scotland", 3_000);
        assert_eq!(full.display_name(), "Aviemore, Scotland, United Kingdom");

        let bare = GeocodeCandidate {
            admin1: None,
            country: None,
            ..full
        };
        assert_eq!(bare.display_name(), "Aviemore");
    }
}
