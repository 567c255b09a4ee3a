//! Hill-walk search over a built-in catalogue of Scottish routes

use std::sync::LazyLock;

use serde::Serialize;

pub const DEFAULT_MAX_RESULTS: usize = 10;
pub const MAX_RESULTS_LIMIT: usize = 50;

/// One walking route
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrailRoute {
    pub name: &'static str,
    pub region: &'static str,
    /// 1 (easy) to 5 (very difficult)
    pub difficulty: u8,
    pub distance: &'static str,
    pub time: &'static str,
    pub peaks: Option<&'static str>,
    /// munro, corbett, graham, donald, marilyn or none
    pub hill_type: Option<&'static str>,
    pub description: &'static str,
    pub url: &'static str,
    /// Nearby towns and features, lower case
    pub keywords: &'static [&'static str],
}

static CATALOGUE: LazyLock<Vec<TrailRoute>> = LazyLock::new(|| {
    vec![
        TrailRoute {
            name: "Ben Nevis via Tourist Path",
            region: "Lochaber",
            difficulty: 4,
            distance: "17km",
            time: "7-9 hours",
            peaks: Some("Ben Nevis (1345m)"),
            hill_type: Some("munro"),
            description: "The classic route up Scotland's highest mountain",
            url: "https://www.walkhighlands.co.uk/lochaber/",
            keywords: &["nevis", "fort william", "glen nevis", "highlands"],
        },
        TrailRoute {
            name: "Cairn Gorm from Ski Centre",
            region: "Cairngorms",
            difficulty: 3,
            distance: "12km",
            time: "5-6 hours",
            peaks: Some("Cairn Gorm (1245m)"),
            hill_type: Some("munro"),
            description: "Popular Munro with excellent views",
            url: "https://www.walkhighlands.co.uk/cairngorms/",
            keywords: &["cairngorms", "aviemore", "glenmore", "highlands"],
        },
        TrailRoute {
            name: "Loch an Eilein Circuit",
            region: "Cairngorms",
            difficulty: 1,
            distance: "7km",
            time: "1.5-2 hours",
            peaks: None,
            hill_type: None,
            description: "Gentle forest loop around a loch with a ruined island castle",
            url: "https://www.walkhighlands.co.uk/cairngorms/",
            keywords: &["aviemore", "rothiemurchus", "loch", "family", "forest"],
        },
        TrailRoute {
            name: "Ben Lomond Tourist Path",
            region: "Loch Lomond",
            difficulty: 3,
            distance: "12km",
            time: "5-6 hours",
            peaks: Some("Ben Lomond (974m)"),
            hill_type: Some("munro"),
            description: "Scotland's most southerly Munro above Rowardennan",
            url: "https://www.walkhighlands.co.uk/lochlomond/",
            keywords: &["loch lomond", "rowardennan", "balloch", "trossachs"],
        },
        TrailRoute {
            name: "Conic Hill",
            region: "Loch Lomond",
            difficulty: 2,
            distance: "4km",
            time: "2 hours",
            peaks: None,
            hill_type: None,
            description: "Short climb from Balmaha with views along the Highland Boundary Fault",
            url: "https://www.walkhighlands.co.uk/lochlomond/",
            keywords: &["loch lomond", "balmaha", "west highland way", "family"],
        },
        TrailRoute {
            name: "Ben A'an",
            region: "Trossachs",
            difficulty: 2,
            distance: "3.5km",
            time: "2 hours",
            peaks: Some("Ben A'an (454m)"),
            hill_type: None,
            description: "Steep little peak with a superb view over Loch Katrine",
            url: "https://www.walkhighlands.co.uk/lochlomond/",
            keywords: &["trossachs", "callander", "loch katrine", "aberfoyle"],
        },
        TrailRoute {
            name: "Buachaille Etive Beag",
            region: "Glen Coe",
            difficulty: 4,
            distance: "8km",
            time: "4-5 hours",
            peaks: Some("Stob Dubh (958m), Stob Coire Raineach (925m)"),
            hill_type: Some("munro"),
            description: "Two Munros with views straight into Glen Coe",
            url: "https://www.walkhighlands.co.uk/glencoe/",
            keywords: &["glencoe", "glen coe", "glen etive", "highlands"],
        },
        TrailRoute {
            name: "Aonach Eagach Ridge",
            region: "Glen Coe",
            difficulty: 5,
            distance: "9.5km",
            time: "7-10 hours",
            peaks: Some("Meall Dearg (953m), Sgorr nam Fiannaidh (967m)"),
            hill_type: Some("munro"),
            description: "Narrow scrambling traverse, one of the finest ridges on the mainland",
            url: "https://www.walkhighlands.co.uk/glencoe/",
            keywords: &["glencoe", "glen coe", "scramble", "ridge"],
        },
        TrailRoute {
            name: "The Old Man of Storr",
            region: "Isle of Skye",
            difficulty: 2,
            distance: "3.8km",
            time: "1.5-2 hours",
            peaks: None,
            hill_type: None,
            description: "Iconic rock pinnacles on the Trotternish ridge",
            url: "https://www.walkhighlands.co.uk/skye/",
            keywords: &["skye", "portree", "trotternish", "photography"],
        },
        TrailRoute {
            name: "The Quiraing",
            region: "Isle of Skye",
            difficulty: 3,
            distance: "6.8km",
            time: "2-3 hours",
            peaks: None,
            hill_type: None,
            description: "Landslip landscape of pinnacles and cliffs",
            url: "https://www.walkhighlands.co.uk/skye/",
            keywords: &["skye", "staffin", "trotternish", "photography"],
        },
        TrailRoute {
            name: "Arthur's Seat",
            region: "Edinburgh",
            difficulty: 1,
            distance: "5km",
            time: "1.5-2 hours",
            peaks: Some("Arthur's Seat (251m)"),
            hill_type: None,
            description: "Extinct volcano in Holyrood Park with city views",
            url: "https://www.walkhighlands.co.uk/lothian/",
            keywords: &["edinburgh", "holyrood", "city", "family"],
        },
        TrailRoute {
            name: "Goatfell from Brodick",
            region: "Isle of Arran",
            difficulty: 3,
            distance: "14.5km",
            time: "5-6 hours",
            peaks: Some("Goatfell (874m)"),
            hill_type: Some("corbett"),
            description: "Arran's highest peak above Brodick Castle",
            url: "https://www.walkhighlands.co.uk/arran/",
            keywords: &["arran", "brodick", "island"],
        },
        TrailRoute {
            name: "Schiehallion",
            region: "Perthshire",
            difficulty: 3,
            distance: "10km",
            time: "4-5 hours",
            peaks: Some("Schiehallion (1083m)"),
            hill_type: Some("munro"),
            description: "Shapely Munro with a rebuilt path from Braes of Foss",
            url: "https://www.walkhighlands.co.uk/perthshire/",
            keywords: &["pitlochry", "perth", "kinloch rannoch", "aberfeldy"],
        },
        TrailRoute {
            name: "St Cyrus Coastal Walk",
            region: "Angus",
            difficulty: 1,
            distance: "6km",
            time: "2 hours",
            peaks: None,
            hill_type: None,
            description: "Dunes and cliffs on a nature reserve beach",
            url: "https://www.walkhighlands.co.uk/angus/",
            keywords: &["montrose", "coastal", "coast", "beach", "family"],
        },
    ]
});

/// Search filters
#[derive(Debug, Clone, Default)]
pub struct TrailQuery {
    pub search_term: Option<String>,
    pub region: Option<String>,
    pub difficulty: Option<u8>,
    pub hill_type: Option<String>,
    pub max_results: Option<usize>,
}

impl TrailRoute {
    fn matches_term(&self, term: &str) -> bool {
        let name = self.name.to_lowercase();
        let region = self.region.to_lowercase();
        let peaks = self.peaks.unwrap_or_default().to_lowercase();
        name.contains(term)
            || region.contains(term)
            || peaks.contains(term)
            || self
                .keywords
                .iter()
                .any(|k| k.contains(term) || term.contains(k))
    }
}

/// Routes matching every given filter, in catalogue order.
///
/// Difficulty keeps routes within one grade of the request.
#[must_use]
pub fn search(query: &TrailQuery) -> Vec<&'static TrailRoute> {
    let term = query
        .search_term
        .as_deref()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty());
    let region = query
        .region
        .as_deref()
        .map(|r| r.trim().to_lowercase())
        .filter(|r| !r.is_empty());
    let hill_type = query
        .hill_type
        .as_deref()
        .map(str::to_lowercase)
        .filter(|h| h != "any");
    let limit = query
        .max_results
        .unwrap_or(DEFAULT_MAX_RESULTS)
        .clamp(1, MAX_RESULTS_LIMIT);

    CATALOGUE
        .iter()
        .filter(|route| term.as_deref().is_none_or(|t| route.matches_term(t)))
        .filter(|route| {
            region
                .as_deref()
                .is_none_or(|r| route.region.to_lowercase().contains(r))
        })
        .filter(|route| {
            query
                .difficulty
                .is_none_or(|d| route.difficulty.abs_diff(d) <= 1)
        })
        .filter(|route| {
            hill_type
                .as_deref()
                .is_none_or(|h| route.hill_type == Some(h))
        })
        .take(limit)
        .collect()
}

/// Render search results
#[must_use]
pub fn search_report(query: &TrailQuery, routes: &[&TrailRoute]) -> String {
    if routes.is_empty() {
        return format!(
            "No routes found for search term: '{}'. Try searching for specific mountain names, \
             regions like 'Highlands' or 'Cairngorms', or general terms like 'coastal walks'.",
            query.search_term.as_deref().unwrap_or_default()
        );
    }

    let mut text = format!("Found {} walking routes:\n\n", routes.len());
    for (i, route) in routes.iter().enumerate() {
        text.push_str(&format!("{}. **{}**\n", i + 1, route.name));
        text.push_str(&format!("   📍 Region: {}\n", route.region));
        text.push_str(&format!("   ⭐ Difficulty: {}/5\n", route.difficulty));
        text.push_str(&format!("   📏 Distance: {}\n", route.distance));
        text.push_str(&format!("   ⏱️ Time: {}\n", route.time));
        if let Some(peaks) = route.peaks {
            text.push_str(&format!("   🏔️ Peaks: {peaks}\n"));
        }
        text.push_str(&format!("   📝 {}\n", route.description));
        text.push_str(&format!("   🔗 URL: {}\n\n", route.url));
    }
    text
}
