//! Preferred countries/regions for place names that collide worldwide

use std::collections::HashMap;
use std::sync::LazyLock;

const SCOTLAND: &[&str] = &["united kingdom", "scotland"];
const ENGLAND: &[&str] = &["united kingdom", "england"];

const SCOTTISH_PLACES: &[&str] = &[
    "aberdeen", "alexandria", "alloa", "annan", "arbroath", "ayr", "banff", "bathgate",
    "bearsden", "bellshill", "berwick", "brechin", "buchanan", "callander", "campbeltown",
    "carnoustie", "clydebank", "coatbridge", "cumbernauld", "dalkeith", "denny", "dumbarton",
    "dumfries", "dunbar", "dunblane", "dundee", "dunfermline", "duns", "east kilbride",
    "edinburgh", "elgin", "falkirk", "forfar", "fort william", "fraserburgh", "galashiels",
    "glasgow", "glenrothes", "gourock", "grangemouth", "greenock", "hamilton", "hawick",
    "helensburgh", "huntly", "inveraray", "inverness", "irvine", "johnstone", "kelso",
    "kilmarnock", "kilwinning", "kirkcaldy", "kirkintilloch", "kirkwall", "lanark", "largo",
    "lerwick", "linlithgow", "livingston", "lochgelly", "melrose", "montrose", "motherwell",
    "nairn", "newburgh", "newton stewart", "oban", "paisley", "peebles", "perth", "peterhead",
    "pitlochry", "prestwick", "renfrew", "rothesay", "rutherglen", "selkirk", "st. andrews",
    "st andrews", "stirling", "stonehaven", "stornoway", "stranraer", "strathaven", "troon",
    "wick", "wishaw", "aviemore",
    // islands
    "canna", "easdale", "iona", "mull", "skye", "isle of skye", "harris", "lewis", "barra",
    "uist", "orkney", "shetland", "arran", "bute", "islay", "jura",
    // landmarks
    "cairngorms", "ben nevis", "glencoe", "loch lomond",
];

const ENGLISH_PLACES: &[&str] = &[
    "carlisle", "cambridge", "birmingham", "manchester", "oxford", "york", "bath",
    "winchester", "exeter", "lancaster", "newcastle", "richmond", "kingston", "plymouth",
    "bristol", "london", "windsor", "dover", "canterbury",
];

/// Lower-cased, trimmed place name -> preferred tokens, strongest first
pub static PLACE_PREFERENCES: LazyLock<HashMap<&'static str, &'static [&'static str]>> =
    LazyLock::new(|| {
        SCOTTISH_PLACES
            .iter()
            .map(|place| (*place, SCOTLAND))
            .chain(ENGLISH_PLACES.iter().map(|place| (*place, ENGLAND)))
            .collect()
    });

/// Preference list for a query, if the place is known to be ambiguous
#[must_use]
pub fn preferences_for(query: &str) -> Option<&'static [&'static str]> {
    PLACE_PREFERENCES
        .get(query.trim().to_lowercase().as_str())
        .copied()
}
