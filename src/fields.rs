//! Shared field-parsing utilities used by every source adapter.
//!
//! All of these are permissive: noisy or unrecognized input yields `None`
//! (or passes through unchanged for state names), never an error, because
//! each marketplace formats these fields differently.

use regex::Regex;
use std::sync::OnceLock;

fn gps_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:GTN|GNS|KLN)[\s-]*(?:650|750|430|530|89|94)[\s-]*W?").unwrap()
    })
}

fn waas_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)WAAS").unwrap())
}

fn transponder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(?:GTX|KT)[\s-]*\d{2,5}[A-Z]*").unwrap())
}

/// Find a GPS identifier (GTN/GNS/KLN family) anywhere in the document
/// text. First match in document order wins.
///
/// If the document separately claims WAAS capability, non-GTN identifiers
/// that do not already end in `W` get a `W` appended: sellers frequently
/// write "GNS 430 WAAS" instead of "GNS 430W".
pub fn extract_gps(text: &str) -> Option<String> {
    let m = gps_re().find(text)?;
    let mut gps: String = m
        .as_str()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_uppercase();

    if waas_re().is_match(text) && !gps.contains("GTN") && !gps.ends_with('W') {
        gps.push('W');
    }
    Some(gps)
}

/// Find a transponder identifier (GTX/KT family) anywhere in the document
/// text. First match wins.
pub fn extract_transponder(text: &str) -> Option<String> {
    let m = transponder_re().find(text)?;
    Some(
        m.as_str()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect::<String>()
            .to_uppercase(),
    )
}

/// Normalize a US state name to its two-letter abbreviation.
///
/// Unrecognized strings pass through unchanged rather than being rejected;
/// some sources already abbreviate, others include country names.
pub fn normalize_state(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    let titled = title_case(raw);
    for (name, abbrev) in STATE_ABBREV {
        if *name == titled {
            return Some((*abbrev).to_string());
        }
    }
    Some(raw.to_string())
}

/// Parse a float out of noisy text ("$129,500.00", "1,425 SMOH"). Keeps
/// only digits and decimal points; `None` if nothing numeric remains or
/// the residue is unparseable.
pub fn parse_float(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Integer counterpart of [`parse_float`]; truncates any decimal part.
pub fn parse_int(raw: &str) -> Option<i64> {
    parse_float(raw).map(|f| f as i64)
}

/// The accepted definition of "registration present": the string contains
/// at least one digit. A heuristic, kept from long-observed source data;
/// plain words ("N/A", "Call") never pass it.
pub fn valid_registration(raw: &str) -> bool {
    raw.chars().any(|c| c.is_ascii_digit())
}

fn title_case(raw: &str) -> String {
    raw.trim()
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

const STATE_ABBREV: &[(&str, &str)] = &[
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("District Of Columbia", "DC"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Hawaii", "HI"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Iowa", "IA"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Maine", "ME"),
    ("Maryland", "MD"),
    ("Massachusetts", "MA"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Mississippi", "MS"),
    ("Missouri", "MO"),
    ("Montana", "MT"),
    ("Nebraska", "NE"),
    ("Nevada", "NV"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("New York", "NY"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virginia", "VA"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
];
