//! Derived valuation model.
//!
//! Everything here is a pure function of a stored [`Listing`]; nothing is
//! cached or persisted. `price` and other attributes can be corrected
//! through the editing UI at any time, so derived values are recomputed
//! on every call.

use crate::models::Listing;

/// Closed set of Mooney M20 family codes the valuation tables cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelFamily {
    /// M20J "201"
    M201,
    /// M20K "231"
    M231,
    /// M20K "252"
    M252,
    /// M20K "305 Rocket" conversion
    M305,
    /// M20M "Bravo" / "TLS"
    Bravo,
}

impl ModelFamily {
    pub fn code(&self) -> &'static str {
        match self {
            ModelFamily::M201 => "201",
            ModelFamily::M231 => "231",
            ModelFamily::M252 => "252",
            ModelFamily::M305 => "305",
            ModelFamily::Bravo => "BRAVO",
        }
    }

    /// Engine time between overhauls, hours.
    pub fn time_between_overhaul(&self) -> f64 {
        match self {
            ModelFamily::M201 => 2000.0,
            ModelFamily::M231 => 1800.0,
            ModelFamily::M252 => 1800.0,
            ModelFamily::M305 => 1600.0,
            ModelFamily::Bravo => 2000.0,
        }
    }

    /// Typical field overhaul cost, USD.
    pub fn overhaul_cost(&self) -> f64 {
        match self {
            ModelFamily::M201 => 28_000.0,
            ModelFamily::M231 => 32_000.0,
            ModelFamily::M252 => 35_000.0,
            ModelFamily::M305 => 45_000.0,
            ModelFamily::Bravo => 50_000.0,
        }
    }
}

/// Added to the asking price when the panel lacks a WAAS GPS (retrofit cost).
const WAAS_GPS_PENALTY: f64 = 10_000.0;
/// Added to the asking price when the transponder lacks ADS-B out.
const ADS_B_OUT_PENALTY: f64 = 5_000.0;

/// Substring rules in priority order. Marketing numbers come before
/// factory codes so that e.g. "M20K 252" resolves to 252 instead of the
/// generic M20K default of 231.
const FAMILY_RULES: &[(&str, ModelFamily)] = &[
    ("201", ModelFamily::M201),
    ("231", ModelFamily::M231),
    ("252", ModelFamily::M252),
    ("305", ModelFamily::M305),
    ("BRAVO", ModelFamily::Bravo),
    ("TLS", ModelFamily::Bravo),
    ("M20J", ModelFamily::M201),
    ("M20K", ModelFamily::M231),
    ("M20M", ModelFamily::Bravo),
];

/// Resolve the model family from the free-text title and model fields.
/// The first rule matching either field (title checked first) wins.
pub fn sanitize_model(title: &str, model: Option<&str>) -> Option<ModelFamily> {
    let title = title.to_uppercase();
    let model = model.map(str::to_uppercase);
    for (needle, family) in FAMILY_RULES {
        if title.contains(needle) {
            return Some(*family);
        }
        if let Some(ref m) = model {
            if m.contains(needle) {
                return Some(*family);
            }
        }
    }
    None
}

/// Canonical identifiers that provide WAAS GPS approach capability.
const WAAS_GPS_UNITS: &[&str] = &["GTN650", "GTN750", "GNS430W", "GNS530W"];

pub fn has_waas_gps(listing: &Listing) -> bool {
    match &listing.gps {
        Some(gps) => WAAS_GPS_UNITS.contains(&gps.as_str()),
        None => false,
    }
}

/// ADS-B out capability: GTX 335/345 series, or an extended-squitter
/// ("ES") variant of an older unit.
pub fn has_ads_b_out(listing: &Listing) -> bool {
    match &listing.transponder {
        Some(t) => t.starts_with("GTX335") || t.starts_with("GTX345") || t.ends_with("ES"),
        None => false,
    }
}

pub fn family(listing: &Listing) -> Option<ModelFamily> {
    sanitize_model(&listing.title, listing.model.as_deref())
}

/// Market price adjusted for avionics retrofit costs and engine overhaul
/// accrual. `None` when the source published no asking price.
///
/// The overhaul term is linear around mid-life: an engine at exactly
/// TBO/2 contributes nothing, a fresh engine is a credit, a runout engine
/// approaches the full overhaul cost.
pub fn adjusted_price(listing: &Listing) -> Option<f64> {
    let mut price = listing.price?;

    if !has_waas_gps(listing) {
        price += WAAS_GPS_PENALTY;
    }
    if !has_ads_b_out(listing) {
        price += ADS_B_OUT_PENALTY;
    }

    if let (Some(hours), Some(fam)) = (listing.engine_hours, family(listing)) {
        let tbo = fam.time_between_overhaul();
        let cost = fam.overhaul_cost();
        price += (hours - tbo / 2.0) * cost / tbo;
    }

    Some(price)
}
