use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Seed URL lists, one ordered list per marketplace. Loaded from a JSON
/// file when given, otherwise the built-in Mooney M20J/M20K/M20M
/// searches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub controller: Vec<String>,
    pub trade_a_plane: Vec<String>,
    pub aso: Vec<String>,
    pub airplane_mart: Vec<String>,
}

impl SourceConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            controller: vec![
                "https://www.controller.com/listings/aircraft/for-sale/list/category/13/aircraft/manufacturer/mooney/model/m20m-bravo".to_string(),
                "https://www.controller.com/listings/aircraft/for-sale/list/category/13/aircraft/manufacturer/mooney/model-group/m20k".to_string(),
                "https://www.controller.com/listings/aircraft/for-sale/list/category/13/aircraft/manufacturer/mooney/model-group/m20j".to_string(),
            ],
            trade_a_plane: vec![
                "https://www.trade-a-plane.com/search?s-page_size=100&category_level1=Single+Engine+Piston&make=MOONEY&model=M20J+201&s-type=aircraft".to_string(),
                "https://www.trade-a-plane.com/search?s-page_size=100&category_level1=Single+Engine+Piston&make=MOONEY&model=M20J+205&s-type=aircraft".to_string(),
                "https://www.trade-a-plane.com/search?s-page_size=100&category_level1=Single+Engine+Piston&make=MOONEY&model=M20K+231&s-type=aircraft".to_string(),
                "https://www.trade-a-plane.com/search?s-page_size=100&category_level1=Single+Engine+Piston&make=MOONEY&model=M20K+252&s-type=aircraft".to_string(),
                "https://www.trade-a-plane.com/search?s-page_size=100&category_level1=Single+Engine+Piston&make=MOONEY&model=M20K+305+ROCKET&s-type=aircraft".to_string(),
                "https://www.trade-a-plane.com/search?s-page_size=100&category_level1=Single+Engine+Piston&make=MOONEY&model=M20M+BRAVO&s-type=aircraft".to_string(),
                "https://www.trade-a-plane.com/search?s-page_size=100&category_level1=Single+Engine+Piston&make=MOONEY&model=M20M+TLS+BRAVO&s-type=aircraft".to_string(),
            ],
            aso: vec![
                "https://www.aso.com/listings/AircraftListings.aspx?mg_id=171&act_id=1&mmg=true".to_string(),
            ],
            airplane_mart: vec![
                "http://airplanemart.com/airplane-for-sale/specific-listing/M20J/351/".to_string(),
                "http://airplanemart.com/airplane-for-sale/specific-listing/M20K/352/".to_string(),
                "http://airplanemart.com/airplane-for-sale/specific-listing/M20M/348/".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_source() {
        let config = SourceConfig::default();
        assert!(!config.controller.is_empty());
        assert!(!config.trade_a_plane.is_empty());
        assert!(!config.aso.is_empty());
        assert!(!config.airplane_mart.is_empty());
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: SourceConfig =
            serde_json::from_str(r#"{"aso": ["http://example.com/aso"]}"#).unwrap();
        assert_eq!(config.aso, vec!["http://example.com/aso".to_string()]);
        assert!(!config.controller.is_empty());
    }
}
