//! Tile address to URL mapping.

use std::fmt;

use crate::coord::TileCoord;

use super::types::ProviderError;

/// OpenFlightMaps-compatible aeronautical chart tiles.
pub const DEFAULT_URL_TEMPLATE: &str =
    "https://nwy-tiles-api.prod.newaydata.com/tiles/{z}/{x}/{y}.png?path={cycle}/aero/latest";

const REQUIRED_PLACEHOLDERS: [&str; 3] = ["{z}", "{x}", "{y}"];

/// URL pattern with `{z}`, `{x}`, `{y}` and optional `{cycle}` placeholders.
///
/// `{y}` is the north-up (XYZ) row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    template: String,
}

impl UrlTemplate {
    /// Validates and wraps a template string.
    pub fn parse(template: impl Into<String>) -> Result<Self, ProviderError> {
        let template = template.into();
        let template = template.trim().to_string();

        if !(template.starts_with("http://") || template.starts_with("https://")) {
            return Err(ProviderError::InvalidTemplate(format!(
                "must be http(s): {}",
                template
            )));
        }
        if let Some(missing) = REQUIRED_PLACEHOLDERS
            .iter()
            .find(|p| !template.contains(*p))
        {
            return Err(ProviderError::InvalidTemplate(format!(
                "missing {}: {}",
                missing, template
            )));
        }

        Ok(Self { template })
    }

    /// Builds the request URL for a tile in a given cycle.
    pub fn render(&self, tile: &TileCoord, cycle: &str) -> String {
        self.template
            .replace("{z}", &tile.zoom.to_string())
            .replace("{x}", &tile.col.to_string())
            .replace("{y}", &tile.row.to_string())
            .replace("{cycle}", cycle)
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }
}

impl Default for UrlTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_URL_TEMPLATE.to_string(),
        }
    }
}

impl fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}
