//! Party domain configuration

use serde::Deserialize;

use core_kernel::{CoreError, LocaleId, PageRequest};

use crate::reference::SortIndexOrder;

/// Party domain configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PartyConfig {
    /// Page size used when a caller does not ask for one
    pub default_page_size: u32,
    /// Upper bound applied to every page request
    pub max_page_size: u32,
    /// Sort-index direction for reference-data listings
    pub sort_index_order: SortIndexOrder,
    /// Locale used when validating reference codes
    pub default_locale: String,
}

impl Default for PartyConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
            sort_index_order: SortIndexOrder::Descending,
            default_locale: "en-US".to_string(),
        }
    }
}

impl PartyConfig {
    /// Loads configuration from `PARTY_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("PARTY").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Reads a `.env` file when present, then loads from the environment
    pub fn load() -> Result<Self, CoreError> {
        dotenvy::dotenv().ok();
        let config = Self::from_env().map_err(|e| CoreError::configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values are usable
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.max_page_size == 0 {
            return Err(CoreError::configuration("max_page_size must be at least 1"));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(CoreError::configuration(
                "default_page_size must be between 1 and max_page_size",
            ));
        }
        LocaleId::parse(&self.default_locale)?;
        Ok(())
    }

    /// Builds a page request, applying the default size and the size cap
    pub fn page_request(&self, page_index: u32, page_size: Option<u32>) -> PageRequest {
        PageRequest::new(page_index, page_size.unwrap_or(self.default_page_size))
            .clamped(self.max_page_size)
    }

    /// Caps an incoming page request
    pub fn clamp(&self, page: PageRequest) -> PageRequest {
        page.clamped(self.max_page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PartyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sort_index_order, SortIndexOrder::Descending);
    }

    #[test]
    fn test_page_request_is_clamped() {
        let config = PartyConfig::default();
        assert_eq!(config.page_request(0, None).page_size, 20);
        assert_eq!(config.page_request(2, Some(500)).page_size, 100);
    }

    #[test]
    fn test_invalid_configuration() {
        let config = PartyConfig {
            default_page_size: 200,
            ..PartyConfig::default()
        };
        assert!(config.validate().is_err());

        let config = PartyConfig {
            default_locale: "not a locale!".to_string(),
            ..PartyConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
