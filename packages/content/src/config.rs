//! Content store connection settings.

use crate::ContentError;

/// Environment variable holding the content store project identifier.
pub const PROJECT_ID_VAR: &str = "POI_MAP_PROJECT_ID";
/// Environment variable overriding the dataset name.
pub const DATASET_VAR: &str = "POI_MAP_DATASET";
/// Environment variable overriding the query API version.
pub const API_VERSION_VAR: &str = "POI_MAP_API_VERSION";
/// Environment variable toggling the CDN-backed query host.
pub const USE_CDN_VAR: &str = "POI_MAP_USE_CDN";

const DEFAULT_DATASET: &str = "production";
const DEFAULT_API_VERSION: &str = "2021-10-21";

/// Where and how to reach the content store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentConfig {
    /// Project identifier. Required.
    pub project_id: String,
    /// Dataset within the project.
    pub dataset: String,
    /// Dated API version, e.g. `2021-10-21`.
    pub api_version: String,
    /// Query through the cached CDN host instead of the live API.
    pub use_cdn: bool,
}

impl ContentConfig {
    /// Creates a config for `project_id` with the default dataset, API
    /// version and CDN enabled.
    #[must_use]
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: DEFAULT_DATASET.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            use_cdn: true,
        }
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::ConfigurationMissing`] if
    /// `POI_MAP_PROJECT_ID` is unset or blank.
    pub fn from_env() -> Result<Self, ContentError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable
    /// name to its value.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::ConfigurationMissing`] if the project ID
    /// is absent or blank.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ContentError> {
        let project_id = lookup(PROJECT_ID_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ContentError::ConfigurationMissing {
                name: PROJECT_ID_VAR,
            })?;

        let mut config = Self::new(project_id);

        if let Some(dataset) = lookup(DATASET_VAR).filter(|v| !v.trim().is_empty()) {
            config.dataset = dataset.trim().to_string();
        }
        if let Some(version) = lookup(API_VERSION_VAR).filter(|v| !v.trim().is_empty()) {
            config.api_version = version.trim().trim_start_matches('v').to_string();
        }
        if let Some(flag) = lookup(USE_CDN_VAR) {
            config.use_cdn = !matches!(flag.trim(), "0" | "false" | "no" | "off");
        }

        Ok(config)
    }

    /// Base URL of the GROQ query endpoint for this project and dataset.
    #[must_use]
    pub fn query_url(&self) -> String {
        let host = if self.use_cdn { "apicdn" } else { "api" };
        format!(
            "https://{}.{host}.sanity.io/v{}/data/query/{}",
            self.project_id, self.api_version, self.dataset
        )
    }
}
