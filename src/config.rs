use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;
use url::Url;

use crate::query::SortOrder;

/// Value shipped in example configs; treated as "no key".
pub const API_KEY_PLACEHOLDER: &str = "YOUR_API_KEY_HERE";
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/books/v1/volumes";
pub const DEFAULT_MAX_RESULTS: u32 = 40;
/// Upper bound the volumes endpoint accepts for `maxResults`.
pub const MAX_RESULTS_LIMIT: u32 = 40;

pub const ENV_API_KEY: &str = "BOOKFINDER_API_KEY";
pub const ENV_API_BASE_URL: &str = "BOOKFINDER_API_BASE_URL";
pub const ENV_MAX_RESULTS: &str = "BOOKFINDER_MAX_RESULTS";
pub const ENV_DEFAULT_SORT: &str = "BOOKFINDER_DEFAULT_SORT";

/// On-disk YAML configuration. All keys are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub max_results: Option<u32>,
    /// Same values as the sort form field; anything else means relevance.
    pub default_sort: Option<String>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config file: {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("parse config file: {}", path.display()))
    }
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub max_results: Option<u32>,
}

#[derive(Clone)]
pub struct BooksConfig {
    api_key: Option<String>,
    pub api_base_url: Url,
    pub max_results: u32,
    pub default_sort: SortOrder,
}

impl std::fmt::Debug for BooksConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BooksConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url.as_str())
            .field("max_results", &self.max_results)
            .field("default_sort", &self.default_sort)
            .finish()
    }
}

impl BooksConfig {
    pub fn new(api_key: Option<String>, api_base_url: Url) -> Self {
        Self {
            api_key,
            api_base_url,
            max_results: DEFAULT_MAX_RESULTS,
            default_sort: SortOrder::Relevance,
        }
    }

    /// Reads the optional YAML file and the process environment, then applies
    /// `overrides`.
    pub fn load(config_path: Option<&Path>, overrides: ConfigOverrides) -> anyhow::Result<Self> {
        let file = match config_path {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        Self::resolve(file, |name| std::env::var(name).ok(), overrides)
    }

    /// Precedence: overrides, then environment, then file, then defaults.
    pub fn resolve(
        file: ConfigFile,
        env: impl Fn(&str) -> Option<String>,
        overrides: ConfigOverrides,
    ) -> anyhow::Result<Self> {
        let env = |name: &str| {
            env(name)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };

        let api_key = overrides
            .api_key
            .or_else(|| env(ENV_API_KEY))
            .or(file.api_key);

        let base = overrides
            .api_base_url
            .or_else(|| env(ENV_API_BASE_URL))
            .or(file.api_base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned());
        let api_base_url =
            Url::parse(base.trim()).with_context(|| format!("parse api base url: {base}"))?;
        if api_base_url.scheme() != "http" && api_base_url.scheme() != "https" {
            anyhow::bail!("api base url must be http/https: {api_base_url}");
        }
        if api_base_url.fragment().is_some() {
            anyhow::bail!("api base url must not contain a fragment: {api_base_url}");
        }

        let max_results = match overrides.max_results {
            Some(v) => v,
            None => match env(ENV_MAX_RESULTS) {
                Some(raw) => raw
                    .parse::<u32>()
                    .with_context(|| format!("parse {ENV_MAX_RESULTS}: {raw}"))?,
                None => file.max_results.unwrap_or(DEFAULT_MAX_RESULTS),
            },
        };
        if max_results == 0 || max_results > MAX_RESULTS_LIMIT {
            anyhow::bail!(
                "max results must be between 1 and {MAX_RESULTS_LIMIT}: {max_results}"
            );
        }

        let default_sort = env(ENV_DEFAULT_SORT)
            .or(file.default_sort)
            .map(|v| SortOrder::from_form_value(&v))
            .unwrap_or_default();

        Ok(Self {
            api_key,
            api_base_url,
            max_results,
            default_sort,
        })
    }

    /// The key, unless it is missing, blank, or the placeholder.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != API_KEY_PLACEHOLDER)
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }
}
