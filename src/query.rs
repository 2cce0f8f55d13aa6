use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::SearchError;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Relevance,
    Newest,
}

impl SortOrder {
    /// Anything other than `newest` orders by relevance.
    pub fn from_form_value(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("newest") {
            Self::Newest
        } else {
            Self::Relevance
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Newest => "newest",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Category {
    #[default]
    All,
    Subject(String),
}

impl Category {
    pub fn from_form_value(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Subject(value.to_owned())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Subject(subject) => subject,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PrintType {
    #[default]
    All,
    Books,
    Magazines,
}

impl PrintType {
    pub fn from_form_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "books" => Self::Books,
            "magazines" => Self::Magazines,
            _ => Self::All,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Books => "books",
            Self::Magazines => "magazines",
        }
    }
}

/// A validated search: the text is trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    pub sort: SortOrder,
    pub category: Category,
    pub language: Option<String>,
    pub print_type: PrintType,
}

impl SearchQuery {
    pub fn new(raw: &str, sort: SortOrder, category: Category) -> Result<Self, SearchError> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        Ok(Self {
            text: text.to_owned(),
            sort,
            category,
            language: None,
            print_type: PrintType::All,
        })
    }

    pub fn with_language(mut self, language: Option<&str>) -> Self {
        self.language = language
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned);
        self
    }

    pub fn with_print_type(mut self, print_type: PrintType) -> Self {
        self.print_type = print_type;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Builds the volumes request URL.
///
/// The category clause is glued onto `q` with a literal `+`, which the API
/// reads as a space between search terms.
pub fn build_request_url(
    base: &Url,
    query: &SearchQuery,
    max_results: u32,
    api_key: &str,
) -> Result<Url, SearchError> {
    // Parameters must land in the query, never after a `#`.
    let mut base = base.clone();
    base.set_fragment(None);
    let separator = if base.query().is_some() { '&' } else { '?' };
    let mut out = format!("{base}{separator}q={}", urlencoding::encode(query.text()));

    if let Category::Subject(subject) = &query.category {
        out.push_str("+subject:");
        out.push_str(&urlencoding::encode(subject));
    }

    out.push_str("&orderBy=");
    out.push_str(query.sort.as_str());

    if let Some(language) = &query.language {
        out.push_str("&langRestrict=");
        out.push_str(&urlencoding::encode(language));
    }
    if query.print_type != PrintType::All {
        out.push_str("&printType=");
        out.push_str(query.print_type.as_str());
    }

    out.push_str(&format!("&maxResults={max_results}"));
    out.push_str("&key=");
    out.push_str(&urlencoding::encode(api_key));

    Url::parse(&out).map_err(|err| SearchError::Transport(format!("build request url: {err}")))
}
