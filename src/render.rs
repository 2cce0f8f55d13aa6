//! HTML and plain-text rendering of result records.
//!
//! Every API-supplied string that ends up in markup goes through
//! [`escape_html`]. URLs are additionally restricted to `http`/`https` before
//! they are placed in `src`/`href` attributes.

use chrono::NaiveDate;
use url::Url;

use crate::formats::{Volume, VolumeInfo};

pub const COVER_PLACEHOLDER: &str = "📖";
pub const UNKNOWN_AUTHOR: &str = "Author unknown";
pub const PREVIEW_LINK_LABEL: &str = "View on Google Books →";

/// Escapes text for use both in element content and in quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Returns the first candidate that is present and not blank.
pub fn first_present<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|value| !value.trim().is_empty())
}

/// Best available cover URL: the larger thumbnail first, upgraded to https
/// and without the `zoom` parameter.
pub fn cover_url(info: &VolumeInfo) -> Option<String> {
    let links = info.image_links.as_ref()?;
    let raw = first_present(&[links.thumbnail.as_deref(), links.small_thumbnail.as_deref()])?;
    web_url(&normalize_cover_url(raw))
}

pub fn normalize_cover_url(raw: &str) -> String {
    let raw = raw.trim();
    let upgraded = match raw.get(..5) {
        Some(scheme) if scheme.eq_ignore_ascii_case("http:") => format!("https:{}", &raw[5..]),
        _ => raw.to_owned(),
    };
    strip_query_param(&upgraded, "zoom")
}

fn strip_query_param(url: &str, name: &str) -> String {
    let (head, fragment) = match url.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (url, None),
    };
    let Some((path, query)) = head.split_once('?') else {
        return url.to_owned();
    };

    let kept = query
        .split('&')
        .filter(|pair| {
            let key = pair.split('=').next().unwrap_or_default();
            !key.eq_ignore_ascii_case(name)
        })
        .collect::<Vec<_>>();

    let mut out = path.to_owned();
    if !kept.is_empty() {
        out.push('?');
        out.push_str(&kept.join("&"));
    }
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

/// Accepts only absolute `http`/`https` URLs.
pub fn web_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let parsed = Url::parse(raw).ok()?;
    match parsed.scheme() {
        "http" | "https" => Some(raw.to_owned()),
        _ => None,
    }
}

/// `1965-08-01` → `August 1, 1965`, `1965-08` → `August 1965`. Anything else
/// is returned as given.
pub fn format_published_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%B %-d, %Y").to_string();
    }
    if raw.len() == 7
        && let Ok(date) = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
    {
        return date.format("%B %Y").to_string();
    }
    raw.to_owned()
}

pub fn authors_line(info: &VolumeInfo) -> String {
    match info.authors.as_deref() {
        Some(authors) if !authors.is_empty() => format!("by {}", authors.join(", ")),
        _ => UNKNOWN_AUTHOR.to_owned(),
    }
}

fn first_category(info: &VolumeInfo) -> Option<&str> {
    let categories = info.categories.as_deref()?;
    first_present(&categories.iter().map(|c| Some(c.as_str())).collect::<Vec<_>>())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    first_present(&[value])
}

pub fn render_card(volume: &Volume) -> String {
    let info = &volume.volume_info;
    let title = escape_html(info.title.as_deref().unwrap_or_default());

    let cover = match cover_url(info) {
        Some(src) => format!(
            r#"<img src="{}" alt="{title}" loading="lazy">"#,
            escape_html(&src)
        ),
        None => format!(r#"<div class="book-cover-placeholder">{COVER_PLACEHOLDER}</div>"#),
    };

    let mut out = String::new();
    out.push_str("<div class=\"book-card\">\n");
    out.push_str(&format!("  <div class=\"book-cover\">{cover}</div>\n"));
    out.push_str("  <div class=\"book-info\">\n");
    out.push_str(&format!("    <div class=\"book-title\">{title}</div>\n"));
    out.push_str(&format!(
        "    <div class=\"book-authors\">{}</div>\n",
        escape_html(&authors_line(info))
    ));
    if let Some(date) = non_blank(info.published_date.as_deref()) {
        out.push_str(&format!(
            "    <div class=\"book-date\">Published: {}</div>\n",
            escape_html(&format_published_date(date))
        ));
    }
    if let Some(category) = first_category(info) {
        out.push_str(&format!(
            "    <span class=\"book-category\">{}</span>\n",
            escape_html(category)
        ));
    }
    if let Some(description) = non_blank(info.description.as_deref()) {
        out.push_str(&format!(
            "    <div class=\"book-description\">{}</div>\n",
            escape_html(description)
        ));
    }
    if let Some(link) = non_blank(info.preview_link.as_deref()).and_then(web_url) {
        out.push_str(&format!(
            "    <a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"book-link\">{PREVIEW_LINK_LABEL}</a>\n",
            escape_html(&link)
        ));
    }
    out.push_str("  </div>\n");
    out.push_str("</div>\n");
    out
}

/// Inner markup of the results grid, one card per record in order.
pub fn render_grid(volumes: &[Volume]) -> String {
    volumes.iter().map(render_card).collect()
}

pub fn render_notice(message: &str) -> String {
    format!(
        "<div class=\"error-message\">⚠️ {}</div>",
        escape_html(message)
    )
}

pub fn results_info(count: usize) -> String {
    format!("Found {count} results")
}

/// Terminal rendering; no escaping since nothing is interpreted as markup.
pub fn render_text(volumes: &[Volume]) -> String {
    let mut out = String::new();
    for (idx, volume) in volumes.iter().enumerate() {
        let info = &volume.volume_info;
        let title = non_blank(info.title.as_deref()).unwrap_or("(untitled)");
        out.push_str(&format!("{}. {title}\n", idx + 1));
        out.push_str(&format!("   {}\n", authors_line(info)));
        if let Some(date) = non_blank(info.published_date.as_deref()) {
            out.push_str(&format!(
                "   Published: {}\n",
                format_published_date(date)
            ));
        }
        if let Some(category) = first_category(info) {
            out.push_str(&format!("   Category: {category}\n"));
        }
        if let Some(link) = non_blank(info.preview_link.as_deref()).and_then(web_url) {
            out.push_str(&format!("   {link}\n"));
        }
    }
    out
}
