use crate::app::controller::ViewState;
use crate::query::{Category, PrintType, SortOrder};
use crate::render::{escape_html, render_notice};

pub const CATEGORY_OPTIONS: &[(&str, &str)] = &[
    ("all", "All Categories"),
    ("fiction", "Fiction"),
    ("science", "Science"),
    ("history", "History"),
    ("biography", "Biography"),
    ("technology", "Technology"),
    ("business", "Business"),
    ("self-help", "Self-Help"),
    ("poetry", "Poetry"),
    ("cooking", "Cooking"),
];

const SORT_OPTIONS: &[(SortOrder, &str)] = &[
    (SortOrder::Relevance, "Relevance"),
    (SortOrder::Newest, "Newest First"),
];

const PRINT_TYPE_OPTIONS: &[(PrintType, &str)] = &[
    (PrintType::All, "All"),
    (PrintType::Books, "Books"),
    (PrintType::Magazines, "Magazines"),
];

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f5f5f7; color: #222; }
header { padding: 24px; text-align: center; }
.search-bar { display: flex; gap: 8px; justify-content: center; flex-wrap: wrap; }
.search-bar input[type=text] { width: min(480px, 90vw); padding: 10px; }
.filters { display: flex; gap: 12px; justify-content: center; margin-top: 12px; }
.hidden { display: none; }
.error-message { margin: 16px auto; max-width: 640px; padding: 12px; background: #fdecea; border-radius: 6px; }
.books-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); gap: 16px; padding: 24px; }
.book-card { background: #fff; border-radius: 8px; overflow: hidden; box-shadow: 0 1px 3px rgba(0,0,0,.1); }
.book-cover img { width: 100%; height: 280px; object-fit: cover; }
.book-cover-placeholder { height: 280px; display: flex; align-items: center; justify-content: center; font-size: 64px; }
.book-info { padding: 12px; }
.book-title { font-weight: 600; }
.book-category { display: inline-block; font-size: 12px; padding: 2px 8px; background: #eef; border-radius: 10px; }
.book-description { font-size: 13px; max-height: 6em; overflow: hidden; }
"#;

fn option(value: &str, label: &str, selected: bool) -> String {
    format!(
        "<option value=\"{}\"{}>{}</option>",
        escape_html(value),
        if selected { " selected" } else { "" },
        escape_html(label)
    )
}

fn category_options(current: &Category) -> String {
    let mut out = String::new();
    let mut matched = false;
    for (value, label) in CATEGORY_OPTIONS {
        let selected = current.as_str().eq_ignore_ascii_case(value);
        matched |= selected;
        out.push_str(&option(value, label, selected));
    }
    if !matched {
        out.push_str(&option(current.as_str(), current.as_str(), true));
    }
    out
}

fn display(visible: bool) -> &'static str {
    if visible { "block" } else { "none" }
}

/// Renders the whole search page for the current view.
pub fn render_page(view: &ViewState) -> String {
    let sort_options = SORT_OPTIONS
        .iter()
        .map(|(sort, label)| option(sort.as_str(), label, *sort == view.filters.sort))
        .collect::<String>();
    let print_type_options = PRINT_TYPE_OPTIONS
        .iter()
        .map(|(kind, label)| option(kind.as_str(), label, *kind == view.filters.print_type))
        .collect::<String>();
    let notice = view
        .notice
        .as_ref()
        .map(|notice| render_notice(&notice.message))
        .unwrap_or_default();

    let mut out = String::new();
    out.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str("<title>Book Finder</title>\n");
    out.push_str(&format!("<style>{STYLE}</style>\n"));
    out.push_str("</head>\n<body>\n<header>\n<h1>📚 Book Finder</h1>\n");

    out.push_str("<form id=\"searchForm\" action=\"/search\" method=\"get\">\n");
    out.push_str("<div class=\"search-bar\">\n");
    out.push_str(&format!(
        "<input type=\"text\" id=\"searchInput\" name=\"q\" placeholder=\"Search for books by title, author, or keyword...\" value=\"{}\">\n",
        escape_html(&view.query_input)
    ));
    out.push_str(&format!(
        "<button type=\"submit\" id=\"searchBtn\"{}>{}</button>\n",
        if view.controls.search_enabled { "" } else { " disabled" },
        escape_html(&view.controls.search_label)
    ));
    out.push_str(
        "<button type=\"submit\" id=\"filterToggle\" formaction=\"/filters/toggle\" formmethod=\"post\">Filters</button>\n",
    );
    out.push_str("</div>\n");

    out.push_str(&format!(
        "<div id=\"filters\" class=\"filters{}\">\n",
        if view.filters_visible { "" } else { " hidden" }
    ));
    out.push_str(&format!(
        "<label>Sort by <select id=\"sortBy\" name=\"sort\">{sort_options}</select></label>\n"
    ));
    out.push_str(&format!(
        "<label>Category <select id=\"category\" name=\"category\">{}</select></label>\n",
        category_options(&view.filters.category)
    ));
    out.push_str(&format!(
        "<label>Print type <select id=\"printType\" name=\"print_type\">{print_type_options}</select></label>\n"
    ));
    out.push_str(&format!(
        "<label>Language <input type=\"text\" id=\"language\" name=\"lang\" size=\"4\" value=\"{}\"></label>\n",
        escape_html(view.filters.language.as_deref().unwrap_or_default())
    ));
    out.push_str(
        "<button type=\"submit\" id=\"applyFilters\" formaction=\"/filters/apply\" formmethod=\"post\">Apply Filters</button>\n",
    );
    out.push_str("</div>\n</form>\n</header>\n<main>\n");

    out.push_str(&format!("<div id=\"errorMessage\">{notice}</div>\n"));
    out.push_str(&format!(
        "<div id=\"loading\" class=\"loading\" style=\"display: {}\">Searching for books...</div>\n",
        display(view.controls.loading_visible)
    ));
    out.push_str(&format!(
        "<div id=\"resultsInfo\" class=\"results-info\" style=\"display: {}\">{}</div>\n",
        display(view.results_info.is_some()),
        escape_html(view.results_info.as_deref().unwrap_or_default())
    ));
    out.push_str(&format!(
        "<div id=\"booksGrid\" class=\"books-grid\">\n{}</div>\n",
        view.grid_html
    ));
    out.push_str("</main>\n</body>\n</html>\n");
    out
}
