use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::config::BooksConfig;
use crate::error::SearchError;
use crate::formats::Volume;
use crate::query::{Category, PrintType, SearchQuery, SortOrder, build_request_url};
use crate::render;
use crate::source::VolumeSource;

pub const SEARCH_LABEL: &str = "Search";
pub const SEARCHING_LABEL: &str = "Searching...";
pub const NO_RESULTS_MESSAGE: &str =
    "No books found. Try a different search term or adjust your filters.";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Validation,
    Configuration,
    Api,
    Transport,
    Empty,
}

/// Content of the single notice slot.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn from_error(err: &SearchError) -> Self {
        let kind = match err {
            SearchError::EmptyQuery => NoticeKind::Validation,
            SearchError::NotConfigured => NoticeKind::Configuration,
            SearchError::Forbidden | SearchError::BadRequest | SearchError::Status(_) => {
                NoticeKind::Api
            }
            SearchError::Transport(_) | SearchError::Decode(_) => NoticeKind::Transport,
        };
        Self {
            kind,
            message: err.notice_message(),
        }
    }

    pub fn no_results() -> Self {
        Self {
            kind: NoticeKind::Empty,
            message: NO_RESULTS_MESSAGE.to_owned(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind != NoticeKind::Empty
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Controls {
    pub search_enabled: bool,
    pub search_label: String,
    pub loading_visible: bool,
}

impl Controls {
    fn ready() -> Self {
        Self {
            search_enabled: true,
            search_label: SEARCH_LABEL.to_owned(),
            loading_visible: false,
        }
    }

    fn busy() -> Self {
        Self {
            search_enabled: false,
            search_label: SEARCHING_LABEL.to_owned(),
            loading_visible: true,
        }
    }
}

/// Filter selector values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub sort: SortOrder,
    pub category: Category,
    pub language: Option<String>,
    pub print_type: PrintType,
}

impl Filters {
    pub fn from_form_values(
        sort: &str,
        category: &str,
        language: &str,
        print_type: &str,
    ) -> Self {
        let language = language.trim();
        Self {
            sort: SortOrder::from_form_value(sort),
            category: Category::from_form_value(category),
            language: (!language.is_empty()).then(|| language.to_owned()),
            print_type: PrintType::from_form_value(print_type),
        }
    }
}

/// Everything the page shows. Owned by [`SearchController`].
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// Text box contents as last submitted, before trimming.
    pub query_input: String,
    pub filters: Filters,
    pub filters_visible: bool,
    pub controls: Controls,
    pub notice: Option<Notice>,
    pub grid_html: String,
    pub results_info: Option<String>,
    /// Last accepted search; "apply filters" re-issues it.
    pub last_query: Option<SearchQuery>,
    /// Records behind the grid. Replaced only by a non-empty result.
    pub last_results: Vec<Volume>,
}

impl ViewState {
    fn new(default_sort: SortOrder) -> Self {
        Self {
            query_input: String::new(),
            filters: Filters {
                sort: default_sort,
                ..Default::default()
            },
            filters_visible: false,
            controls: Controls::ready(),
            notice: None,
            grid_html: String::new(),
            results_info: None,
            last_query: None,
            last_results: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Results(Vec<Volume>),
    Notice(Notice),
}

/// Session state plus the search pipeline.
///
/// The state lock is only held between suspension points, so two searches
/// may overlap. Neither cancels the other and whichever response lands last
/// owns the display, even if it belongs to the older request.
pub struct SearchController {
    config: BooksConfig,
    source: Arc<dyn VolumeSource>,
    state: Mutex<ViewState>,
}

impl SearchController {
    pub fn new(config: BooksConfig, source: Arc<dyn VolumeSource>) -> Self {
        let mut state = ViewState::new(config.default_sort);
        if !config.is_configured() {
            tracing::warn!("books api key is not configured; searches are disabled");
            state.notice = Some(Notice::from_error(&SearchError::NotConfigured));
        }
        tracing::info!(api_base_url = %config.api_base_url, "Book Finder initialized");

        Self {
            config,
            source,
            state: Mutex::new(state),
        }
    }

    pub fn snapshot(&self) -> ViewState {
        self.state().clone()
    }

    pub fn toggle_filters(&self) -> bool {
        let mut state = self.state();
        state.filters_visible = !state.filters_visible;
        state.filters_visible
    }

    pub fn set_notice(&self, notice: Notice) {
        self.state().notice = Some(notice);
    }

    pub fn clear_notice(&self) {
        self.state().notice = None;
    }

    /// Re-runs the last accepted search with new filters. Does nothing when
    /// no search has been accepted yet.
    pub async fn apply_filters(&self, filters: Filters) -> Option<SearchOutcome> {
        let last_input = {
            let mut state = self.state();
            state.filters = filters.clone();
            state.last_query.as_ref().map(|q| q.text().to_owned())
        }?;
        Some(self.search(&last_input, filters).await)
    }

    pub async fn search(&self, input: &str, filters: Filters) -> SearchOutcome {
        {
            let mut state = self.state();
            state.query_input = input.to_owned();
            state.filters = filters.clone();
        }

        let query = match SearchQuery::new(input, filters.sort, filters.category.clone()) {
            Ok(query) => query
                .with_language(filters.language.as_deref())
                .with_print_type(filters.print_type),
            Err(err) => return self.finish_with_error(&err),
        };
        let Some(api_key) = self.config.api_key() else {
            return self.finish_with_error(&SearchError::NotConfigured);
        };

        let _busy = self.begin(&query);

        let search_id = uuid::Uuid::new_v4();
        tracing::info!(
            %search_id,
            sort = query.sort.as_str(),
            category = query.category.as_str(),
            "searching books"
        );
        tracing::debug!(%search_id, query = query.text(), "search text");

        let url = match build_request_url(
            &self.config.api_base_url,
            &query,
            self.config.max_results,
            api_key,
        ) {
            Ok(url) => url,
            Err(err) => return self.finish_with_error(&err),
        };

        match self.source.fetch(&url).await {
            Ok(response) => {
                if let Some(total) = response.total_items {
                    tracing::debug!(%search_id, total, "total matches reported");
                }
                let volumes = response.into_items();
                tracing::info!(%search_id, count = volumes.len(), "search finished");
                if volumes.is_empty() {
                    let notice = Notice::no_results();
                    self.set_notice(notice.clone());
                    return SearchOutcome::Notice(notice);
                }

                let mut state = self.state();
                state.grid_html = render::render_grid(&volumes);
                state.results_info = Some(render::results_info(volumes.len()));
                state.last_results = volumes.clone();
                SearchOutcome::Results(volumes)
            }
            Err(err) => {
                tracing::warn!(%search_id, error = %err, "search failed");
                self.finish_with_error(&err)
            }
        }
    }

    /// Marks the controls busy and clears the previous display. Controls go
    /// back to ready when the returned guard drops, on every exit path.
    fn begin(&self, query: &SearchQuery) -> BusyGuard<'_> {
        let mut state = self.state();
        state.last_query = Some(query.clone());
        state.controls = Controls::busy();
        state.grid_html.clear();
        state.results_info = None;
        state.notice = None;
        BusyGuard { state: &self.state }
    }

    fn finish_with_error(&self, err: &SearchError) -> SearchOutcome {
        let notice = Notice::from_error(err);
        self.set_notice(notice.clone());
        SearchOutcome::Notice(notice)
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        lock(&self.state)
    }
}

struct BusyGuard<'a> {
    state: &'a Mutex<ViewState>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        lock(self.state).controls = Controls::ready();
    }
}

fn lock(state: &Mutex<ViewState>) -> MutexGuard<'_, ViewState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use url::Url;

    use super::*;
    use crate::config::API_KEY_PLACEHOLDER;
    use crate::formats::{VolumeInfo, VolumesResponse};

    struct ScriptedSource {
        reply: Result<VolumesResponse, SearchError>,
        calls: AtomicUsize,
        urls: Mutex<Vec<String>>,
    }

    impl ScriptedSource {
        fn new(reply: Result<VolumesResponse, SearchError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
                urls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl VolumeSource for ScriptedSource {
        async fn fetch(&self, url: &Url) -> Result<VolumesResponse, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().unwrap().push(url.to_string());
            self.reply.clone()
        }
    }

    fn config(key: Option<&str>) -> BooksConfig {
        BooksConfig::new(
            key.map(str::to_owned),
            Url::parse("https://books.example/volumes").unwrap(),
        )
    }

    fn dune() -> VolumesResponse {
        VolumesResponse {
            total_items: Some(1),
            items: Some(vec![Volume {
                id: Some("d1".into()),
                volume_info: VolumeInfo {
                    title: Some("Dune".into()),
                    authors: Some(vec!["Frank Herbert".into()]),
                    ..Default::default()
                },
            }]),
        }
    }

    #[tokio::test]
    async fn whitespace_query_makes_no_call() {
        let source = ScriptedSource::new(Ok(dune()));
        let controller = SearchController::new(config(Some("k")), source.clone());

        let outcome = controller.search("   \t ", Filters::default()).await;

        assert_eq!(source.calls(), 0);
        let SearchOutcome::Notice(notice) = outcome else {
            panic!("expected notice");
        };
        assert_eq!(notice.kind, NoticeKind::Validation);
        assert_eq!(notice.message, "Please enter a search term");
        assert_eq!(controller.snapshot().notice, Some(notice));
        assert_eq!(controller.snapshot().last_query, None);
    }

    #[tokio::test]
    async fn missing_or_placeholder_key_makes_no_call() {
        for key in [None, Some(""), Some(API_KEY_PLACEHOLDER)] {
            let source = ScriptedSource::new(Ok(dune()));
            let controller = SearchController::new(config(key), source.clone());

            let startup = controller.snapshot().notice.expect("startup notice");
            assert_eq!(startup.kind, NoticeKind::Configuration);

            let outcome = controller.search("dune", Filters::default()).await;
            assert_eq!(source.calls(), 0);
            assert!(matches!(
                outcome,
                SearchOutcome::Notice(Notice {
                    kind: NoticeKind::Configuration,
                    ..
                })
            ));
        }
    }

    #[tokio::test]
    async fn successful_search_renders_grid_and_restores_controls() {
        let source = ScriptedSource::new(Ok(dune()));
        let controller = SearchController::new(config(Some("k")), source.clone());

        let outcome = controller.search(" dune ", Filters::default()).await;

        assert!(matches!(outcome, SearchOutcome::Results(ref v) if v.len() == 1));
        let view = controller.snapshot();
        assert!(view.grid_html.contains("Dune"));
        assert_eq!(view.results_info.as_deref(), Some("Found 1 results"));
        assert_eq!(view.notice, None);
        assert_eq!(view.controls, Controls::ready());
        assert_eq!(view.last_query.as_ref().map(SearchQuery::text), Some("dune"));
        assert_eq!(view.last_results.len(), 1);

        let urls = source.urls.lock().unwrap().clone();
        assert_eq!(
            urls,
            vec!["https://books.example/volumes?q=dune&orderBy=relevance&maxResults=40&key=k"]
        );
    }

    #[tokio::test]
    async fn empty_result_shows_notice_and_empty_grid() {
        for reply in [
            VolumesResponse::default(),
            VolumesResponse {
                total_items: Some(0),
                items: Some(Vec::new()),
            },
        ] {
            let source = ScriptedSource::new(Ok(reply));
            let controller = SearchController::new(config(Some("k")), source);

            let outcome = controller.search("zzzz", Filters::default()).await;

            assert_eq!(outcome, SearchOutcome::Notice(Notice::no_results()));
            let view = controller.snapshot();
            assert!(view.grid_html.is_empty());
            assert_eq!(view.results_info, None);
            assert_eq!(view.controls, Controls::ready());
        }
    }

    #[tokio::test]
    async fn api_errors_replace_previous_results() {
        let controller =
            SearchController::new(config(Some("k")), ScriptedSource::new(Ok(dune())));
        controller.search("dune", Filters::default()).await;
        assert!(!controller.snapshot().grid_html.is_empty());

        let failing = SearchController {
            config: config(Some("k")),
            source: ScriptedSource::new(Err(SearchError::Forbidden)),
            state: Mutex::new(controller.snapshot()),
        };
        let outcome = failing.search("dune", Filters::default()).await;

        let SearchOutcome::Notice(notice) = outcome else {
            panic!("expected notice");
        };
        assert_eq!(notice.kind, NoticeKind::Api);
        assert!(notice.message.contains("quota"));
        let view = failing.snapshot();
        assert!(view.grid_html.is_empty());
        assert_eq!(view.controls, Controls::ready());
    }

    #[tokio::test]
    async fn transport_error_without_text_uses_generic_message() {
        let source = ScriptedSource::new(Err(SearchError::Transport(String::new())));
        let controller = SearchController::new(config(Some("k")), source);

        let outcome = controller.search("dune", Filters::default()).await;

        let SearchOutcome::Notice(notice) = outcome else {
            panic!("expected notice");
        };
        assert_eq!(notice.kind, NoticeKind::Transport);
        assert_eq!(notice.message, crate::error::GENERIC_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn repeated_search_renders_identical_grid() {
        let source = ScriptedSource::new(Ok(dune()));
        let controller = SearchController::new(config(Some("k")), source.clone());

        controller.search("dune", Filters::default()).await;
        let first = controller.snapshot().grid_html;
        controller.search("dune", Filters::default()).await;
        let second = controller.snapshot().grid_html;

        assert_eq!(source.calls(), 2);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn apply_filters_reissues_last_query() {
        let source = ScriptedSource::new(Ok(dune()));
        let controller = SearchController::new(config(Some("k")), source.clone());

        let filters = Filters::from_form_values("newest", "fiction", "", "");
        assert_eq!(controller.apply_filters(filters.clone()).await, None);
        assert_eq!(source.calls(), 0);

        controller.search("dune", Filters::default()).await;
        let outcome = controller.apply_filters(filters).await;

        assert!(matches!(outcome, Some(SearchOutcome::Results(_))));
        let urls = source.urls.lock().unwrap().clone();
        assert_eq!(urls.len(), 2);
        assert!(urls[1].contains("q=dune+subject:fiction&orderBy=newest"));
    }

    #[test]
    fn toggle_flips_filter_panel() {
        let controller =
            SearchController::new(config(Some("k")), ScriptedSource::new(Ok(dune())));
        assert!(!controller.snapshot().filters_visible);
        assert!(controller.toggle_filters());
        assert!(!controller.toggle_filters());
    }

    #[test]
    fn notice_slot_holds_one_message() {
        let controller =
            SearchController::new(config(Some("k")), ScriptedSource::new(Ok(dune())));
        controller.set_notice(Notice::from_error(&SearchError::BadRequest));
        controller.set_notice(Notice::no_results());
        assert_eq!(controller.snapshot().notice, Some(Notice::no_results()));
        controller.clear_notice();
        assert_eq!(controller.snapshot().notice, None);
    }

    #[test]
    fn busy_guard_restores_controls_on_drop() {
        let controller =
            SearchController::new(config(Some("k")), ScriptedSource::new(Ok(dune())));
        let query = SearchQuery::new("dune", SortOrder::Relevance, Category::All).unwrap();
        {
            let _busy = controller.begin(&query);
            let view = controller.snapshot();
            assert!(!view.controls.search_enabled);
            assert_eq!(view.controls.search_label, SEARCHING_LABEL);
            assert!(view.controls.loading_visible);
        }
        assert_eq!(controller.snapshot().controls, Controls::ready());
    }
}
