use std::sync::Arc;

use axum::Router;
use axum::extract::{Form, Query, State};
use axum::response::{Html, Redirect};
use axum::routing::{get, post};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::app::controller::{Filters, SearchController};
use crate::app::page::render_page;

/// Fields of the search form. Missing fields read as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub q: String,
    pub sort: String,
    pub category: String,
    pub lang: String,
    pub print_type: String,
}

impl SearchForm {
    fn filters(&self) -> Filters {
        Filters::from_form_values(&self.sort, &self.category, &self.lang, &self.print_type)
    }
}

pub fn router(controller: Arc<SearchController>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/search", get(search))
        .route("/filters/toggle", post(toggle_filters))
        .route("/filters/apply", post(apply_filters))
        .route("/healthz", get(|| async { "ok\n" }))
        .layer(TraceLayer::new_for_http())
        .with_state(controller)
}

async fn index(State(controller): State<Arc<SearchController>>) -> Html<String> {
    Html(render_page(&controller.snapshot()))
}

async fn search(
    State(controller): State<Arc<SearchController>>,
    Query(form): Query<SearchForm>,
) -> Html<String> {
    controller.search(&form.q, form.filters()).await;
    Html(render_page(&controller.snapshot()))
}

async fn toggle_filters(State(controller): State<Arc<SearchController>>) -> Redirect {
    let visible = controller.toggle_filters();
    tracing::debug!(visible, "toggled filter panel");
    Redirect::to("/")
}

async fn apply_filters(
    State(controller): State<Arc<SearchController>>,
    Form(form): Form<SearchForm>,
) -> Redirect {
    if controller.apply_filters(form.filters()).await.is_none() {
        tracing::debug!("no previous search; filters stored only");
    }
    Redirect::to("/")
}
