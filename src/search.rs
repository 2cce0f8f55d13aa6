use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::app::controller::{Filters, SearchController, SearchOutcome};
use crate::cli::{ConfigArgs, OutputFormat, SearchArgs};
use crate::config::{BooksConfig, ConfigOverrides};
use crate::query::{Category, PrintType, SortOrder};
use crate::render;
use crate::source::HttpVolumeSource;

pub fn load_config(args: &ConfigArgs) -> anyhow::Result<BooksConfig> {
    let overrides = ConfigOverrides {
        api_key: args.api_key.clone(),
        api_base_url: args.api_base_url.clone(),
        max_results: args.max_results,
    };
    BooksConfig::load(args.config.as_deref().map(Path::new), overrides).context("load config")
}

pub async fn run(args: SearchArgs) -> anyhow::Result<()> {
    let config = load_config(&args.connection)?;
    tracing::debug!(?config, "resolved config");

    let filters = Filters {
        sort: args
            .sort
            .as_deref()
            .map(SortOrder::from_form_value)
            .unwrap_or(config.default_sort),
        category: Category::from_form_value(&args.category),
        language: args.lang.clone(),
        print_type: PrintType::from_form_value(&args.print_type),
    };

    let source = HttpVolumeSource::new()?;
    let controller = SearchController::new(config, Arc::new(source));

    match controller.search(&args.query, filters).await {
        SearchOutcome::Results(volumes) => {
            let out = match args.format {
                OutputFormat::Text => format!(
                    "{}\n\n{}",
                    render::results_info(volumes.len()),
                    render::render_text(&volumes)
                ),
                OutputFormat::Html => render::render_grid(&volumes),
                OutputFormat::Json => {
                    let mut json =
                        serde_json::to_string_pretty(&volumes).context("serialize results")?;
                    json.push('\n');
                    json
                }
            };
            print!("{out}");
        }
        SearchOutcome::Notice(notice) if notice.is_error() => {
            anyhow::bail!("{}", notice.message);
        }
        SearchOutcome::Notice(notice) => {
            println!("{}", notice.message);
        }
    }

    Ok(())
}
