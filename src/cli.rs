use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search the books API once and print the results.
    Search(SearchArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Html,
    Json,
}

/// Connection settings shared by the CLI and the web app.
#[derive(Clone, Args)]
pub struct ConfigArgs {
    /// YAML config file (`api_key`, `api_base_url`, `max_results`, `default_sort`).
    #[arg(long)]
    pub config: Option<String>,

    /// API key (default: `BOOKFINDER_API_KEY` or the config file).
    #[arg(long)]
    pub api_key: Option<String>,

    /// Volumes endpoint (default: `BOOKFINDER_API_BASE_URL` or the Google Books API).
    #[arg(long)]
    pub api_base_url: Option<String>,

    /// Results per request, 1-40.
    #[arg(long)]
    pub max_results: Option<u32>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Free-text query (title, author, keyword).
    #[arg(long)]
    pub query: String,

    /// `relevance` or `newest`; anything else orders by relevance.
    #[arg(long)]
    pub sort: Option<String>,

    /// Subject filter, or `all`.
    #[arg(long, default_value = "all")]
    pub category: String,

    /// Two-letter language restriction (e.g. `en`).
    #[arg(long)]
    pub lang: Option<String>,

    /// `all`, `books` or `magazines`.
    #[arg(long, default_value = "all")]
    pub print_type: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub connection: ConfigArgs,
}

impl std::fmt::Debug for ConfigArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigArgs")
            .field("config", &self.config)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("max_results", &self.max_results)
            .finish()
    }
}
