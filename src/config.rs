use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::catalog::default_base_url;
use crate::error::FilterError;

const DEFAULT_ENV: &str = "sandbox";
const DEFAULT_PER_PAGE: i64 = 100;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const USAGE_EXAMPLE: &str = "Usage:
  TOKEN=<TOKEN> ENV=sandbox event-filter --search \"nba\" --category-type sport > filtered.json
  TOKEN=<TOKEN> event-filter query-events <search>
  TOKEN=<TOKEN> event-filter query-tickets <event_id>
  TOKEN=<TOKEN> event-filter query-autocomplete <search>";

/// Command line flags.
#[derive(Debug, Parser)]
#[command(
    name = "event-filter",
    version,
    about = "Page through the event catalog and keep only one category type",
    after_help = "The bearer token is read from the TOKEN environment variable."
)]
pub struct Cli {
    #[command(subcommand)]
    pub lookup: Option<Lookup>,
    /// Search text, e.g. "nba".
    #[arg(long)]
    pub search: Option<String>,
    /// Category type to keep, e.g. sport, concert, theater.
    #[arg(long = "category-type")]
    pub category_type: Option<String>,
    /// Environment subdomain (sandbox, prod, ...).
    #[arg(long, env = "ENV", default_value = DEFAULT_ENV, global = true)]
    pub env: String,
    /// Results per page.
    #[arg(long = "per-page", default_value_t = DEFAULT_PER_PAGE, allow_negative_numbers = true)]
    pub per_page: i64,
    /// Stop after this many pages. 0 = no limit.
    #[arg(long = "max-pages", default_value_t = 0)]
    pub max_pages: u32,
    /// HTTP timeout in seconds. 0 = no timeout.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout: u64,
    /// Endpoint origin; overrides the one derived from --env.
    #[arg(long = "base-url", env = "CATALOG_BASE_URL", global = true)]
    pub base_url: Option<String>,
    /// Print one progress line per page to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

/// One-shot catalog queries. The response is pretty-printed to stdout as is.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Lookup {
    /// First ten search results for a text query.
    #[command(name = "query-events")]
    Events { search: String },
    /// Ticket listings of one event.
    #[command(name = "query-tickets")]
    Tickets { event_id: String },
    /// Autocomplete suggestions across events, performers, venues and categories.
    #[command(name = "query-autocomplete")]
    Autocomplete { search: String },
}

impl Lookup {
    fn validate(self) -> Result<Self, FilterError> {
        let (arg, usage) = match &self {
            Lookup::Events { search } => (search, "query-events <search>"),
            Lookup::Tickets { event_id } => (event_id, "query-tickets <event_id>"),
            Lookup::Autocomplete { search } => (search, "query-autocomplete <search>"),
        };
        if arg.trim().is_empty() {
            return Err(FilterError::usage(usage));
        }
        Ok(self)
    }
}

/// Where and how to reach the catalog API.
#[derive(Debug, Clone)]
pub struct Connection {
    pub token: String,
    pub base_url: String,
    /// `None` disables the request timeout.
    pub timeout: Option<Duration>,
}

/// Validated filter run settings.
#[derive(Debug, Clone)]
pub struct FilterSettings {
    pub search: String,
    pub category_type: String,
    pub per_page: u32,
    pub max_pages: u32,
    pub verbose: bool,
}

#[derive(Debug, Clone)]
pub enum Task {
    Filter(FilterSettings),
    Lookup(Lookup),
}

/// Validated command line.
#[derive(Debug, Clone)]
pub struct Settings {
    pub connection: Connection,
    pub task: Task,
}

impl Settings {
    pub fn from_cli(cli: Cli) -> Result<Self, FilterError> {
        let token = std::env::var("TOKEN").unwrap_or_default();
        Self::from_parts(cli, &token)
    }

    pub fn from_parts(cli: Cli, token: &str) -> Result<Self, FilterError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(FilterError::usage("TOKEN env var is required"));
        }

        let env = match cli.env.trim() {
            "" => DEFAULT_ENV,
            env => env,
        };
        let base_url = cli
            .base_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| default_base_url(env));
        let connection = Connection {
            token: token.to_string(),
            base_url,
            timeout: Some(Duration::from_secs(cli.timeout)).filter(|t| !t.is_zero()),
        };

        let task = match cli.lookup {
            Some(lookup) => Task::Lookup(lookup.validate()?),
            None => {
                let search = required(cli.search, "--search")?;
                let category_type = required(cli.category_type, "--category-type")?;
                let per_page = u32::try_from(cli.per_page)
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| FilterError::usage("--per-page must be > 0"))?;
                Task::Filter(FilterSettings {
                    search,
                    category_type,
                    per_page,
                    max_pages: cli.max_pages,
                    verbose: cli.verbose,
                })
            }
        };

        Ok(Self { connection, task })
    }
}

fn required(value: Option<String>, flag: &str) -> Result<String, FilterError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| FilterError::usage(format!("{flag} is required")))
}
