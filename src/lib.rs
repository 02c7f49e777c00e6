pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod output;
pub mod paginate;

use std::io::{self, BufWriter, Write};

use anyhow::Context;

use catalog::{CatalogClient, PageSource};
use config::{Cli, FilterSettings, Lookup, Settings, Task};
use error::FilterError;
use filter::CategoryFilter;
use output::{write_pretty, write_summary, ArrayWriter, RunSummary};
use paginate::Paginator;

/// One extraction run: page through a source, keep matching records, stream
/// them out as a JSON array and report the counters.
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub paginator: Paginator,
    pub filter: CategoryFilter,
    pub search: String,
    pub verbose: bool,
}

impl Pipeline {
    pub fn from_settings(settings: &FilterSettings) -> Self {
        Self {
            paginator: Paginator::new(settings.per_page, settings.max_pages),
            filter: CategoryFilter::new(&settings.category_type),
            search: settings.search.clone(),
            verbose: settings.verbose,
        }
    }

    /// Records go to `out`; progress and the summary go to `diag`.
    ///
    /// The opening bracket is written once the first page has arrived, so a
    /// failure on page 1 leaves `out` untouched. Later failures leave an
    /// unterminated array behind.
    pub fn extract<S, W, D>(
        &self,
        source: &mut S,
        out: W,
        diag: &mut D,
    ) -> Result<RunSummary, FilterError>
    where
        S: PageSource + ?Sized,
        W: Write,
        D: Write,
    {
        let mut writer = ArrayWriter::new(out);
        let mut matched = 0u64;

        let progress = self.paginator.run(source, |progress, response| {
            if !writer.is_open() {
                writer.open()?;
            }
            for record in response.records.iter().filter(|r| self.filter.matches(r)) {
                writer.write_record(record)?;
                matched += 1;
            }
            writer.flush()?;

            if self.verbose {
                writeln!(
                    diag,
                    "page {} (echoed page {}, perPage {}): {} records, seen {}, matched {}",
                    progress.page,
                    response.page,
                    response.per_page,
                    response.records.len(),
                    progress.seen,
                    matched
                )?;
            }
            Ok(())
        })?;

        if !writer.is_open() {
            writer.open()?;
        }
        writer.close()?;

        let summary = RunSummary {
            total: progress.total,
            seen: progress.seen,
            matched,
            category_type: self.filter.wanted().to_string(),
            search: self.search.clone(),
        };
        write_summary(diag, &summary)?;
        Ok(summary)
    }
}

/// Validates the command line, then runs against the live endpoint with
/// stdout as the data stream and stderr as the diagnostic stream.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let Settings { connection, task } = Settings::from_cli(cli)?;
    let client = CatalogClient::new(
        &connection.base_url,
        &connection.token,
        connection.timeout,
    )?;
    let stdout = io::stdout();

    match task {
        Task::Filter(settings) => {
            let pipeline = Pipeline::from_settings(&settings);
            let out = BufWriter::new(stdout.lock());
            let mut diag = io::stderr().lock();
            pipeline
                .extract(&mut client.search(&settings.search), out, &mut diag)
                .with_context(|| format!("fetching {} failed", connection.base_url))?;
        }
        Task::Lookup(lookup) => {
            let value = match &lookup {
                Lookup::Events { search } => client.events(search),
                Lookup::Tickets { event_id } => client.tickets(event_id),
                Lookup::Autocomplete { search } => client.autocomplete(search),
            }
            .with_context(|| format!("fetching {} failed", connection.base_url))?;
            write_pretty(stdout.lock(), &value)?;
        }
    }
    Ok(())
}
