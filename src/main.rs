use std::process::ExitCode;

use clap::Parser;
use event_filter_lib::config::{Cli, USAGE_EXAMPLE};
use event_filter_lib::error::FilterError;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match event_filter_lib::run(cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            let kind = err.downcast_ref::<FilterError>();
            if let Some(FilterError::Usage(_)) = kind {
                eprintln!("{USAGE_EXAMPLE}\n");
            }
            eprintln!("ERROR: {err:#}");
            ExitCode::from(kind.map_or(1, FilterError::exit_code))
        }
    }
}
