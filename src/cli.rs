//! Command-line argument definitions.

use std::path::PathBuf;

use clap::Parser;

/// Explore US bikeshare trip data interactively.
#[derive(Parser, Debug)]
#[command(name = "bikeshare")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory containing chicago, new_york_city and washington data files
    #[arg(short = 'd', long = "data-dir", value_name = "DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Enable verbose logging (repeat for more)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Log filter implied by `-v` flags; `RUST_LOG` still wins.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
