mod app;
mod cli;
mod data;
mod error;
mod state;
mod ui;

use std::io;

use anyhow::Result;
use clap::Parser;

use app::BikeshareApp;
use cli::Args;
use ui::console::Console;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_filter()))
        .init();
    log::debug!("reading city files from {}", args.data_dir.display());

    let console = Console::new(io::stdin().lock(), io::stdout().lock());
    BikeshareApp::new(args.data_dir, console).run()
}
