use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

use crate::data::loader::load_data;
use crate::state::Stage;
use crate::ui::console::Console;
use crate::ui::pager::display_data;
use crate::ui::prompt::get_filters;
use crate::ui::report::{station_stats, time_stats, trip_duration_stats, user_stats, NO_DATA};

const RESTART_PROMPT: &str = "\nWould you like to restart? (yes/no): ";

// ---------------------------------------------------------------------------
// Interactive session
// ---------------------------------------------------------------------------

pub struct BikeshareApp<R, W> {
    /// Directory holding the per-city data files.
    data_dir: PathBuf,
    console: Console<R, W>,
}

impl<R: BufRead, W: Write> BikeshareApp<R, W> {
    pub fn new(data_dir: PathBuf, console: Console<R, W>) -> Self {
        Self { data_dir, console }
    }

    /// Drive passes until the user declines to restart or input ends.
    pub fn run(&mut self) -> Result<()> {
        let mut stage = Stage::Collecting;
        while !stage.is_done() {
            log::trace!("entering stage {}", stage.name());
            stage = self.step(stage)?;
        }
        Ok(())
    }

    fn step(&mut self, stage: Stage) -> Result<Stage> {
        let next = match stage {
            Stage::Collecting => match get_filters(&mut self.console)? {
                Some(selection) => Stage::Loading(selection),
                None => Stage::Done,
            },
            Stage::Loading(selection) => {
                let table = load_data(&self.data_dir, &selection)?;
                if table.is_empty() {
                    self.console.say(NO_DATA)?;
                }
                Stage::after_load(table)
            }
            Stage::Reporting(table) => {
                let out = self.console.out();
                time_stats(&table, out)?;
                station_stats(&table, out)?;
                trip_duration_stats(&table, out)?;
                user_stats(&table, out)?;
                Stage::Paging(table)
            }
            Stage::Paging(table) => {
                display_data(&mut self.console, &table)?;
                Stage::AskRestart
            }
            Stage::AskRestart => {
                let answer = self.console.ask(RESTART_PROMPT)?;
                Stage::after_restart(answer.as_deref())
            }
            Stage::Done => Stage::Done,
        };
        Ok(next)
    }

    #[cfg(test)]
    pub fn into_console(self) -> Console<R, W> {
        self.console
    }
}
