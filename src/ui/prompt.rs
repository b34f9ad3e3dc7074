use std::io::{self, BufRead, Write};

use super::console::Console;
use super::RULE;
use crate::data::model::{Choice, City, Day, FilterSelection, Month, Named};

pub const GREETING: &str = "Hello! Let's explore some US bikeshare data!";

const CITY_PROMPT: &str = "Enter city (Chicago, New York City, Washington): ";
const MONTH_PROMPT: &str = "Enter month (all, january, february, ..., june): ";
const DAY_PROMPT: &str = "Enter day of week (all, monday, tuesday, ..., sunday): ";

pub const INVALID_CITY: &str = "Invalid city. Please try again.";
pub const INVALID_MONTH: &str = "Invalid month. Please try again.";
pub const INVALID_DAY: &str = "Invalid day. Please try again.";

/// Ask for city, month and day in turn, re-prompting on anything outside
/// the accepted names.  `None` when input ends first.
pub fn get_filters<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
) -> io::Result<Option<FilterSelection>> {
    console.say(GREETING)?;

    let Some(city) = console.ask_until(CITY_PROMPT, INVALID_CITY, City::parse)? else {
        return Ok(None);
    };
    let Some(month) = console.ask_until(MONTH_PROMPT, INVALID_MONTH, Choice::<Month>::parse)?
    else {
        return Ok(None);
    };
    let Some(day) = console.ask_until(DAY_PROMPT, INVALID_DAY, Choice::<Day>::parse)? else {
        return Ok(None);
    };

    console.say(RULE)?;
    let selection = FilterSelection { city, month, day };
    log::debug!("selected {selection:?}");
    Ok(Some(selection))
}
