use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, RecordBatch, StringArray, UInt32Array, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::util::pretty::pretty_format_batches;

use super::console::{parse_yes_no, Console};
use crate::data::model::{columns, Named, OptionalColumns, Trip, TripTable};

pub const PAGE_SIZE: usize = 5;

const FIRST_PROMPT: &str = "Do you want to see the first 5 rows of data? (yes/no): ";
const NEXT_PROMPT: &str = "Do you want to see the next 5 rows of data? (yes/no): ";
pub const INVALID_ANSWER: &str = "Invalid input. Please enter 'yes' or 'no'.";
pub const NO_MORE_DATA: &str = "No more data to display.";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Cursor over a table in fixed-size pages
// ---------------------------------------------------------------------------

/// Position of the next page to reveal.
#[derive(Debug)]
pub struct Pager<'a> {
    table: &'a TripTable,
    cursor: usize,
}

impl<'a> Pager<'a> {
    pub fn new(table: &'a TripTable) -> Self {
        Pager { table, cursor: 0 }
    }

    /// Rows the next accepted `yes` would reveal; empty once exhausted.
    pub fn current(&self) -> &'a [Trip] {
        self.table.slice(self.cursor, PAGE_SIZE)
    }

    pub fn is_first(&self) -> bool {
        self.cursor == 0
    }

    pub fn advance(&mut self) {
        self.cursor += PAGE_SIZE;
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.table.len()
    }
}

/// Offer the table five rows at a time until the user declines or rows run out.
pub fn display_data<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    table: &TripTable,
) -> Result<()> {
    let mut pager = Pager::new(table);
    loop {
        let page = pager.current();
        if page.is_empty() {
            console.say(NO_MORE_DATA)?;
            break;
        }

        let prompt = if pager.is_first() {
            FIRST_PROMPT
        } else {
            NEXT_PROMPT
        };
        let Some(answer) = console.ask(prompt)? else {
            break;
        };
        match parse_yes_no(&answer) {
            Some(true) => {
                console.say(render_page(page, table.columns)?)?;
                pager.advance();
            }
            Some(false) => break,
            None => console.say(INVALID_ANSWER)?,
        }

        if pager.is_exhausted() {
            console.say(NO_MORE_DATA)?;
            break;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Rendering through Arrow's pretty printer
// ---------------------------------------------------------------------------

/// Render trips as a text table: source row, the file's columns, then the
/// derived `month`, `day_of_week` and `hour`.
pub fn render_page(trips: &[Trip], present: OptionalColumns) -> Result<String> {
    let batch = page_batch(trips, present)?;
    let table = pretty_format_batches(&[batch]).context("formatting rows")?;
    Ok(table.to_string())
}

fn page_batch(trips: &[Trip], present: OptionalColumns) -> Result<RecordBatch> {
    let text = |f: &dyn Fn(&Trip) -> Option<String>| -> ArrayRef {
        Arc::new(trips.iter().map(f).collect::<StringArray>())
    };

    let mut fields = vec![Field::new("", DataType::UInt64, false)];
    let mut arrays: Vec<ArrayRef> = vec![Arc::new(UInt64Array::from_iter_values(
        trips.iter().map(|t| t.row as u64),
    ))];

    let mut push = |name: &str, data_type: DataType, array: ArrayRef| {
        fields.push(Field::new(name, data_type, true));
        arrays.push(array);
    };

    push(
        columns::START_TIME,
        DataType::Utf8,
        text(&|t: &Trip| Some(t.start_time.format(TIMESTAMP_FORMAT).to_string())),
    );
    if present.end_time {
        push(
            columns::END_TIME,
            DataType::Utf8,
            text(&|t: &Trip| t.end_time.map(|e| e.format(TIMESTAMP_FORMAT).to_string())),
        );
    }
    push(
        columns::TRIP_DURATION,
        DataType::Float64,
        Arc::new(Float64Array::from_iter_values(trips.iter().map(|t| t.duration))),
    );
    push(
        columns::START_STATION,
        DataType::Utf8,
        text(&|t: &Trip| Some(t.start_station.clone())),
    );
    push(
        columns::END_STATION,
        DataType::Utf8,
        text(&|t: &Trip| Some(t.end_station.clone())),
    );
    if present.user_type {
        push(columns::USER_TYPE, DataType::Utf8, text(&|t: &Trip| t.user_type.clone()));
    }
    if present.gender {
        push(columns::GENDER, DataType::Utf8, text(&|t: &Trip| t.gender.clone()));
    }
    if present.birth_year {
        push(
            columns::BIRTH_YEAR,
            DataType::Float64,
            Arc::new(trips.iter().map(|t| t.birth_year).collect::<Float64Array>()),
        );
    }
    push(
        "month",
        DataType::UInt32,
        Arc::new(UInt32Array::from_iter_values(trips.iter().map(|t| t.month()))),
    );
    push(
        "day_of_week",
        DataType::Utf8,
        text(&|t: &Trip| Some(t.day().name().to_string())),
    );
    push(
        "hour",
        DataType::UInt32,
        Arc::new(UInt32Array::from_iter_values(trips.iter().map(|t| t.hour()))),
    );

    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).context("building page")
}
