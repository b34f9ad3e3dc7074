use std::io::{self, Write};
use std::time::Instant;

use super::RULE;
use crate::data::model::{month_title, TripTable};
use crate::data::stats::{BirthYears, DurationStats, StationStats, TimeStats, UserStats};

pub const NO_DATA: &str = "No data available for the selected filters.";

// ---------------------------------------------------------------------------
// Shared reporter frame: heading, empty-table guard, timing, closing rule
// ---------------------------------------------------------------------------

fn report<S, W: Write>(
    out: &mut W,
    heading: &str,
    table: &TripTable,
    compute: impl FnOnce(&TripTable) -> Option<S>,
    print: impl FnOnce(&S, &mut W) -> io::Result<()>,
) -> io::Result<()> {
    writeln!(out, "\n{heading}\n")?;
    let started = Instant::now();

    let Some(stats) = compute(table).filter(|_| !table.is_empty()) else {
        writeln!(out, "{NO_DATA}")?;
        return Ok(());
    };
    print(&stats, out)?;

    log::debug!("{heading} took {:?}", started.elapsed());
    writeln!(out, "{RULE}")
}

// ---------------------------------------------------------------------------
// The four reporters
// ---------------------------------------------------------------------------

/// Most frequent month, weekday and hour of travel.
pub fn time_stats<W: Write>(table: &TripTable, out: &mut W) -> io::Result<()> {
    report(
        out,
        "Calculating The Most Frequent Times of Travel...",
        table,
        TimeStats::compute,
        |stats, out| {
            writeln!(out, "Most common month: {}", month_title(stats.month))?;
            writeln!(out, "Most common day of week: {}", stats.day.title())?;
            writeln!(out, "Most common hour: {}:00", stats.hour)
        },
    )
}

/// Most popular start station, end station and trip.
pub fn station_stats<W: Write>(table: &TripTable, out: &mut W) -> io::Result<()> {
    report(
        out,
        "Calculating The Most Popular Stations and Trip...",
        table,
        StationStats::compute,
        |stats, out| {
            writeln!(out, "Most common start station: {}", stats.start_station)?;
            writeln!(out, "Most common end station: {}", stats.end_station)?;
            writeln!(out, "Most common trip: {} to {}", stats.trip.0, stats.trip.1)
        },
    )
}

/// Total and mean trip duration.
pub fn trip_duration_stats<W: Write>(table: &TripTable, out: &mut W) -> io::Result<()> {
    report(
        out,
        "Calculating Trip Duration...",
        table,
        DurationStats::compute,
        |stats, out| {
            let b = stats.breakdown();
            writeln!(
                out,
                "Total travel time: {} days, {} hours, {} minutes, {} seconds",
                b.days, b.hours, b.minutes, b.seconds
            )?;
            writeln!(out, "Average travel time: {:.2} seconds", stats.mean)
        },
    )
}

/// User type, gender and birth year breakdowns.
pub fn user_stats<W: Write>(table: &TripTable, out: &mut W) -> io::Result<()> {
    report(
        out,
        "Calculating User Stats...",
        table,
        UserStats::compute,
        |stats, out| {
            writeln!(out, "User Type Counts:")?;
            write_counts(out, "User Type", &stats.user_types)?;

            match &stats.genders {
                Some(genders) => {
                    writeln!(out, "\nGender Counts:")?;
                    write_counts(out, "Gender", genders)?;
                }
                None => writeln!(out, "\nGender information not available for this city.")?,
            }

            match stats.birth_years {
                BirthYears::Summary {
                    earliest,
                    most_recent,
                    most_common,
                } => {
                    writeln!(out, "\nBirth Year Statistics:")?;
                    writeln!(out, "Earliest: {earliest}")?;
                    writeln!(out, "Most Recent: {most_recent}")?;
                    writeln!(out, "Most Common: {most_common}")
                }
                BirthYears::NoData => {
                    writeln!(out, "\nNo birth year data for the selected filters.")
                }
                BirthYears::NotAvailable => {
                    writeln!(out, "\nBirth year information not available for this city.")
                }
            }
        },
    )
}

/// Column name, then one `value    count` line per entry with values
/// left-aligned and counts right-aligned.
fn write_counts<W: Write>(out: &mut W, name: &str, counts: &[(String, usize)]) -> io::Result<()> {
    writeln!(out, "{name}")?;
    let value_width = counts
        .iter()
        .map(|(v, _)| v.chars().count())
        .max()
        .unwrap_or(0);
    let count_width = counts
        .iter()
        .map(|(_, n)| n.to_string().len())
        .max()
        .unwrap_or(0);
    for (value, n) in counts {
        writeln!(out, "{value:<value_width$}    {n:>count_width$}")?;
    }
    Ok(())
}
