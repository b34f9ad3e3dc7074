use super::model::{Choice, Day, Month, Named, Trip, TripTable};

// ---------------------------------------------------------------------------
// Month / day predicates
// ---------------------------------------------------------------------------

/// Whether a trip started in the chosen month and on the chosen weekday.
///
/// A month is matched on its calendar number, so trips from months outside
/// January–June only pass when the month choice is `All`.
pub fn trip_matches(trip: &Trip, month: Choice<Month>, day: Choice<Day>) -> bool {
    let month_ok = match month {
        Choice::All => true,
        Choice::Only(m) => trip.month() == m.number(),
    };
    month_ok && day.admits(trip.day())
}

/// Return the trips passing both filters, in their original order.
pub fn apply_filters(table: TripTable, month: Choice<Month>, day: Choice<Day>) -> TripTable {
    let before = table.len();
    let columns = table.columns;
    let trips: Vec<Trip> = table
        .trips
        .into_iter()
        .filter(|trip| trip_matches(trip, month, day))
        .collect();

    log::debug!(
        "filter month={} day={} kept {} of {before} trips",
        describe(month),
        describe(day),
        trips.len()
    );
    TripTable::new(trips, columns)
}

fn describe<T: Named>(choice: Choice<T>) -> &'static str {
    match choice {
        Choice::All => "all",
        Choice::Only(v) => v.name(),
    }
}
