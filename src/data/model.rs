use std::fmt;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};

// ---------------------------------------------------------------------------
// Column names shared by every file format
// ---------------------------------------------------------------------------

pub mod columns {
    pub const START_TIME: &str = "Start Time";
    pub const END_TIME: &str = "End Time";
    pub const TRIP_DURATION: &str = "Trip Duration";
    pub const START_STATION: &str = "Start Station";
    pub const END_STATION: &str = "End Station";
    pub const USER_TYPE: &str = "User Type";
    pub const GENDER: &str = "Gender";
    pub const BIRTH_YEAR: &str = "Birth Year";
}

// ---------------------------------------------------------------------------
// Fixed lookup tables: cities, months, days
// ---------------------------------------------------------------------------

/// A closed set of values the user picks by typing its lowercase name.
pub trait Named: Copy + PartialEq + 'static {
    /// Every accepted value, in display order.
    const ALL: &'static [Self];

    /// Lowercase name the user types.
    fn name(self) -> &'static str;

    /// Case-insensitive lookup; surrounding whitespace is ignored.
    fn parse(input: &str) -> Option<Self> {
        let wanted = input.trim().to_lowercase();
        Self::ALL.iter().copied().find(|v| v.name() == wanted)
    }
}

/// Cities with a bikeshare data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum City {
    Chicago,
    NewYorkCity,
    Washington,
}

impl City {
    /// File name without extension, looked up in the data directory.
    pub fn file_stem(self) -> &'static str {
        match self {
            City::Chicago => "chicago",
            City::NewYorkCity => "new_york_city",
            City::Washington => "washington",
        }
    }
}

impl Named for City {
    const ALL: &'static [Self] = &[City::Chicago, City::NewYorkCity, City::Washington];

    fn name(self) -> &'static str {
        match self {
            City::Chicago => "chicago",
            City::NewYorkCity => "new york city",
            City::Washington => "washington",
        }
    }
}

/// Months covered by the data set (January to June).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Month {
    January = 1,
    February,
    March,
    April,
    May,
    June,
}

impl Month {
    /// 1-based calendar number.
    pub fn number(self) -> u32 {
        self as u32
    }
}

impl Named for Month {
    const ALL: &'static [Self] = &[
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
    ];

    fn name(self) -> &'static str {
        match self {
            Month::January => "january",
            Month::February => "february",
            Month::March => "march",
            Month::April => "april",
            Month::May => "may",
            Month::June => "june",
        }
    }
}

/// Display name of a calendar month number, e.g. `3` → `March`.
pub fn month_title(number: u32) -> String {
    u8::try_from(number)
        .ok()
        .and_then(|n| chrono::Month::try_from(n).ok())
        .map(|m| m.name().to_string())
        .unwrap_or_else(|| format!("Month {number}"))
}

/// Day of week. Ordered Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// Capitalised form used in reports.
    pub fn title(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }
}

impl Named for Day {
    const ALL: &'static [Self] = &[
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    fn name(self) -> &'static str {
        match self {
            Day::Monday => "monday",
            Day::Tuesday => "tuesday",
            Day::Wednesday => "wednesday",
            Day::Thursday => "thursday",
            Day::Friday => "friday",
            Day::Saturday => "saturday",
            Day::Sunday => "sunday",
        }
    }
}

impl From<Weekday> for Day {
    fn from(w: Weekday) -> Self {
        match w {
            Weekday::Mon => Day::Monday,
            Weekday::Tue => Day::Tuesday,
            Weekday::Wed => Day::Wednesday,
            Weekday::Thu => Day::Thursday,
            Weekday::Fri => Day::Friday,
            Weekday::Sat => Day::Saturday,
            Weekday::Sun => Day::Sunday,
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Filter selection
// ---------------------------------------------------------------------------

/// Either every value or exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice<T> {
    All,
    Only(T),
}

impl<T: Named> Choice<T> {
    /// Accepts `all` or any name of `T`.
    pub fn parse(input: &str) -> Option<Self> {
        if input.trim().eq_ignore_ascii_case("all") {
            return Some(Choice::All);
        }
        T::parse(input).map(Choice::Only)
    }

    /// Whether `value` passes this choice.
    pub fn admits(&self, value: T) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(wanted) => *wanted == value,
        }
    }
}

/// What the user asked to analyse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSelection {
    pub city: City,
    pub month: Choice<Month>,
    pub day: Choice<Day>,
}

// ---------------------------------------------------------------------------
// Trip – one row of a city file
// ---------------------------------------------------------------------------

/// A single bikeshare ride.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    /// 0-based position in the source file.
    pub row: usize,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    /// Seconds.
    pub duration: f64,
    pub start_station: String,
    pub end_station: String,
    pub user_type: Option<String>,
    pub gender: Option<String>,
    pub birth_year: Option<f64>,
}

impl Trip {
    /// Calendar month (1–12) the ride started in.
    pub fn month(&self) -> u32 {
        self.start_time.month()
    }

    pub fn day(&self) -> Day {
        self.start_time.weekday().into()
    }

    pub fn hour(&self) -> u32 {
        self.start_time.hour()
    }
}

// ---------------------------------------------------------------------------
// TripTable – a loaded (and possibly filtered) city file
// ---------------------------------------------------------------------------

/// Which optional columns the source file carried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionalColumns {
    pub end_time: bool,
    pub user_type: bool,
    pub gender: bool,
    pub birth_year: bool,
}

/// Rows of one city file in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripTable {
    pub trips: Vec<Trip>,
    pub columns: OptionalColumns,
}

impl TripTable {
    pub fn new(trips: Vec<Trip>, columns: OptionalColumns) -> Self {
        TripTable { trips, columns }
    }

    /// Number of trips.
    pub fn len(&self) -> usize {
        self.trips.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    /// Up to `size` rows starting at `start`; empty past the end.
    pub fn slice(&self, start: usize, size: usize) -> &[Trip] {
        let start = start.min(self.trips.len());
        let end = start.saturating_add(size).min(self.trips.len());
        &self.trips[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!(City::parse("New York City"), Some(City::NewYorkCity));
        assert_eq!(City::parse("  CHICAGO \n"), Some(City::Chicago));
        assert_eq!(City::parse("chcago"), None);
        assert_eq!(Month::parse("June"), Some(Month::June));
        assert_eq!(Month::parse("july"), None);
        assert_eq!(Day::parse("sunday"), Some(Day::Sunday));
    }

    #[test]
    fn choice_accepts_all() {
        assert_eq!(Choice::<Month>::parse("ALL"), Some(Choice::All));
        assert_eq!(Choice::<Day>::parse("friday"), Some(Choice::Only(Day::Friday)));
        assert_eq!(Choice::<Day>::parse("someday"), None);
        assert!(Choice::All.admits(Month::May));
        assert!(!Choice::Only(Month::April).admits(Month::May));
    }

    #[test]
    fn month_numbers_are_one_based() {
        let numbers: Vec<u32> = Month::ALL.iter().map(|m| m.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(month_title(2), "February");
        assert_eq!(month_title(13), "Month 13");
    }

    #[test]
    fn derives_time_fields_from_start() {
        let start = NaiveDateTime::parse_from_str("2017-06-23 15:09:32", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        let trip = Trip {
            row: 0,
            start_time: start,
            end_time: None,
            duration: 321.0,
            start_station: "A".into(),
            end_station: "B".into(),
            user_type: None,
            gender: None,
            birth_year: None,
        };
        assert_eq!(trip.month(), 6);
        assert_eq!(trip.day(), Day::Friday);
        assert_eq!(trip.hour(), 15);
    }

    #[test]
    fn slice_clamps_to_table() {
        let table = TripTable::default();
        assert!(table.slice(0, 5).is_empty());
        assert!(table.slice(10, 5).is_empty());
    }
}
