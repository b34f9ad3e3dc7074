use std::collections::BTreeMap;

use super::model::{Day, Named, TripTable};

// ---------------------------------------------------------------------------
// Generic aggregations
// ---------------------------------------------------------------------------

/// Most frequent value. Ties go to the smallest value.
pub fn mode<T: Ord>(values: impl IntoIterator<Item = T>) -> Option<T> {
    let mut counts: BTreeMap<T, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    let mut best: Option<(T, usize)> = None;
    // Ascending iteration + strict comparison keeps the smallest of equal counts.
    for (value, count) in counts {
        if best.as_ref().map_or(true, |(_, c)| count > *c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

/// Frequency table sorted by descending count, then ascending value.
pub fn value_counts<T: Ord>(values: impl IntoIterator<Item = T>) -> Vec<(T, usize)> {
    let mut counts: BTreeMap<T, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    let mut table: Vec<(T, usize)> = counts.into_iter().collect();
    table.sort_by(|a, b| b.1.cmp(&a.1));
    table
}

// ---------------------------------------------------------------------------
// Time of travel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeStats {
    /// Calendar month number.
    pub month: u32,
    pub day: Day,
    pub hour: u32,
}

impl TimeStats {
    /// `None` for an empty table.
    pub fn compute(table: &TripTable) -> Option<Self> {
        Some(TimeStats {
            month: mode(table.trips.iter().map(|t| t.month()))?,
            // Weekday ties go to the alphabetically first name.
            day: mode(table.trips.iter().map(|t| t.day().name())).and_then(Day::parse)?,
            hour: mode(table.trips.iter().map(|t| t.hour()))?,
        })
    }
}

// ---------------------------------------------------------------------------
// Stations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationStats {
    pub start_station: String,
    pub end_station: String,
    /// Most frequent (start, end) pair.
    pub trip: (String, String),
}

impl StationStats {
    pub fn compute(table: &TripTable) -> Option<Self> {
        let trips = &table.trips;
        let start = mode(trips.iter().map(|t| t.start_station.as_str()))?;
        let end = mode(trips.iter().map(|t| t.end_station.as_str()))?;
        let (from, to) = mode(
            trips
                .iter()
                .map(|t| (t.start_station.as_str(), t.end_station.as_str())),
        )?;
        Some(StationStats {
            start_station: start.to_string(),
            end_station: end.to_string(),
            trip: (from.to_string(), to.to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// Durations
// ---------------------------------------------------------------------------

/// Whole seconds split into days / hours / minutes / seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationBreakdown {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl DurationBreakdown {
    /// Split `floor(total)` seconds; negative or non-finite totals count as zero.
    pub fn from_seconds(total: f64) -> Self {
        let whole = if total.is_finite() && total > 0.0 {
            total.floor() as u64
        } else {
            0
        };
        let (minutes, seconds) = (whole / 60, whole % 60);
        let (hours, minutes) = (minutes / 60, minutes % 60);
        let (days, hours) = (hours / 24, hours % 24);
        DurationBreakdown {
            days,
            hours,
            minutes,
            seconds,
        }
    }

    /// Inverse of [`DurationBreakdown::from_seconds`].
    #[cfg(test)]
    pub fn total_seconds(&self) -> u64 {
        self.days * 86_400 + self.hours * 3_600 + self.minutes * 60 + self.seconds
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationStats {
    /// Sum of trip durations, seconds.
    pub total: f64,
    /// Arithmetic mean, seconds.
    pub mean: f64,
}

impl DurationStats {
    pub fn compute(table: &TripTable) -> Option<Self> {
        if table.is_empty() {
            return None;
        }
        let total: f64 = table.trips.iter().map(|t| t.duration).sum();
        Some(DurationStats {
            total,
            mean: total / table.len() as f64,
        })
    }

    pub fn breakdown(&self) -> DurationBreakdown {
        DurationBreakdown::from_seconds(self.total)
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Birth year summary, truncated to whole years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BirthYears {
    /// The city file has no birth year column.
    NotAvailable,
    /// Column present but every selected cell is empty.
    NoData,
    Summary {
        earliest: i64,
        most_recent: i64,
        most_common: i64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserStats {
    pub user_types: Vec<(String, usize)>,
    /// `None` when the city file has no gender column.
    pub genders: Option<Vec<(String, usize)>>,
    pub birth_years: BirthYears,
}

impl UserStats {
    pub fn compute(table: &TripTable) -> Option<Self> {
        if table.is_empty() {
            return None;
        }
        let trips = &table.trips;

        let user_types = owned(value_counts(
            trips.iter().filter_map(|t| t.user_type.as_deref()),
        ));
        let genders = table
            .columns
            .gender
            .then(|| owned(value_counts(trips.iter().filter_map(|t| t.gender.as_deref()))));

        let birth_years = if !table.columns.birth_year {
            BirthYears::NotAvailable
        } else {
            let years: Vec<i64> = trips
                .iter()
                .filter_map(|t| t.birth_year)
                .map(|y| y.trunc() as i64)
                .collect();
            match (
                years.iter().min(),
                years.iter().max(),
                mode(years.iter().copied()),
            ) {
                (Some(&earliest), Some(&most_recent), Some(most_common)) => BirthYears::Summary {
                    earliest,
                    most_recent,
                    most_common,
                },
                _ => BirthYears::NoData,
            }
        };

        Some(UserStats {
            user_types,
            genders,
            birth_years,
        })
    }
}

fn owned(counts: Vec<(&str, usize)>) -> Vec<(String, usize)> {
    counts
        .into_iter()
        .map(|(value, n)| (value.to_string(), n))
        .collect()
}
