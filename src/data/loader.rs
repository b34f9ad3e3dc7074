use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use chrono::NaiveDateTime;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::filter::apply_filters;
use super::model::{columns, City, FilterSelection, OptionalColumns, Trip, TripTable};
use crate::error::DataError;

/// Extensions tried, in order, when looking for a city's file.
pub const SEARCH_ORDER: [&str; 3] = ["csv", "parquet", "json"];

const REQUIRED: [&str; 4] = [
    columns::START_TIME,
    columns::TRIP_DURATION,
    columns::START_STATION,
    columns::END_STATION,
];

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Locate the data file for `city` inside `dir`.
pub fn find_city_file(dir: &Path, city: City) -> Result<PathBuf, DataError> {
    SEARCH_ORDER
        .iter()
        .map(|ext| dir.join(format!("{}.{ext}", city.file_stem())))
        .find(|path| path.is_file())
        .ok_or_else(|| DataError::NoDataFile {
            city: city.file_stem().to_string(),
            dir: dir.to_path_buf(),
        })
}

/// Load the selected city's trips and keep those matching the month/day filters.
pub fn load_data(dir: &Path, selection: &FilterSelection) -> Result<TripTable> {
    let path = find_city_file(dir, selection.city)?;
    let table = load_file(&path).with_context(|| format!("loading {}", path.display()))?;
    log::info!(
        "Loaded {} trips from {} (columns {:?})",
        table.len(),
        path.display(),
        table.columns
    );
    Ok(apply_filters(table, selection.month, selection.day))
}

/// Load a trip file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one trip per line (the format the cities ship in)
/// * `.parquet` – same column names, any type Arrow can cast to text
/// * `.json`    – `[{ "Start Time": "...", "Trip Duration": 300, ... }, ...]`
pub fn load_file(path: &Path) -> Result<TripTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        other => Err(DataError::UnsupportedFormat(other.to_string()).into()),
    }
}

// ---------------------------------------------------------------------------
// Row conversion shared by all formats
// ---------------------------------------------------------------------------

/// One row with every cell still as text.
#[derive(Debug, Deserialize)]
struct RawTrip {
    #[serde(rename = "Start Time")]
    start_time: String,
    #[serde(rename = "End Time", default)]
    end_time: Option<String>,
    #[serde(rename = "Trip Duration")]
    trip_duration: String,
    #[serde(rename = "Start Station")]
    start_station: String,
    #[serde(rename = "End Station")]
    end_station: String,
    #[serde(rename = "User Type", default)]
    user_type: Option<String>,
    #[serde(rename = "Gender", default)]
    gender: Option<String>,
    #[serde(rename = "Birth Year", default)]
    birth_year: Option<String>,
}

impl RawTrip {
    /// Build a row from a cell lookup; absent required cells become empty text.
    fn from_cells(mut cell: impl FnMut(&'static str) -> Option<String>) -> Self {
        RawTrip {
            start_time: cell(columns::START_TIME).unwrap_or_default(),
            end_time: cell(columns::END_TIME),
            trip_duration: cell(columns::TRIP_DURATION).unwrap_or_default(),
            start_station: cell(columns::START_STATION).unwrap_or_default(),
            end_station: cell(columns::END_STATION).unwrap_or_default(),
            user_type: cell(columns::USER_TYPE),
            gender: cell(columns::GENDER),
            birth_year: cell(columns::BIRTH_YEAR),
        }
    }

    fn into_trip(self, row: usize) -> Result<Trip, DataError> {
        let end_time = non_empty(self.end_time)
            .map(|s| parse_timestamp(&s, row))
            .transpose()?;
        let birth_year = non_empty(self.birth_year)
            .map(|s| parse_number(&s, row, columns::BIRTH_YEAR))
            .transpose()?
            .filter(|year| !year.is_nan());

        Ok(Trip {
            row,
            start_time: parse_timestamp(&self.start_time, row)?,
            end_time,
            duration: parse_number(&self.trip_duration, row, columns::TRIP_DURATION)?,
            start_station: self.start_station,
            end_station: self.end_station,
            user_type: non_empty(self.user_type),
            gender: non_empty(self.gender),
            birth_year,
        })
    }
}

fn non_empty(cell: Option<String>) -> Option<String> {
    cell.filter(|s| !s.trim().is_empty())
}

/// Parse a start/end timestamp in any of the accepted layouts.
pub fn parse_timestamp(value: &str, row: usize) -> Result<NaiveDateTime, DataError> {
    let trimmed = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| DataError::BadTimestamp {
            row,
            value: value.to_string(),
        })
}

fn parse_number(value: &str, row: usize, column: &'static str) -> Result<f64, DataError> {
    value.trim().parse::<f64>().map_err(|_| DataError::BadNumber {
        row,
        column,
        value: value.to_string(),
    })
}

/// Check required columns and report which optional ones are present.
fn inspect_columns<'a>(
    names: impl IntoIterator<Item = &'a str>,
) -> Result<OptionalColumns, DataError> {
    let names: BTreeSet<&str> = names.into_iter().map(str::trim).collect();
    if let Some(missing) = REQUIRED.iter().find(|c| !names.contains(*c)) {
        return Err(DataError::MissingColumn(*missing));
    }
    Ok(OptionalColumns {
        end_time: names.contains(columns::END_TIME),
        user_type: names.contains(columns::USER_TYPE),
        gender: names.contains(columns::GENDER),
        birth_year: names.contains(columns::BIRTH_YEAR),
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, extra columns (such as the
/// unnamed leading index) are ignored.  Empty cells are missing values.
fn load_csv(path: &Path) -> Result<TripTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .context("opening CSV")?;
    let columns = inspect_columns(reader.headers().context("reading CSV headers")?.iter())?;

    let mut trips = Vec::new();
    for (row, result) in reader.deserialize::<RawTrip>().enumerate() {
        let raw = result.with_context(|| format!("CSV data row {row}"))?;
        trips.push(raw.into_trip(row)?);
    }

    Ok(TripTable::new(trips, columns))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "Start Time": "2017-01-01 09:07:57", "Trip Duration": 1039,
///     "Start Station": "Wood St & Hubbard St", "End Station": "Damen Ave & Chicago Ave",
///     "User Type": "Subscriber", "Gender": "Male", "Birth Year": 1992 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<TripTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;
    let objects = records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            rec.as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))
        })
        .collect::<Result<Vec<_>>>()?;

    let keys: BTreeSet<&str> = objects
        .iter()
        .flat_map(|obj| obj.keys().map(String::as_str))
        .collect();
    let columns = inspect_columns(keys)?;

    let mut trips = Vec::with_capacity(objects.len());
    for (row, obj) in objects.into_iter().enumerate() {
        let raw = RawTrip::from_cells(|name| obj.get(name).and_then(json_to_text));
        trips.push(raw.into_trip(row)?);
    }

    Ok(TripTable::new(trips, columns))
}

fn json_to_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of trips.
///
/// Every column is cast to UTF-8 before conversion, so text, integer, float
/// and timestamp columns written by Pandas or Polars are all accepted.
fn load_parquet(path: &Path) -> Result<TripTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let schema = builder.schema().clone();
    let columns = inspect_columns(schema.fields().iter().map(|f| f.name().as_str()))?;
    let reader = builder.build().context("building parquet reader")?;

    let mut trips = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let batch_schema = batch.schema();

        // Text view of each known column present in this batch.
        let mut text_columns: Vec<(&'static str, ArrayRef)> = Vec::new();
        for name in ALL_COLUMNS {
            let found = batch_schema
                .fields()
                .iter()
                .position(|f| f.name().trim() == name);
            if let Some(idx) = found {
                let as_text = cast(batch.column(idx), &DataType::Utf8)
                    .with_context(|| format!("casting parquet column '{name}' to text"))?;
                text_columns.push((name, as_text));
            }
        }

        for i in 0..batch.num_rows() {
            let raw = RawTrip::from_cells(|name| {
                text_columns
                    .iter()
                    .find(|(col, _)| *col == name)
                    .and_then(|(_, array)| text_at(array, i))
            });
            trips.push(raw.into_trip(trips.len())?);
        }
    }

    Ok(TripTable::new(trips, columns))
}

const ALL_COLUMNS: [&str; 8] = [
    columns::START_TIME,
    columns::END_TIME,
    columns::TRIP_DURATION,
    columns::START_STATION,
    columns::END_STATION,
    columns::USER_TYPE,
    columns::GENDER,
    columns::BIRTH_YEAR,
];

fn text_at(array: &ArrayRef, row: usize) -> Option<String> {
    if array.is_null(row) {
        return None;
    }
    Some(array.as_string::<i32>().value(row).to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, RecordBatch, StringArray};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::model::{Choice, Day, Month};

    const CHICAGO: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year
1423854,2017-06-23 15:09:32,2017-06-23 15:14:53,321,Wood St & Hubbard St,Damen Ave & Chicago Ave,Subscriber,Male,1992.0
955915,2017-05-25 18:19:03,2017-05-25 18:45:53,1610,Theater on the Lake,Sheffield Ave & Waveland Ave,Subscriber,Female,1992.0
9031,2017-01-04 08:27:49,2017-01-04 08:34:45,416,May St & Taylor St,Wood St & Taylor St,Subscriber,Male,1981.0
304487,2017-03-06 13:49:38,2017-03-06 13:55:28,350,Christiana Ave & Lawrence Ave,St. Louis Ave & Balmoral Ave,Customer,,
";

    const WASHINGTON: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type
1621326,2017-06-21 08:36:34,2017-06-21 08:44:43,489.066,14th & Belmont St NW,15th & K St NW,Subscriber
482740,2017-03-11 10:40:00,2017-03-11 10:46:00,402.549,Yuma St & Tenley Circle NW,Connecticut Ave & Yuma St NW,Subscriber
";

    #[test]
    fn loads_chicago_csv_with_optional_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chicago.csv");
        std::fs::write(&path, CHICAGO).unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 4);
        assert!(table.columns.gender && table.columns.birth_year);

        let first = &table.trips[0];
        assert_eq!(first.row, 0);
        assert_eq!(first.duration, 321.0);
        assert_eq!(first.start_station, "Wood St & Hubbard St");
        assert_eq!(first.gender.as_deref(), Some("Male"));
        assert_eq!(first.birth_year, Some(1992.0));
        assert_eq!((first.month(), first.day(), first.hour()), (6, Day::Friday, 15));

        let last = &table.trips[3];
        assert_eq!(last.gender, None);
        assert_eq!(last.birth_year, None);
    }

    #[test]
    fn washington_has_no_demographics() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("washington.csv");
        std::fs::write(&path, WASHINGTON).unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.columns.user_type);
        assert!(!table.columns.gender);
        assert!(!table.columns.birth_year);
        assert_eq!(table.trips[0].duration, 489.066);
    }

    #[test]
    fn load_data_applies_filters() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("chicago.csv"), CHICAGO).unwrap();

        let selection = FilterSelection {
            city: City::Chicago,
            month: Choice::Only(Month::May),
            day: Choice::All,
        };
        let table = load_data(dir.path(), &selection).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.trips[0].start_station, "Theater on the Lake");
        assert!(table.columns.gender);
    }

    #[test]
    fn missing_city_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_city_file(dir.path(), City::NewYorkCity).unwrap_err();
        assert!(matches!(err, DataError::NoDataFile { .. }));
    }

    #[test]
    fn csv_is_preferred_over_other_formats() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("washington.json"), "[]").unwrap();
        std::fs::write(dir.path().join("washington.csv"), WASHINGTON).unwrap();
        let path = find_city_file(dir.path(), City::Washington).unwrap();
        assert_eq!(path.extension().unwrap(), "csv");
    }

    #[test]
    fn missing_required_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chicago.csv");
        std::fs::write(&path, "Start Time,Start Station,End Station\n2017-01-01 00:00:00,A,B\n")
            .unwrap();

        let err = load_file(&path).unwrap_err();
        let data_err = err.downcast_ref::<DataError>().unwrap();
        assert!(matches!(data_err, DataError::MissingColumn(c) if *c == columns::TRIP_DURATION));
    }

    #[test]
    fn bad_timestamp_names_the_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chicago.csv");
        std::fs::write(
            &path,
            "Start Time,Trip Duration,Start Station,End Station\n\
             2017-01-01 00:00:00,10,A,B\n\
             yesterday,10,A,B\n",
        )
        .unwrap();

        let err = load_file(&path).unwrap_err();
        let data_err = err.downcast_ref::<DataError>().unwrap();
        assert!(matches!(data_err, DataError::BadTimestamp { row: 1, .. }));
        assert!(err.to_string().starts_with("data row 1:"));
    }

    #[test]
    fn unsupported_extension() {
        let err = load_file(Path::new("trips.xlsx")).unwrap_err();
        assert!(err.to_string().contains("xlsx"));
    }

    #[test]
    fn accepts_iso_and_fractional_timestamps() {
        let t = parse_timestamp("2017-02-03T04:05:06", 0).unwrap();
        assert_eq!(t.to_string(), "2017-02-03 04:05:06");
        let t = parse_timestamp("2017-02-03 04:05:06.250", 0).unwrap();
        assert_eq!(t.and_utc().timestamp_subsec_millis(), 250);
    }

    #[test]
    fn loads_records_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new_york_city.json");
        std::fs::write(
            &path,
            r#"[
                {"Start Time": "2017-06-11 14:55:05", "Trip Duration": 795,
                 "Start Station": "Suffolk St & Stanton St", "End Station": "W Broadway & Spring St",
                 "User Type": "Subscriber", "Gender": "Male", "Birth Year": 1998.0},
                {"Start Time": "2017-05-11 15:30:11", "Trip Duration": 692.5,
                 "Start Station": "Lexington Ave & E 63 St", "End Station": "1 Ave & E 78 St",
                 "User Type": null, "Gender": null, "Birth Year": null}
            ]"#,
        )
        .unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.columns.gender && table.columns.birth_year && !table.columns.end_time);
        assert_eq!(table.trips[0].birth_year, Some(1998.0));
        assert_eq!(table.trips[1].duration, 692.5);
        assert_eq!(table.trips[1].user_type, None);
    }

    #[test]
    fn loads_parquet_with_numeric_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chicago.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("Start Time", DataType::Utf8, false),
            Field::new("Trip Duration", DataType::Float64, false),
            Field::new("Start Station", DataType::Utf8, false),
            Field::new("End Station", DataType::Utf8, false),
            Field::new("Birth Year", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["2017-01-02 07:00:00", "2017-01-03 08:30:00"])),
                Arc::new(Float64Array::from(vec![120.5, 60.0])),
                Arc::new(StringArray::from(vec!["A", "B"])),
                Arc::new(StringArray::from(vec!["B", "A"])),
                Arc::new(Int64Array::from(vec![Some(1980), None])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.columns.birth_year && !table.columns.gender);
        assert_eq!(table.trips[0].duration, 120.5);
        assert_eq!(table.trips[0].birth_year, Some(1980.0));
        assert_eq!(table.trips[1].birth_year, None);
        assert_eq!(table.trips[1].day(), Day::Tuesday);
    }

    #[test]
    fn parquet_column_names_are_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chicago.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new(" Start Time", DataType::Utf8, false),
            Field::new("Trip Duration ", DataType::Float64, false),
            Field::new("Start Station", DataType::Utf8, false),
            Field::new("End Station", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["2017-01-02 07:00:00"])),
                Arc::new(Float64Array::from(vec![90.0])),
                Arc::new(StringArray::from(vec!["A"])),
                Arc::new(StringArray::from(vec!["B"])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.trips[0].hour(), 7);
        assert_eq!(table.trips[0].duration, 90.0);
    }
}
