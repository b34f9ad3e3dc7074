//! Write small synthetic city files so the explorer can run without the real
//! data set: `generate_sample [OUT_DIR] [ROWS_PER_CITY]`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }

    /// Exponential draw with the given mean, used for trip lengths.
    fn exponential(&mut self, mean: f64) -> f64 {
        -mean * (1.0 - self.next_f64()).max(1e-15).ln()
    }
}

struct CitySpec {
    file: &'static str,
    stations: &'static [&'static str],
    demographics: bool,
    fractional_durations: bool,
}

const CITIES: [CitySpec; 3] = [
    CitySpec {
        file: "chicago.csv",
        stations: &[
            "Streeter Dr & Grand Ave",
            "Lake Shore Dr & Monroe St",
            "Clinton St & Washington Blvd",
            "Canal St & Adams St",
            "Theater on the Lake",
            "Wood St & Hubbard St",
        ],
        demographics: true,
        fractional_durations: false,
    },
    CitySpec {
        file: "new_york_city.csv",
        stations: &[
            "Pershing Square North",
            "E 17 St & Broadway",
            "W 21 St & 6 Ave",
            "Broadway & E 22 St",
            "Central Park S & 6 Ave",
            "12 Ave & W 40 St",
        ],
        demographics: true,
        fractional_durations: false,
    },
    CitySpec {
        file: "washington.csv",
        stations: &[
            "Columbus Circle / Union Station",
            "Lincoln Memorial",
            "Jefferson Dr & 14th St SW",
            "Massachusetts Ave & Dupont Circle NW",
            "15th & P St NW",
            "Smithsonian-National Mall / Jefferson Dr & 12th St SW",
        ],
        demographics: false,
        fractional_durations: true,
    },
];

const PEAK_HOURS: [u32; 6] = [7, 8, 8, 17, 17, 18];

fn random_start(rng: &mut SimpleRng) -> NaiveDateTime {
    // 2017-01-01 .. 2017-06-30, weighted towards commuting hours.
    let day = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap_or_default()
        + Duration::days(rng.below(181) as i64);
    let hour = if rng.next_f64() < 0.5 {
        PEAK_HOURS[rng.below(PEAK_HOURS.len() as u64) as usize]
    } else {
        rng.below(24) as u32
    };
    day.and_hms_opt(hour, rng.below(60) as u32, rng.below(60) as u32)
        .unwrap_or_default()
}

fn write_city(dir: &Path, spec: &CitySpec, rows: usize, rng: &mut SimpleRng) -> Result<()> {
    let path = dir.join(spec.file);
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec![
        "",
        "Start Time",
        "End Time",
        "Trip Duration",
        "Start Station",
        "End Station",
        "User Type",
    ];
    if spec.demographics {
        header.extend(["Gender", "Birth Year"]);
    }
    writer.write_record(&header)?;

    for i in 0..rows {
        let start = random_start(rng);
        let raw = 120.0 + rng.exponential(780.0);
        let duration = if spec.fractional_durations {
            (raw * 1000.0).round() / 1000.0
        } else {
            raw.round()
        };
        let end = start + Duration::milliseconds((duration * 1000.0) as i64);
        let user_type = if rng.next_f64() < 0.8 {
            "Subscriber"
        } else {
            "Customer"
        };

        let mut record = vec![
            (i * 7 + 3).to_string(),
            start.format(TIMESTAMP_FORMAT).to_string(),
            end.format(TIMESTAMP_FORMAT).to_string(),
            duration.to_string(),
            rng.pick(spec.stations).to_string(),
            rng.pick(spec.stations).to_string(),
            user_type.to_string(),
        ];
        if spec.demographics {
            // Customers rarely report demographics.
            if user_type == "Customer" && rng.next_f64() < 0.7 {
                record.extend([String::new(), String::new()]);
            } else {
                let gender = if rng.next_f64() < 0.75 { "Male" } else { "Female" };
                let year = 1950 + rng.below(50);
                record.extend([gender.to_string(), format!("{year}.0")]);
            }
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    println!("Wrote {rows} trips to {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let dir = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));
    let rows: usize = match args.next() {
        Some(n) => n.parse().context("ROWS_PER_CITY must be a whole number")?,
        None => 2_000,
    };

    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut rng = SimpleRng::new(42);
    for spec in &CITIES {
        write_city(&dir, spec, rows, &mut rng)?;
    }
    Ok(())
}
