use std::io::Read;

use anyhow::Result;
use chrono::NaiveDate;
use serde::Deserialize;

/// One row of the dataset after normalization: a region's case count on one
/// day.
#[derive(Clone, Debug, PartialEq)]
pub struct CaseRecord {
    pub date: NaiveDate,
    /// The county fips code. Not guaranteed to match any geometry; records
    /// with unknown codes just never get drawn.
    pub fips: String,
    pub county: String,
    pub state: String,
    pub cases: usize,
}

// The dataset reports these two cities as their own rows, with a fips code
// that doesn't match any county geometry.
const REMAP: [((&str, &str), &str); 2] = [
    (("New York City", "New York"), "36061"),
    (("Kansas City", "Missouri"), "29095"),
];

/// Reads `date,county,state,fips,cases` rows. Unreadable rows are skipped,
/// not fatal; extra columns are ignored.
pub fn load<R: Read>(reader: R) -> Result<Vec<CaseRecord>> {
    let mut records = Vec::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Row = match rec {
            Ok(x) => x,
            Err(err) => {
                warn!("Skipping unreadable row: {}", err);
                continue;
            }
        };
        let date = match NaiveDate::parse_from_str(&rec.date, "%Y-%m-%d") {
            Ok(x) => x,
            Err(_) => {
                warn!("Skipping a row with malformed date {:?}", rec.date);
                continue;
            }
        };
        let cases: usize = match rec.cases.parse() {
            Ok(x) => x,
            Err(_) => {
                warn!(
                    "Skipping {}, {} on {}: bad case count {:?}",
                    rec.county, rec.state, rec.date, rec.cases
                );
                continue;
            }
        };

        let mut fips = rec.fips;
        for ((county, state), corrected) in REMAP {
            if rec.county == county && rec.state == state {
                fips = corrected.to_string();
            }
        }

        records.push(CaseRecord {
            date,
            fips,
            county: rec.county,
            state: rec.state,
            cases,
        });
    }
    Ok(records)
}

#[derive(Deserialize)]
struct Row {
    date: String,
    county: String,
    state: String,
    fips: String,
    cases: String,
}
