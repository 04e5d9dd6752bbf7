use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::CaseRecord;

/// Per-date and per-county lookup structures over the raw records, built
/// once after loading and read-only afterwards.
pub struct CaseIndex {
    /// Distinct dates in first-seen order. The dataset is already sorted by
    /// date upstream; whatever order it had is preserved, not re-sorted.
    pub dates: Vec<NaiveDate>,
    pub total_by_date: BTreeMap<NaiveDate, usize>,
    /// fips -> date -> records. The inner lists usually have length 1 after
    /// normalization; consumers take the first entry.
    pub by_county: BTreeMap<String, BTreeMap<NaiveDate, Vec<CaseRecord>>>,
}

impl CaseIndex {
    pub fn new(records: Vec<CaseRecord>) -> Self {
        let mut dates = Vec::new();
        let mut total_by_date: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        let mut by_county: BTreeMap<String, BTreeMap<NaiveDate, Vec<CaseRecord>>> = BTreeMap::new();

        for rec in records {
            if !total_by_date.contains_key(&rec.date) {
                dates.push(rec.date);
            }
            *total_by_date.entry(rec.date).or_insert(0) += rec.cases;
            by_county
                .entry(rec.fips.clone())
                .or_insert_with(BTreeMap::new)
                .entry(rec.date)
                .or_insert_with(Vec::new)
                .push(rec);
        }

        Self {
            dates,
            total_by_date,
            by_county,
        }
    }

    /// All records for the most recent date.
    pub fn latest(&self) -> Vec<&CaseRecord> {
        let mut result = Vec::new();
        if let Some(date) = self.dates.last() {
            for per_date in self.by_county.values() {
                if let Some(list) = per_date.get(date) {
                    result.extend(list.iter());
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(date: &str, fips: &str, cases: usize) -> CaseRecord {
        CaseRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            fips: fips.to_string(),
            county: fips.to_string(),
            state: "Test".to_string(),
            cases,
        }
    }

    fn date(date: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn totals_sum_per_date() {
        let index = CaseIndex::new(vec![
            rec("2020-03-01", "01001", 3),
            rec("2020-03-01", "01002", 4),
            rec("2020-03-02", "01001", 5),
        ]);
        assert_eq!(index.total_by_date[&date("2020-03-01")], 7);
        assert_eq!(index.total_by_date[&date("2020-03-02")], 5);
    }

    #[test]
    fn dates_keep_first_seen_order() {
        let index = CaseIndex::new(vec![
            rec("2020-03-01", "01001", 1),
            rec("2020-03-02", "01001", 2),
            rec("2020-03-02", "01002", 3),
            rec("2020-03-05", "01001", 4),
        ]);
        assert_eq!(
            index.dates,
            vec![date("2020-03-01"), date("2020-03-02"), date("2020-03-05")]
        );
    }

    #[test]
    fn duplicate_county_days_keep_both_records() {
        let index = CaseIndex::new(vec![
            rec("2020-03-01", "01001", 1),
            rec("2020-03-01", "01001", 2),
        ]);
        let series = &index.by_county["01001"][&date("2020-03-01")];
        // Both survive; consumers take the first.
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].cases, 1);
    }

    #[test]
    fn latest_returns_the_last_dates_records() {
        let index = CaseIndex::new(vec![
            rec("2020-03-01", "01001", 1),
            rec("2020-03-02", "01001", 2),
            rec("2020-03-02", "01002", 3),
        ]);
        let mut latest: Vec<usize> = index.latest().into_iter().map(|r| r.cases).collect();
        latest.sort();
        assert_eq!(latest, vec![2, 3]);
    }
}
