use crate::CaseRecord;

/// Spikes grow to this many logical units for the highest count on the most
/// recent date.
pub const MAX_SPIKE_HEIGHT: f64 = 400.0;

/// Maps a case count to a spike height with a square-root curve, so that
/// perceived spike area tracks the count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpikeScale {
    max: f64,
    height: f64,
}

impl SpikeScale {
    pub fn new(max: usize, height: f64) -> Self {
        Self {
            max: max as f64,
            height,
        }
    }

    /// The domain comes from the single most recent date's counts.
    pub fn from_latest<'a, I: IntoIterator<Item = &'a CaseRecord>>(latest: I, height: f64) -> Self {
        let max = latest.into_iter().map(|rec| rec.cases).max().unwrap_or(0);
        Self::new(max, height)
    }

    pub fn apply(&self, cases: usize) -> f64 {
        // An empty or all-zero domain maps every count to 0.
        if self.max == 0.0 {
            return 0.0;
        }
        (cases as f64 / self.max).sqrt() * self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints() {
        let scale = SpikeScale::new(100, 400.0);
        assert_eq!(scale.apply(0), 0.0);
        assert_eq!(scale.apply(100), 400.0);
    }

    #[test]
    fn monotonic() {
        let scale = SpikeScale::new(1000, 400.0);
        let mut last = 0.0;
        for cases in [0, 1, 10, 250, 500, 999, 1000] {
            let h = scale.apply(cases);
            assert!(h >= last, "{} maps to {}, below {}", cases, h, last);
            last = h;
        }
    }

    #[test]
    fn degenerate_domain_is_all_zero() {
        let scale = SpikeScale::new(0, 400.0);
        assert_eq!(scale.apply(0), 0.0);
        assert_eq!(scale.apply(12345), 0.0);

        let no_records: Vec<&CaseRecord> = Vec::new();
        let empty = SpikeScale::from_latest(no_records, 400.0);
        assert_eq!(empty.apply(7), 0.0);
    }
}
