use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{County, SpikeScale};

/// At most this many counties get a text annotation per frame.
pub const ANNOTATION_COUNT: usize = 10;

/// Everything the renderer needs for one date. Recomputing for the same
/// date yields the same frame; only the counties' scratch fields mutate.
#[derive(Debug, PartialEq)]
pub struct Frame {
    /// Indices into the county list with a record on this date, in painter's
    /// order (the list itself is sorted north to south). Counties without a
    /// record are absent entirely, not drawn with height 0.
    pub spikes: Vec<usize>,
    /// Indices of the annotated counties, highest count first.
    pub top: Vec<usize>,
    pub total: Option<usize>,
}

impl Frame {
    pub fn compute(
        counties: &mut [County],
        scale: &SpikeScale,
        total_by_date: &BTreeMap<NaiveDate, usize>,
        date: NaiveDate,
    ) -> Frame {
        let mut spikes = Vec::new();
        for (idx, county) in counties.iter_mut().enumerate() {
            if let Some(cases) = county.cases_on(date) {
                county.current_cases = cases;
                county.current_height = scale.apply(cases);
                spikes.push(idx);
            }
        }

        // Stable sort, so tied counts keep their painter's order.
        let mut top = spikes.clone();
        top.sort_by(|a, b| counties[*b].current_cases.cmp(&counties[*a].current_cases));
        top.truncate(ANNOTATION_COUNT);

        Frame {
            spikes,
            top,
            total: total_by_date.get(&date).copied(),
        }
    }
}
