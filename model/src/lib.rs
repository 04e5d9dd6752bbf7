#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod atlas;
mod cases;
mod frame;
mod index;
mod scale;

use std::collections::BTreeMap;

use abstutil::Timer;
use anyhow::Result;
use chrono::NaiveDate;
use geom::{Bounds, PolyLine, Polygon, Pt2D};

pub use self::atlas::{Atlas, CountyShape, CANVAS_HEIGHT, CANVAS_WIDTH};
pub use self::cases::CaseRecord;
pub use self::frame::{Frame, ANNOTATION_COUNT};
pub use self::index::CaseIndex;
pub use self::scale::{SpikeScale, MAX_SPIKE_HEIGHT};

/// Everything needed to render the animation, built once at startup.
/// Read-only afterwards, except the per-frame scratch fields on each County.
pub struct Model {
    /// The logical canvas.
    pub bounds: Bounds,
    /// Distinct dates in the dataset, in first-seen order.
    pub dates: Vec<NaiveDate>,
    pub total_by_date: BTreeMap<NaiveDate, usize>,
    /// Only counties with valid geometry and at least one dated record,
    /// sorted north to south (painter's order).
    pub counties: Vec<County>,
    pub scale: SpikeScale,

    // Static background geometry. Boundaries are drawn for every county,
    // whether or not it ever reports a case.
    pub nation: Vec<Polygon>,
    pub county_outlines: Vec<PolyLine>,
    pub state_outlines: Vec<PolyLine>,
}

/// A county enriched with its projected shape and its full case series.
pub struct County {
    pub fips: String,
    pub name: String,
    pub polygon: Polygon,
    pub center: Pt2D,
    /// date -> all records that day. Usually one; consumers take the first.
    pub series: BTreeMap<NaiveDate, Vec<CaseRecord>>,

    // Per-frame scratch, owned by the renderer.
    pub current_cases: usize,
    pub current_height: f64,
}

impl County {
    /// The count shown for this date. If normalization left duplicate rows
    /// for one day, the first wins; no resolution rule is attempted.
    pub fn cases_on(&self, date: NaiveDate) -> Option<usize> {
        self.series.get(&date).map(|list| list[0].cases)
    }
}

impl Model {
    pub fn import(
        cases_csv: &[u8],
        counties_geojson: &str,
        states_geojson: &str,
        nation_geojson: &str,
        timer: &mut Timer,
    ) -> Result<Model> {
        timer.start("parse case data");
        let records = cases::load(cases_csv)?;
        let index = CaseIndex::new(records);
        timer.stop("parse case data");
        if index.dates.is_empty() {
            bail!("The case data has no usable rows");
        }

        timer.start("parse geometry");
        let atlas = atlas::load(counties_geojson, states_geojson, nation_geojson)?;
        timer.stop("parse geometry");

        timer.start("bind counties");
        let scale = SpikeScale::from_latest(index.latest(), MAX_SPIKE_HEIGHT);
        let county_outlines = atlas
            .counties
            .iter()
            .flat_map(|shape| shape.outlines.clone())
            .collect();
        let counties = bind_counties(atlas.counties, index.by_county);
        timer.stop("bind counties");

        if counties.is_empty() {
            warn!("No county geometry matches the case data; the map will be empty");
        }

        let mut bounds = Bounds::new();
        bounds.update(Pt2D::new(0.0, 0.0));
        bounds.update(Pt2D::new(CANVAS_WIDTH, CANVAS_HEIGHT));

        Ok(Model {
            bounds,
            dates: index.dates,
            total_by_date: index.total_by_date,
            counties,
            scale,
            nation: atlas.nation,
            county_outlines,
            state_outlines: atlas.state_outlines,
        })
    }
}

/// Associates each county shape with its case series. Only counties with a
/// finite centroid and at least one dated record survive, sorted ascending
/// by centroid y so that northern spikes paint first and southern spikes
/// overdraw them.
fn bind_counties(
    shapes: Vec<CountyShape>,
    mut per_county: BTreeMap<String, BTreeMap<NaiveDate, Vec<CaseRecord>>>,
) -> Vec<County> {
    let mut counties = Vec::new();
    for shape in shapes {
        // Pt2D construction already rejects non-finite coordinates; this
        // just documents the contract.
        if !shape.center.x().is_finite() || !shape.center.y().is_finite() {
            continue;
        }
        let series = match per_county.remove(&shape.fips) {
            Some(x) if !x.is_empty() => x,
            _ => continue,
        };
        counties.push(County {
            fips: shape.fips,
            name: shape.name,
            polygon: shape.polygon,
            center: shape.center,
            series,
            current_cases: 0,
            current_height: 0.0,
        });
    }
    counties.sort_by(|a, b| a.center.y().total_cmp(&b.center.y()));
    counties
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(fips: &str, y: f64) -> CountyShape {
        let polygon = Polygon::rectangle(4.0, 4.0).translate(100.0, y);
        CountyShape {
            fips: fips.to_string(),
            name: fips.to_string(),
            center: polygon.center(),
            polygon,
            outlines: Vec::new(),
        }
    }

    fn series_for(fips: &str, days: Vec<u32>) -> (String, BTreeMap<NaiveDate, Vec<CaseRecord>>) {
        let mut per_date = BTreeMap::new();
        for day in days {
            let date = NaiveDate::from_ymd_opt(2020, 3, day).unwrap();
            per_date.insert(
                date,
                vec![CaseRecord {
                    date,
                    fips: fips.to_string(),
                    county: fips.to_string(),
                    state: "Test".to_string(),
                    cases: 1,
                }],
            );
        }
        (fips.to_string(), per_date)
    }

    #[test]
    fn binding_sorts_north_to_south() {
        let shapes = vec![shape("c", 300.0), shape("a", 100.0), shape("b", 200.0)];
        let per_county = BTreeMap::from([
            series_for("a", vec![1]),
            series_for("b", vec![1]),
            series_for("c", vec![1]),
        ]);
        let counties = bind_counties(shapes, per_county);
        let order: Vec<&str> = counties.iter().map(|c| c.fips.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn binding_drops_counties_without_records() {
        let shapes = vec![shape("a", 100.0), shape("b", 200.0)];
        let per_county = BTreeMap::from([series_for("a", vec![1])]);
        let counties = bind_counties(shapes, per_county);
        assert_eq!(counties.len(), 1);
        assert_eq!(counties[0].fips, "a");
    }
}
