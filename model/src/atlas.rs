use anyhow::Result;
use geojson::{Feature, GeoJson, Value};
use geom::{Bounds, Distance, GPSBounds, LonLat, PolyLine, Polygon, Pt2D, Ring};

/// The logical canvas. The map itself occupies a 975x610 frame, centered
/// horizontally and pushed to the bottom, leaving headroom for tall spikes.
pub const CANVAS_WIDTH: f64 = 1200.0;
pub const CANVAS_HEIGHT: f64 = 820.0;
const MAP_WIDTH: f64 = 975.0;
const MAP_HEIGHT: f64 = 610.0;

/// County, state, and nation shapes, projected into the logical canvas.
pub struct Atlas {
    pub counties: Vec<CountyShape>,
    pub state_outlines: Vec<PolyLine>,
    pub nation: Vec<Polygon>,
}

pub struct CountyShape {
    pub fips: String,
    pub name: String,
    /// The largest piece, for hit-testing. Multi-piece coastal counties
    /// still get all their boundary rings drawn via outlines.
    pub polygon: Polygon,
    pub outlines: Vec<PolyLine>,
    pub center: Pt2D,
}

/// Parses three GeoJSON FeatureCollections and projects everything into the
/// fixed logical canvas. Features with degenerate geometry or no id are
/// skipped, never fatal.
pub fn load(counties_raw: &str, states_raw: &str, nation_raw: &str) -> Result<Atlas> {
    let county_features = parse_collection(counties_raw)?;
    let state_features = parse_collection(states_raw)?;
    let nation_features = parse_collection(nation_raw)?;
    let projection = Projection::fit(&county_features, &state_features, &nation_features);

    let mut counties = Vec::new();
    for feature in &county_features {
        let fips = match &feature.id {
            Some(x) => x.clone(),
            None => {
                warn!("Skipping a county feature without an id");
                continue;
            }
        };

        let mut polygons = Vec::new();
        let mut outlines = Vec::new();
        for pts in &feature.rings {
            match projection.ring(pts) {
                Some(ring) => {
                    if let Ok(pl) = PolyLine::new(ring.points().clone()) {
                        outlines.push(pl);
                    }
                    polygons.push(ring.into_polygon());
                }
                None => {
                    warn!("Skipping a degenerate ring of county {}", fips);
                }
            }
        }
        let polygon = match polygons
            .into_iter()
            .max_by(|a, b| a.area().total_cmp(&b.area()))
        {
            Some(x) => x,
            None => {
                warn!("County {} has no usable geometry", fips);
                continue;
            }
        };

        counties.push(CountyShape {
            name: feature.name.clone().unwrap_or_else(|| fips.clone()),
            fips,
            center: polygon.center(),
            polygon,
            outlines,
        });
    }

    let mut state_outlines = Vec::new();
    for feature in &state_features {
        for pts in &feature.rings {
            if let Some(ring) = projection.ring(pts) {
                if let Ok(pl) = PolyLine::new(ring.points().clone()) {
                    state_outlines.push(pl);
                }
            }
        }
    }

    let mut nation = Vec::new();
    for feature in &nation_features {
        for pts in &feature.rings {
            if let Some(ring) = projection.ring(pts) {
                nation.push(ring.into_polygon());
            }
        }
    }

    Ok(Atlas {
        counties,
        state_outlines,
        nation,
    })
}

struct RawFeature {
    id: Option<String>,
    name: Option<String>,
    /// Exterior rings only, in lon/lat.
    rings: Vec<Vec<LonLat>>,
}

fn parse_collection(raw: &str) -> Result<Vec<RawFeature>> {
    let collection = match raw.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(x) => x,
        _ => bail!("expected a FeatureCollection"),
    };

    let mut result = Vec::new();
    for feature in collection.features {
        let mut rings = Vec::new();
        if let Some(geometry) = &feature.geometry {
            match &geometry.value {
                Value::Polygon(polygon) => rings.extend(exterior_ring(polygon)),
                Value::MultiPolygon(polygons) => {
                    for polygon in polygons {
                        rings.extend(exterior_ring(polygon));
                    }
                }
                _ => {}
            }
        }
        result.push(RawFeature {
            id: feature_id(&feature),
            name: feature
                .property("name")
                .and_then(|x| x.as_str())
                .map(|x| x.to_string()),
            rings,
        });
    }
    Ok(result)
}

fn exterior_ring(rings: &[Vec<Vec<f64>>]) -> Option<Vec<LonLat>> {
    let ring = rings.first()?;
    Some(ring.iter().map(|pt| LonLat::new(pt[0], pt[1])).collect())
}

fn feature_id(feature: &Feature) -> Option<String> {
    match &feature.id {
        Some(geojson::feature::Id::String(x)) => Some(x.clone()),
        // County fips codes are zero-padded to 5 digits.
        Some(geojson::feature::Id::Number(x)) => x.as_u64().map(|x| format!("{:05}", x)),
        None => feature
            .property("GEOID")
            .and_then(|x| x.as_str())
            .map(|x| x.to_string()),
    }
}

/// Projects lon/lat through GPSBounds, then fits the result linearly into
/// the map frame of the logical canvas.
struct Projection {
    gps: GPSBounds,
    raw: Bounds,
    scale: f64,
    x_off: f64,
    y_off: f64,
}

impl Projection {
    fn fit(counties: &[RawFeature], states: &[RawFeature], nation: &[RawFeature]) -> Projection {
        let mut gps = GPSBounds::new();
        for feature in counties.iter().chain(states).chain(nation) {
            for ring in &feature.rings {
                for pt in ring {
                    gps.update(*pt);
                }
            }
        }

        // The nation outline determines the frame, so a dataset covering few
        // counties still lands in the right spot. Fall back to everything.
        let frame_source: &[RawFeature] = if nation.is_empty() { counties } else { nation };
        let mut raw = Bounds::new();
        for feature in frame_source {
            for ring in &feature.rings {
                for pt in ring {
                    raw.update(pt.to_pt(&gps));
                }
            }
        }

        let scale = if raw.width() > 0.0 && raw.height() > 0.0 {
            (MAP_WIDTH / raw.width()).min(MAP_HEIGHT / raw.height())
        } else {
            1.0
        };
        Projection {
            x_off: (CANVAS_WIDTH - MAP_WIDTH) / 2.0 + (MAP_WIDTH - scale * raw.width()) / 2.0,
            y_off: (CANVAS_HEIGHT - MAP_HEIGHT) + (MAP_HEIGHT - scale * raw.height()) / 2.0,
            gps,
            raw,
            scale,
        }
    }

    fn project(&self, pt: LonLat) -> Pt2D {
        let pt = pt.to_pt(&self.gps);
        Pt2D::new(
            (pt.x() - self.raw.min_x) * self.scale + self.x_off,
            (pt.y() - self.raw.min_y) * self.scale + self.y_off,
        )
    }

    /// Projects one closed ring, deduplicating points that collapse together
    /// at this scale. Returns None for degenerate rings.
    fn ring(&self, pts: &[LonLat]) -> Option<Ring> {
        let mut projected: Vec<Pt2D> = Vec::new();
        for pt in pts {
            let pt = self.project(*pt);
            if projected
                .last()
                .map(|last| last.approx_eq(pt, Distance::meters(0.01)))
                .unwrap_or(false)
            {
                continue;
            }
            projected.push(pt);
        }
        if projected.len() > 1
            && projected[0].approx_eq(*projected.last().unwrap(), Distance::meters(0.01))
        {
            projected.pop();
        }
        if projected.len() < 3 {
            return None;
        }
        projected.push(projected[0]);
        Ring::new(projected).ok()
    }
}
