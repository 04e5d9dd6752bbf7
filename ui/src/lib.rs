#[macro_use]
extern crate log;

mod components;
mod viewer;

use abstutil::Timer;
use anyhow::Result;
use structopt::StructOpt;
use widgetry::{Color, GfxCtx, Settings, SharedAppState};

use model::Model;

#[derive(StructOpt)]
struct Args {
    /// The path to a CSV file with date,county,state,fips,cases rows
    #[structopt(long, default_value = "data/us-counties.csv")]
    cases: String,
    /// GeoJSON with one feature per county, ids matching the fips codes in
    /// the case data
    #[structopt(long, default_value = "data/counties.geojson")]
    counties: String,
    /// GeoJSON with state boundary features
    #[structopt(long, default_value = "data/states.geojson")]
    states: String,
    /// GeoJSON with the national outline
    #[structopt(long, default_value = "data/nation.geojson")]
    nation: String,
}

impl Args {
    fn load(&self, timer: &mut Timer) -> Result<Model> {
        let cases = fs_err::read(&self.cases)?;
        let counties = fs_err::read_to_string(&self.counties)?;
        let states = fs_err::read_to_string(&self.states)?;
        let nation = fs_err::read_to_string(&self.nation)?;
        Model::import(&cases, &counties, &states, &nation, timer)
    }
}

pub fn main() {
    abstutil::logger::setup();

    let args = Args::from_iter(abstutil::cli_args());

    widgetry::run(Settings::new("County case spikes"), move |ctx| {
        let model = ctx.loading_screen("initialize model", |_, timer| args.load(timer).unwrap());
        info!(
            "Loaded {} dates across {} counties",
            model.dates.len(),
            model.counties.len()
        );

        let bounds = &model.bounds;
        ctx.canvas.map_dims = (bounds.max_x, bounds.max_y);
        ctx.canvas.center_on_map_pt(bounds.center());

        let mut app = App { model };
        let states = vec![viewer::Viewer::new_state(ctx, &mut app)];
        (app, states)
    });
}

pub struct App {
    pub model: Model,
}

impl SharedAppState for App {
    fn draw_default(&self, g: &mut GfxCtx) {
        // The scene is redrawn in full every frame; start from a blank page.
        g.clear(Color::WHITE);
    }
}

pub type Transition = widgetry::Transition<App>;
