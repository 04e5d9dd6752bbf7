use abstutil::prettyprint_usize;
use chrono::NaiveDate;
use geom::{Distance, Duration, PolyLine, Polygon, Pt2D, Ring};
use widgetry::mapspace::{ObjectID, World};
use widgetry::{
    Color, Drawable, EventCtx, Fill, GeomBatch, GfxCtx, Line, LinearGradient, State, Text,
};

use model::{Frame, Model};

use crate::components::{ScrubberOpts, ScrubberPanel};
use crate::{App, Transition};

const SPIKE_HALF_WIDTH: f64 = 6.0;

pub struct Viewer {
    controls: ScrubberPanel<NaiveDate>,
    draw_base: Drawable,
    world: World<Obj>,
    draw_annotations: Drawable,
}

impl Viewer {
    pub fn new_state(ctx: &mut EventCtx, app: &mut App) -> Box<dyn State<App>> {
        let mut opts: ScrubberOpts<NaiveDate> =
            ScrubberOpts::new(Box::new(|date| date.format("%B %-d").to_string()));
        opts.delay = Some(Duration::seconds(0.25));

        let mut state = Self {
            controls: ScrubberPanel::new(ctx, app.model.dates.clone(), opts),
            draw_base: ctx.upload(base_map(&app.model)),
            world: World::unbounded(),
            draw_annotations: Drawable::empty(ctx),
        };
        let date = *state.controls.current();
        state.on_date_change(ctx, app, date);
        Box::new(state)
    }

    fn on_date_change(&mut self, ctx: &mut EventCtx, app: &mut App, date: NaiveDate) {
        let model = &mut app.model;
        let frame = Frame::compute(
            &mut model.counties,
            &model.scale,
            &model.total_by_date,
            date,
        );

        // Spikes, in painter's order; southern spikes overdraw northern ones.
        let mut world = World::bounded(&model.bounds);
        for idx in &frame.spikes {
            let county = &model.counties[*idx];
            let mut batch = GeomBatch::new();
            if let Some((shape, outline)) = spike_shape(county.center, county.current_height) {
                batch.push(spike_fill(county.center, county.current_height), shape);
                batch.push(theme_color(), outline);
            }

            let mut txt = Text::from(Line(county.name.clone()));
            txt.add_line(format!(
                "{} cases",
                prettyprint_usize(county.current_cases)
            ));
            world
                .add(Obj::County(*idx))
                .hitbox(county.polygon.clone())
                .draw(batch)
                .hover_alpha(0.5)
                .tooltip(txt)
                .build(ctx);
        }
        world.initialize_hover(ctx);
        self.world = world;

        // Annotations for the top counties only, above each spike's tip.
        let mut annotations = GeomBatch::new();
        for idx in &frame.top {
            let county = &model.counties[*idx];
            let txt = Text::from_all(vec![
                Line(county.name.clone()),
                Line(format!(" {}", prettyprint_usize(county.current_cases)))
                    .fg(theme_color()),
            ]);
            annotations.append(
                txt.render_autocropped(ctx).scale(0.6).centered_on(Pt2D::new(
                    county.center.x(),
                    county.center.y() - county.current_height - 10.0,
                )),
            );
        }
        self.draw_annotations = ctx.upload(annotations);

        let total = match frame.total {
            Some(total) => format!("{} total cases", prettyprint_usize(total)),
            None => "no data for this date".to_string(),
        };
        self.controls
            .panel
            .replace(ctx, "summary", Text::from(Line(total)).into_widget(ctx));
    }
}

impl State<App> for Viewer {
    fn event(&mut self, ctx: &mut EventCtx, app: &mut App) -> Transition {
        ctx.canvas_movement();

        if let Some(date) = self.controls.event(ctx) {
            self.on_date_change(ctx, app, date);
        }

        self.world.event(ctx);

        Transition::Keep
    }

    fn draw(&self, g: &mut GfxCtx, _: &App) {
        g.redraw(&self.draw_base);
        self.world.draw(g);
        g.redraw(&self.draw_annotations);
        self.controls.draw(g);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Obj {
    County(usize),
}
impl ObjectID for Obj {}

fn base_map(model: &Model) -> GeomBatch {
    let mut batch = GeomBatch::new();
    batch.extend(background_color(), model.nation.clone());
    for pl in &model.county_outlines {
        batch.push(
            Color::hex("#e6e6e6"),
            pl.make_polygons(Distance::meters(0.5)),
        );
    }
    for pl in &model.state_outlines {
        batch.push(
            Color::hex("#bdbdbd"),
            pl.make_polygons(Distance::meters(0.5)),
        );
    }
    batch
}

/// The filled triangle and its stroked edges. A zero-height spike has no
/// shape at all; the county still counts as rendered for this date.
fn spike_shape(base: Pt2D, height: f64) -> Option<(Polygon, Polygon)> {
    if height < 0.1 {
        return None;
    }
    let left = Pt2D::new(base.x() - SPIKE_HALF_WIDTH, base.y());
    let tip = Pt2D::new(base.x(), base.y() - height);
    let right = Pt2D::new(base.x() + SPIKE_HALF_WIDTH, base.y());

    let shape = Ring::new(vec![left, tip, right, left]).ok()?.into_polygon();
    // Only the two slanted edges are stroked, like an open pen path.
    let outline = PolyLine::new(vec![left, tip, right])
        .ok()?
        .make_polygons(Distance::meters(1.0));
    Some((shape, outline))
}

// Theme color at the tip, fading into the background at the base.
fn spike_fill(base: Pt2D, height: f64) -> Fill {
    Fill::LinearGradient(LinearGradient {
        line: geom::Line::must_new(Pt2D::new(base.x(), base.y() - height), base),
        stops: vec![(0.0, theme_color()), (1.0, background_color())],
    })
}

fn theme_color() -> Color {
    Color::hex("#cc0000")
}

fn background_color() -> Color {
    Color::hex("#f3f3f3")
}
