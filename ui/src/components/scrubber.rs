use geom::Duration;
use widgetry::{
    EventCtx, GfxCtx, HorizontalAlignment, Key, Line, Outcome, Panel, Slider, Text, UpdateType,
    VerticalAlignment, Widget,
};

/// Configuration for a Scrubber.
pub struct ScrubberOpts<T> {
    /// Renders the current value as the label shown next to the slider.
    pub format: Box<dyn Fn(&T) -> String>,
    /// Starting index, clamped to the sequence.
    pub initial: usize,
    /// None ticks once per repaint; Some(interval) ticks whenever that much
    /// real time has accumulated. Both run off the same repaint callback.
    pub delay: Option<Duration>,
    pub autoplay: bool,
    /// Wrap around at the ends. When false, playback stops there instead.
    pub loop_around: bool,
    /// Ping-pong between the ends instead of wrapping.
    pub alternate: bool,
}

impl<T> ScrubberOpts<T> {
    pub fn new(format: Box<dyn Fn(&T) -> String>) -> Self {
        Self {
            format,
            initial: 0,
            delay: None,
            autoplay: true,
            loop_around: true,
            alternate: false,
        }
    }
}

/// A play/pause/seek driver over an ordered sequence of values. It owns no
/// timer; the embedding UI feeds it repaint deltas through on_frame and acts
/// on the index changes reported back. Any UI can bind to this directly;
/// ScrubberPanel below is the widgetry binding.
pub struct Scrubber<T> {
    values: Vec<T>,
    idx: usize,
    direction: isize,
    running: bool,
    // Real time since the last interval tick. Unused when delay is None.
    accumulated: Duration,
    opts: ScrubberOpts<T>,
}

impl<T> Scrubber<T> {
    /// values must be non-empty.
    pub fn new(values: Vec<T>, opts: ScrubberOpts<T>) -> Scrubber<T> {
        assert!(!values.is_empty(), "a scrubber needs at least one value");
        let idx = opts.initial.min(values.len() - 1);
        let running = opts.autoplay;
        Scrubber {
            values,
            idx,
            direction: 1,
            running,
            accumulated: Duration::ZERO,
            opts,
        }
    }

    pub fn current(&self) -> &T {
        &self.values[self.idx]
    }

    pub fn current_index(&self) -> usize {
        self.idx
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn label(&self) -> String {
        (self.opts.format)(self.current())
    }

    /// The single entry and exit point for playback. Starting recomputes the
    /// direction and immediately steps once, so a scrubber parked at the end
    /// visibly moves on play. Returns true if the index changed.
    pub fn toggle(&mut self) -> bool {
        if self.running {
            self.running = false;
            return false;
        }
        self.direction = if self.opts.alternate && self.idx == self.values.len() - 1 {
            -1
        } else {
            1
        };
        let prev = self.idx;
        self.idx = self.wrapped(self.idx as isize + self.direction);
        self.accumulated = Duration::ZERO;
        self.running = true;
        self.idx != prev
    }

    /// One tick. At a terminal edge this stops, reverses, or wraps,
    /// depending on the options. Returns true if the index changed.
    pub fn advance(&mut self) -> bool {
        let terminal = if self.direction > 0 {
            self.values.len() - 1
        } else {
            0
        };
        if self.idx == terminal {
            if !self.opts.loop_around {
                self.running = false;
                return false;
            }
            if self.opts.alternate {
                self.direction = -self.direction;
            }
        }
        let prev = self.idx;
        self.idx = self.wrapped(self.idx as isize + self.direction);
        self.idx != prev
    }

    /// Jump to an index. from_user marks a genuine user interaction, which
    /// interrupts autoplay; programmatic seeks leave playback alone.
    pub fn seek(&mut self, idx: usize, from_user: bool) -> bool {
        if from_user && self.running {
            self.running = false;
        }
        let prev = self.idx;
        self.idx = idx.min(self.values.len() - 1);
        self.idx != prev
    }

    /// Feed one repaint's worth of real time. Ticks zero or more times
    /// depending on the configured delay; the catch-up loop is bounded by
    /// the accumulated time, so a tick never re-enters itself.
    pub fn on_frame(&mut self, dt: Duration) -> bool {
        if !self.running {
            return false;
        }
        match self.opts.delay {
            None => self.advance(),
            Some(interval) => {
                self.accumulated = self.accumulated + dt;
                let mut changed = false;
                while self.running && self.accumulated >= interval {
                    self.accumulated = self.accumulated - interval;
                    changed |= self.advance();
                }
                changed
            }
        }
    }

    fn wrapped(&self, idx: isize) -> usize {
        let len = self.values.len() as isize;
        (((idx % len) + len) % len) as usize
    }
}

/// Binds a Scrubber to a panel: play/pause button, step buttons, an area
/// slider, and the formatted label. The panel also carries a "summary"
/// placeholder the embedding state can fill with whatever belongs next to
/// the controls.
pub struct ScrubberPanel<T> {
    pub panel: Panel,
    scrubber: Scrubber<T>,
}

impl<T: Clone> ScrubberPanel<T> {
    pub fn new(ctx: &mut EventCtx, values: Vec<T>, opts: ScrubberOpts<T>) -> Self {
        let scrubber = Scrubber::new(values, opts);
        let mut result = Self {
            panel: Panel::new_builder(Widget::col(vec![
                Slider::area(
                    ctx,
                    0.25 * ctx.canvas.window_width,
                    percent(&scrubber),
                    "scrubber",
                ),
                Widget::placeholder(ctx, "label"),
                Widget::placeholder(ctx, "controls"),
                Widget::placeholder(ctx, "summary"),
            ]))
            .aligned(HorizontalAlignment::Left, VerticalAlignment::Bottom)
            .build(ctx),
            scrubber,
        };
        result.update_controls(ctx);
        result.sync(ctx);
        result
    }

    fn update_controls(&mut self, ctx: &mut EventCtx) {
        let play_pause = if self.scrubber.is_running() {
            ctx.style().btn_outline.text("pause")
        } else {
            ctx.style().btn_outline.text("play")
        };
        let row = Widget::custom_row(vec![
            play_pause.hotkey(Key::Space).build_def(ctx).margin_right(16),
            ctx.style()
                .btn_prev()
                .hotkey(Key::LeftArrow)
                .build_widget(ctx, "previous")
                .margin_right(4),
            ctx.style()
                .btn_next()
                .hotkey(Key::RightArrow)
                .build_widget(ctx, "next"),
        ]);
        self.panel.replace(ctx, "controls", row);
    }

    // Keeps the label and slider in sync with the machine. set_percent
    // doesn't count as user input, so this never pauses playback.
    fn sync(&mut self, ctx: &mut EventCtx) {
        let label = Text::from(Line(self.scrubber.label()).big_monospaced()).into_widget(ctx);
        self.panel.replace(ctx, "label", label);

        let pct = percent(&self.scrubber);
        self.panel.slider_mut("scrubber").set_percent(ctx, pct);
    }

    /// Returns the new current value on every index change, whether from
    /// ticking or from the user.
    pub fn event(&mut self, ctx: &mut EventCtx) -> Option<T> {
        let was_running = self.scrubber.is_running();
        let mut changed = false;

        match self.panel.event(ctx) {
            Outcome::Clicked(x) => match x.as_ref() {
                "play" | "pause" => {
                    changed |= self.scrubber.toggle();
                }
                "previous" => {
                    let idx = self.scrubber.current_index().saturating_sub(1);
                    changed |= self.scrubber.seek(idx, true);
                }
                "next" => {
                    let idx = self.scrubber.current_index() + 1;
                    changed |= self.scrubber.seek(idx, true);
                }
                _ => unreachable!(),
            },
            Outcome::Changed(x) => match x.as_ref() {
                "scrubber" => {
                    let pct = self.panel.slider("scrubber").get_percent();
                    let last = self.scrubber.values().len() - 1;
                    changed |= self
                        .scrubber
                        .seek((pct * last as f64).round() as usize, true);
                }
                _ => unreachable!(),
            },
            _ => {}
        }

        if self.scrubber.is_running() {
            if let Some(dt) = ctx.input.nonblocking_is_update_event() {
                ctx.input.use_update_event();
                changed |= self.scrubber.on_frame(dt);
            }
            ctx.request_update(UpdateType::Game);
        }

        if was_running != self.scrubber.is_running() {
            self.update_controls(ctx);
        }
        if changed {
            self.sync(ctx);
            return Some(self.scrubber.current().clone());
        }
        None
    }

    pub fn current(&self) -> &T {
        self.scrubber.current()
    }

    pub fn draw(&self, g: &mut GfxCtx) {
        self.panel.draw(g);
    }
}

fn percent<T>(scrubber: &Scrubber<T>) -> f64 {
    let last = scrubber.values().len() - 1;
    if last == 0 {
        0.0
    } else {
        scrubber.current_index() as f64 / last as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(config: impl Fn(&mut ScrubberOpts<usize>)) -> ScrubberOpts<usize> {
        let mut opts = ScrubberOpts::new(Box::new(|x: &usize| x.to_string()));
        config(&mut opts);
        opts
    }

    #[test]
    fn wraps_around() {
        let mut scrubber = Scrubber::new(vec![0, 1, 2, 3], opts(|o| o.autoplay = false));
        let mut seen = Vec::new();
        for _ in 0..4 {
            scrubber.advance();
            seen.push(scrubber.current_index());
        }
        // After exactly one lap, back at the start.
        assert_eq!(seen, vec![1, 2, 3, 0]);
    }

    #[test]
    fn ping_pongs() {
        let mut scrubber = Scrubber::new(
            vec![0, 1, 2],
            opts(|o| {
                o.autoplay = false;
                o.alternate = true;
            }),
        );
        let mut seen = vec![scrubber.current_index()];
        for _ in 0..6 {
            scrubber.advance();
            seen.push(scrubber.current_index());
        }
        assert_eq!(seen, vec![0, 1, 2, 1, 0, 1, 2]);
    }

    #[test]
    fn stops_at_the_end_without_looping() {
        let mut scrubber = Scrubber::new(vec![0, 1, 2], opts(|o| o.loop_around = false));
        assert!(scrubber.advance());
        assert!(scrubber.advance());
        assert_eq!(scrubber.current_index(), 2);
        // The edge tick stops instead of moving.
        assert!(!scrubber.advance());
        assert!(!scrubber.is_running());
        assert_eq!(scrubber.current_index(), 2);
    }

    #[test]
    fn user_seeks_interrupt_playback() {
        let mut scrubber = Scrubber::new(vec![0, 1, 2, 3], opts(|_| {}));
        assert!(scrubber.is_running());
        assert!(scrubber.seek(2, true));
        assert!(!scrubber.is_running());
        assert_eq!(scrubber.current_index(), 2);

        let mut programmatic = Scrubber::new(vec![0, 1, 2, 3], opts(|_| {}));
        assert!(programmatic.seek(2, false));
        assert!(programmatic.is_running());
    }

    #[test]
    fn toggle_steps_immediately() {
        let mut scrubber = Scrubber::new(vec![0, 1, 2], opts(|o| o.autoplay = false));
        assert!(scrubber.toggle());
        assert!(scrubber.is_running());
        assert_eq!(scrubber.current_index(), 1);
        // Toggling again only stops.
        assert!(!scrubber.toggle());
        assert!(!scrubber.is_running());
        assert_eq!(scrubber.current_index(), 1);
    }

    #[test]
    fn toggle_reverses_from_the_end_when_alternating() {
        let mut scrubber = Scrubber::new(
            vec![0, 1, 2],
            opts(|o| {
                o.autoplay = false;
                o.alternate = true;
                o.initial = 2;
            }),
        );
        assert!(scrubber.toggle());
        assert_eq!(scrubber.current_index(), 1);
    }

    #[test]
    fn interval_ticks_accumulate_repaint_time() {
        let mut scrubber = Scrubber::new(
            vec![0, 1, 2, 3, 4, 5],
            opts(|o| o.delay = Some(Duration::seconds(0.25))),
        );
        assert!(!scrubber.on_frame(Duration::seconds(0.1)));
        assert_eq!(scrubber.current_index(), 0);
        assert!(scrubber.on_frame(Duration::seconds(0.2)));
        assert_eq!(scrubber.current_index(), 1);
        // A long frame catches up with multiple ticks.
        assert!(scrubber.on_frame(Duration::seconds(0.5)));
        assert_eq!(scrubber.current_index(), 3);
    }

    #[test]
    fn repaint_mode_ticks_every_frame() {
        let mut scrubber = Scrubber::new(vec![0, 1, 2, 3], opts(|_| {}));
        assert!(scrubber.on_frame(Duration::seconds(0.016)));
        assert!(scrubber.on_frame(Duration::seconds(0.016)));
        assert_eq!(scrubber.current_index(), 2);
    }

    #[test]
    fn paused_frames_do_nothing() {
        let mut scrubber = Scrubber::new(vec![0, 1, 2], opts(|o| o.autoplay = false));
        assert!(!scrubber.on_frame(Duration::seconds(1.0)));
        assert_eq!(scrubber.current_index(), 0);
    }
}
