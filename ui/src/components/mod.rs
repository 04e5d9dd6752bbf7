mod scrubber;

pub use scrubber::{Scrubber, ScrubberOpts, ScrubberPanel};
