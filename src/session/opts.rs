use crate::render::linker::LinkPalette;
use std::time::Duration;

/// Default autoplay cadence.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

/// Options controlling a [`crate::PlaybackController`].
#[derive(Clone, Debug)]
pub struct PlaybackOpts {
    /// Delay between autoplay advances.
    pub interval: Duration,
    /// Call `fit_bounds` on the surface after every render.
    pub fit_bounds: bool,
    /// Styles for linker-produced lines.
    pub palette: LinkPalette,
}

impl Default for PlaybackOpts {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            fit_bounds: true,
            palette: LinkPalette::default(),
        }
    }
}

impl PlaybackOpts {
    /// Return options with a different autoplay interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Return options with viewport fitting enabled or disabled.
    pub fn with_fit_bounds(mut self, fit: bool) -> Self {
        self.fit_bounds = fit;
        self
    }

    /// Return options with a different palette.
    pub fn with_palette(mut self, palette: LinkPalette) -> Self {
        self.palette = palette;
        self
    }
}
