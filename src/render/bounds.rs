use crate::foundation::core::GeoBounds;
use crate::foundation::error::VizResult;
use crate::render::diff::RenderState;
use crate::render::surface::DrawingSurface;

/// Fits the viewport to whatever is currently drawn.
///
/// Bounds are rebuilt from every drawn point on each call; shrinking after removals needs the
/// full scan anyway.
#[derive(Debug, Clone, Default)]
pub struct BoundsTracker {
    last: Option<GeoBounds>,
}

impl BoundsTracker {
    /// Create a tracker that has not fitted anything yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimal rectangle covering every marker and line vertex in `state`.
    pub fn compute(state: &RenderState) -> Option<GeoBounds> {
        GeoBounds::from_points(state.points())
    }

    /// Compute bounds and pass them to `surface.fit_bounds`.
    ///
    /// An empty state leaves the viewport untouched and returns `None`.
    pub fn fit(
        &mut self,
        state: &RenderState,
        surface: &mut dyn DrawingSurface,
    ) -> VizResult<Option<GeoBounds>> {
        let Some(bounds) = Self::compute(state) else {
            return Ok(None);
        };
        surface.fit_bounds(bounds)?;
        self.last = Some(bounds);
        Ok(Some(bounds))
    }

    /// Bounds passed to the most recent successful `fit`.
    pub fn last(&self) -> Option<GeoBounds> {
        self.last
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/bounds.rs"]
mod tests;
