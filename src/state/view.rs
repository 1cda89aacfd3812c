//! Map view state: the zoom/bounds snapshot driving aggregation.
//!
//! This module encapsulates the engine's copy of the surface's view. The
//! engine never asks the surface for its view mid-pass; it captures a
//! snapshot at pass start so every stage of one pass observes the same
//! zoom and bounds (last-write-wins across passes).

use crate::geo::GeoBounds;
use crate::traits::MapSurface;

/// State related to the captured map view.
///
/// Responsibilities:
/// - Holding the zoom/bounds snapshot of the most recent pass
/// - Detecting whether the surface's view has moved since that snapshot
#[derive(Debug, Clone)]
pub struct ViewState {
    /// Zoom level at the last capture
    zoom: f64,
    /// Viewport bounds at the last capture
    bounds: GeoBounds,
    /// Whether a capture has happened at all
    captured: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    /// Creates a new view state with no captured view.
    pub fn new() -> Self {
        Self {
            zoom: 0.0,
            bounds: GeoBounds::new(0.0, 0.0, 0.0, 0.0),
            captured: false,
        }
    }

    // ===== Queries =====

    /// Returns the captured zoom level.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Returns the captured viewport bounds.
    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    /// Returns true if a view has been captured.
    pub fn is_captured(&self) -> bool {
        self.captured
    }

    // ===== Mutations =====

    /// Captures the surface's current view.
    ///
    /// # Returns
    /// `true` if the captured view differs from the previous snapshot
    pub fn capture(&mut self, surface: &dyn MapSurface) -> bool {
        let zoom = surface.zoom();
        let bounds = surface.bounds();
        let changed = !self.captured || zoom != self.zoom || bounds != self.bounds;
        self.zoom = zoom;
        self.bounds = bounds;
        self.captured = true;
        changed
    }

    /// Forgets the captured view, forcing the next capture to report change.
    pub fn invalidate(&mut self) {
        self.captured = false;
    }
}
