//! Singleton hover info box.
//!
//! At most one info-box overlay ever exists. `show` repositions and rewrites
//! the existing overlay instead of creating a new one, so rapid hover churn
//! cannot leak overlay objects; `hide` makes it invisible but keeps it alive
//! for the next hover.

use egui::Color32;

use crate::geo::LatLng;
use crate::presentation::marker_style::Z_INFO_BOX;
use crate::theme::MarkerPalette;
use crate::traits::{MapSurface, OverlayAnchor, OverlayContent, OverlayId, OverlaySpec};

/// Transient overlay rendering a title/summary card near the hovered node.
#[derive(Debug, Default)]
pub struct HoverInfoBox {
    overlay: Option<OverlayId>,
    visible: bool,
}

impl HoverInfoBox {
    /// Creates a hover box with no overlay materialized yet.
    pub fn new() -> Self {
        Self {
            overlay: None,
            visible: false,
        }
    }

    /// Returns true if the box is currently shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Shows the box near the given position.
    ///
    /// Creates the overlay on first use; afterwards only repositions and
    /// rewrites content.
    ///
    /// # Arguments
    /// * `surface` - Overlay primitives of the map SDK
    /// * `anchor` - Geographic position to attach to (node position/centroid)
    /// * `title` - Heading line (building or listing name)
    /// * `summary` - Deal/price summary line
    /// * `accent` - Accent color tying the box to the hovered marker
    /// * `palette` - Current marker palette
    pub fn show(
        &mut self,
        surface: &mut dyn MapSurface,
        anchor: LatLng,
        title: String,
        summary: String,
        accent: Color32,
        palette: &MarkerPalette,
    ) {
        let content = OverlayContent {
            label: title,
            sublabel: Some(summary),
            fill: palette.info_background,
            outline: Some(accent),
            text_color: palette.info_text,
            badge: None,
            scale: 1.0,
        };

        match self.overlay {
            Some(id) => {
                surface.set_position(id, anchor);
                surface.set_content(id, content);
                surface.set_visible(id, true);
            }
            None => {
                self.overlay = Some(surface.create_overlay(OverlaySpec {
                    position: anchor,
                    anchor: OverlayAnchor::BottomCenter,
                    z_index: Z_INFO_BOX,
                    content,
                    interactive: false,
                }));
            }
        }
        self.visible = true;
    }

    /// Hides the box without destroying the overlay.
    pub fn hide(&mut self, surface: &mut dyn MapSurface) {
        if let Some(id) = self.overlay {
            if self.visible {
                surface.set_visible(id, false);
            }
        }
        self.visible = false;
    }

    /// Destroys the overlay entirely (surface teardown).
    pub fn destroy(&mut self, surface: &mut dyn MapSurface) {
        if let Some(id) = self.overlay.take() {
            surface.destroy_overlay(id);
        }
        self.visible = false;
    }
}
