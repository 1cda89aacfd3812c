//! Trait seams for the two external collaborators: the hosted map SDK and
//! the pin persistence service.
//!
//! The engine drives both through these traits and never reaches around them.
//! [`MapSurface`] is the coordinate bridge: projection, view queries, and
//! custom-overlay primitives. [`PinSource`] is the persistence boundary:
//! fetch and delete, both treated as asynchronous fire-and-forget-refresh
//! operations by the store.

use egui::{Color32, Pos2};

use crate::geo::{GeoBounds, LatLng};
use crate::listing::{OwnerId, Pin, PinId};

/// Type alias for surface-assigned overlay object IDs
pub type OverlayId = u64;

/// Anchor point of an overlay relative to its geographic position.
///
/// Pin glyphs hang above their coordinate (bottom-center anchor); cluster
/// glyphs and the hover info box sit centered on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayAnchor {
    BottomCenter,
    Center,
}

/// Renderer-agnostic description of an overlay's visual content.
///
/// The surface decides how to paint this; the engine only guarantees that
/// equal content descriptions are visually identical, which is what makes
/// signature-based write skipping sound.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayContent {
    /// Primary text (price short form, cluster count, info-box title)
    pub label: String,
    /// Secondary text line, if any
    pub sublabel: Option<String>,
    /// Fill color of the glyph body
    pub fill: Color32,
    /// Outline color, present while selected or hovered
    pub outline: Option<Color32>,
    /// Text color for the label
    pub text_color: Color32,
    /// Stacked-unit count badge, if any
    pub badge: Option<usize>,
    /// Draw scale; selected nodes render slightly larger
    pub scale: f32,
}

/// Creation-time description of an overlay object.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySpec {
    pub position: LatLng,
    pub anchor: OverlayAnchor,
    pub z_index: i32,
    pub content: OverlayContent,
    /// Whether the overlay participates in pointer hit-testing
    pub interactive: bool,
}

/// Coordinate bridge over the hosted map SDK.
///
/// Implementations wrap whatever map widget actually renders tiles. The
/// engine requires:
/// - geo↔screen projection for the current view
/// - current zoom level and viewport bounds
/// - custom-overlay create/position/content/z/visibility/destroy primitives
/// - programmatic pan and fit-bounds
///
/// All overlay mutations are synchronous from the engine's perspective; the
/// surface may batch actual rendering however it likes.
pub trait MapSurface {
    /// Returns the current zoom level.
    fn zoom(&self) -> f64;

    /// Returns the current viewport bounds.
    fn bounds(&self) -> GeoBounds;

    /// Projects a geographic position to screen coordinates.
    ///
    /// Returns `None` while the surface is not ready to project (e.g. before
    /// the first layout pass).
    fn project(&self, pos: LatLng) -> Option<Pos2>;

    // ===== Overlay Primitives =====

    /// Creates a new overlay object and returns its surface-assigned ID.
    fn create_overlay(&mut self, spec: OverlaySpec) -> OverlayId;

    /// Moves an existing overlay to a new geographic position.
    fn set_position(&mut self, id: OverlayId, pos: LatLng);

    /// Replaces an overlay's visual content.
    fn set_content(&mut self, id: OverlayId, content: OverlayContent);

    /// Sets an overlay's stacking order. Higher values paint on top.
    fn set_z_index(&mut self, id: OverlayId, z: i32);

    /// Shows or hides an overlay without destroying it.
    fn set_visible(&mut self, id: OverlayId, visible: bool);

    /// Destroys an overlay object.
    fn destroy_overlay(&mut self, id: OverlayId);

    // ===== Programmatic View Control =====

    /// Pans the view so the given position is centered.
    fn pan_to(&mut self, center: LatLng);

    /// Pans and zooms so the given bounds fit within the viewport.
    fn fit_bounds(&mut self, bounds: GeoBounds);
}

/// Persistence boundary for pin records.
///
/// Implementations talk to whatever remote store owns the records. Both
/// operations are invoked from a background thread by the pin store, hence
/// the `Send + Sync` bound.
pub trait PinSource: Send + Sync {
    /// Fetches all pins belonging to the given owner.
    fn fetch_all(&self, owner: OwnerId) -> anyhow::Result<Vec<Pin>>;

    /// Deletes a pin by ID.
    fn delete_by_id(&self, id: PinId) -> anyhow::Result<()>;
}
