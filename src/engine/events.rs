//! Pointer and gesture event vocabulary.
//!
//! The host translates raw SDK callbacks into these events and feeds them to
//! [`crate::engine::MapEngine::handle_event`]. Touch input carries its own
//! pointer kind because touch devices have no true hover: the engine turns a
//! first tap into a preview and only a second tap into a selection.

use egui::Pos2;

use crate::domain::NodeId;
use crate::geo::LatLng;

/// Input device class of a pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// Action chosen from the open context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Start the create-pin workflow at the menu's ground position
    CreatePin,
    /// Start the edit workflow for the menu's pin
    EditPin,
    /// Delete the menu's pin
    DeletePin,
    /// Toggle roadview at the menu's position
    OpenRoadview,
}

/// One user interaction delivered to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Pointer entered a node's overlay
    NodeEnter { node: NodeId },
    /// Pointer left a node's overlay
    NodeLeave { node: NodeId },
    /// Node overlay was clicked/tapped
    NodeClick { node: NodeId, pointer: PointerKind },
    /// Node overlay was right-clicked
    NodeContextClick { node: NodeId, screen_pos: Pos2 },
    /// Empty map area was right-clicked
    MapContextClick { screen_pos: Pos2, position: LatLng },
    /// Empty map area was clicked/tapped
    BackgroundClick,
    /// A pan gesture started
    DragStart { pointer: PointerKind },
    /// An item was chosen from the open context menu
    MenuAction(MenuAction),
    /// The external create/edit workflow finished (modal closed)
    WorkflowFinished,
}

/// Side effect the host must run on the engine's behalf.
///
/// The engine owns no I/O; deletions are routed back to the host, which
/// forwards them to the pin store and eventually feeds the refreshed list
/// into [`crate::engine::MapEngine::apply_pins`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    DeletePin(crate::listing::PinId),
}
