//! Engine composition root: aggregation passes, reconciliation, and the
//! interaction state machine.
//!
//! [`MapEngine`] composes focused state components (selection, context menu,
//! modes, view snapshot) with the engine-owned overlay arena, hover box, and
//! aggregation cache. All interaction flows through named entry points, each
//! documented with the recomputation it triggers:
//!
//! - [`MapEngine::set_surface_ready`] — first full pass (nothing runs before)
//! - [`MapEngine::apply_pins`] — new store snapshot → full pass
//! - [`MapEngine::on_view_changed`] — zoom/pan → re-aggregate + reconcile
//! - [`MapEngine::handle_event`] — pointer/menu event → state transition +
//!   reconcile (signature diffing repaints only affected nodes)
//!
//! Passes are synchronous and last-write-wins: every pass reads the
//! surface's current view, so a pass triggered by a stale view is simply
//! superseded by the next one; nothing queues.

mod events;
mod hover_box;
mod overlay_arena;
mod reconciler;

pub use events::{EngineEvent, MenuAction, PointerKind, SideEffect};
pub use hover_box::HoverInfoBox;
pub use overlay_arena::{OverlayArena, OverlayHandle};
pub use reconciler::{reconcile, ReconcileStats};

use log::debug;

use crate::domain::{aggregate, Node, NodeId, NodeKind};
use crate::geo::{GeoBounds, LatLng};
use crate::listing::Pin;
use crate::presentation::{marker_style, summary};
use crate::state::{ContextMenuState, MenuTarget, ModeState, SelectionState, ViewState};
use crate::theme::ThemeManager;
use crate::traits::MapSurface;

/// Central engine driving the marker layer of one map.
///
/// Owns the shared mutable state of the subsystem: the overlay arena and the
/// selection machine. Both are mutated exclusively through this type's entry
/// points; no external actor touches them directly.
pub struct MapEngine {
    // ===== Focused State Components =====
    /// Selection and hover state
    pub selection: SelectionState,
    /// Context-menu state
    pub menu: ContextMenuState,
    /// Create / edit / roadview mode flags
    pub modes: ModeState,
    /// Marker theming
    pub themes: ThemeManager,

    // ===== Engine-Owned Internals =====
    view: ViewState,
    pins: Vec<Pin>,
    pins_generation: u64,
    surface_ready: bool,
    nodes: Vec<Node>,
    pass_seq: u64,
    agg_cache: AggregationCache,
    arena: OverlayArena,
    hover_box: HoverInfoBox,
    create_position: Option<LatLng>,
}

impl Default for MapEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MapEngine {
    /// Creates an engine with no pins and an unready surface.
    pub fn new() -> Self {
        Self {
            selection: SelectionState::new(),
            menu: ContextMenuState::new(),
            modes: ModeState::new(),
            themes: ThemeManager::new(),
            view: ViewState::new(),
            pins: Vec::new(),
            pins_generation: 0,
            surface_ready: false,
            nodes: Vec::new(),
            pass_seq: 0,
            agg_cache: AggregationCache::default(),
            arena: OverlayArena::new(),
            hover_box: HoverInfoBox::new(),
            create_position: None,
        }
    }

    // ===== Queries =====

    /// Returns the most recent aggregation output.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns the number of passes run so far.
    pub fn pass_seq(&self) -> u64 {
        self.pass_seq
    }

    /// Returns true if the surface has signalled readiness.
    pub fn is_surface_ready(&self) -> bool {
        self.surface_ready
    }

    /// Returns the ground position a create workflow was started at, if any.
    pub fn create_position(&self) -> Option<LatLng> {
        self.create_position
    }

    /// Returns the number of live overlay handles.
    pub fn overlay_count(&self) -> usize {
        self.arena.len()
    }

    /// Translates a surface overlay id back into the node it renders.
    pub fn node_for_overlay(&self, overlay: crate::traits::OverlayId) -> Option<&NodeId> {
        self.arena.node_for_overlay(overlay)
    }

    // ===== Pass Triggers =====

    /// Marks the map SDK as ready and runs the first full pass.
    ///
    /// Until this fires, every other entry point only updates state; no
    /// aggregation or overlay work is queued in the interim.
    pub fn set_surface_ready(&mut self, surface: &mut dyn MapSurface) {
        if self.surface_ready {
            return;
        }
        self.surface_ready = true;
        self.run_pass(surface);
    }

    /// Applies a new pin snapshot from the store.
    ///
    /// Clears a selection whose pin vanished from the snapshot (deleted
    /// externally), invalidates the aggregation cache, and runs a full pass.
    pub fn apply_pins(&mut self, pins: Vec<Pin>, surface: &mut dyn MapSurface) {
        self.pins = pins;
        self.pins_generation += 1;
        self.agg_cache.invalidate();

        if let Some(id) = self.selection.selected_pin_id() {
            if !self.pins.iter().any(|p| p.id == id) {
                debug!("selected pin {} vanished from snapshot, clearing selection", id);
                self.selection.clear_selection();
            }
        }
        self.run_pass(surface);
    }

    /// Re-aggregates for the surface's current zoom and bounds.
    ///
    /// Call after every pan/zoom settle. Reads the *current* view, so a
    /// burst of rapid view changes collapses into whichever pass runs last.
    pub fn on_view_changed(&mut self, surface: &mut dyn MapSurface) {
        self.run_pass(surface);
    }

    /// Switches the marker theme and repaints every overlay.
    ///
    /// Signatures don't encode the palette, so they are reset wholesale to
    /// force content rewrites on the next pass.
    pub fn set_theme(&mut self, name: &str, surface: &mut dyn MapSurface) -> Result<(), String> {
        self.themes.set_current_theme(name)?;
        self.arena.reset_signatures();
        self.reconcile_only(surface);
        Ok(())
    }

    /// Resets the interaction state: selection, hover, context menu, and any
    /// create/edit workflow. Roadview stays as-is (orthogonal toggle).
    pub fn reset_selection(&mut self, surface: &mut dyn MapSurface) {
        self.selection.clear();
        self.menu.close();
        self.modes.finish_workflow();
        self.create_position = None;
        self.hover_box.hide(surface);
        self.reconcile_only(surface);
    }

    // ===== Event Dispatch =====

    /// Applies one interaction event to the state machine.
    ///
    /// Returns a side effect when the host must act (pin deletion); all
    /// other consequences are handled internally.
    pub fn handle_event(
        &mut self,
        surface: &mut dyn MapSurface,
        event: EngineEvent,
    ) -> Option<SideEffect> {
        match event {
            EngineEvent::NodeEnter { node } => {
                if let Some(node) = self.find_node(&node) {
                    self.enter_node(surface, &node);
                }
                None
            }
            EngineEvent::NodeLeave { node } => {
                if self.selection.is_node_hovered(&node) {
                    self.selection.clear_hover();
                    self.hover_box.hide(surface);
                    self.reconcile_only(surface);
                }
                None
            }
            EngineEvent::NodeClick { node, pointer } => {
                if let Some(node) = self.find_node(&node) {
                    self.click_node(surface, &node, pointer);
                }
                None
            }
            EngineEvent::NodeContextClick { node, screen_pos } => {
                if let Some(node) = self.find_node(&node) {
                    self.menu.open_for_pin(screen_pos, node.primary_pin().id);
                }
                None
            }
            EngineEvent::MapContextClick { screen_pos, position } => {
                self.menu.open_for_ground(screen_pos, position);
                None
            }
            EngineEvent::BackgroundClick => {
                self.reset_selection(surface);
                None
            }
            EngineEvent::DragStart { pointer } => {
                // Touch drags dismiss everything; mouse drags only the menu.
                match pointer {
                    PointerKind::Touch => self.reset_selection(surface),
                    PointerKind::Mouse => self.menu.close(),
                }
                None
            }
            EngineEvent::MenuAction(action) => self.dispatch_menu_action(surface, action),
            EngineEvent::WorkflowFinished => {
                self.reset_selection(surface);
                None
            }
        }
    }

    // ===== Node Interaction =====

    /// Pointer entered a node: record group hover and show the info box.
    fn enter_node(&mut self, surface: &mut dyn MapSurface, node: &Node) {
        self.selection.set_hover(node.id().clone(), node.member_ids());
        self.show_hover_box(surface, node);
        self.reconcile_only(surface);
    }

    /// Node clicked. Clusters zoom to fit; pins select, with the touch
    /// preview step in between.
    fn click_node(&mut self, surface: &mut dyn MapSurface, node: &Node, pointer: PointerKind) {
        match node.kind() {
            NodeKind::Cluster => {
                // Fit, then aggregate for the new view. Never selects.
                surface.fit_bounds(node.member_bounds());
                self.run_pass(surface);
            }
            NodeKind::Single | NodeKind::Stack => {
                let already_previewed = self.selection.is_node_hovered(node.id());
                if pointer == PointerKind::Touch && !already_previewed {
                    // No hover on touch devices: the first tap previews, a
                    // second tap on the same node promotes to selection.
                    self.enter_node(surface, node);
                } else {
                    self.select_node(surface, node);
                }
            }
        }
    }

    fn select_node(&mut self, surface: &mut dyn MapSurface, node: &Node) {
        self.selection.select(node.primary_pin().clone(), node.id().clone());
        self.menu.close();
        self.reconcile_only(surface);
    }

    fn show_hover_box(&mut self, surface: &mut dyn MapSurface, node: &Node) {
        let accent = match node.kind() {
            NodeKind::Cluster => self.themes.current_palette().cluster,
            _ => marker_style::status_color(
                node.primary_pin().status,
                self.themes.current_palette(),
            ),
        };
        self.hover_box.show(
            surface,
            node.position(),
            summary::hover_title(node),
            summary::hover_summary(node),
            accent,
            self.themes.current_palette(),
        );
    }

    // ===== Context Menu =====

    fn dispatch_menu_action(
        &mut self,
        surface: &mut dyn MapSurface,
        action: MenuAction,
    ) -> Option<SideEffect> {
        let target = self.menu.target();
        self.menu.close();

        match (action, target) {
            (MenuAction::CreatePin, Some(MenuTarget::Ground(position))) => {
                self.modes.begin_create();
                self.create_position = Some(position);
                None
            }
            (MenuAction::EditPin, Some(MenuTarget::Pin(id))) => {
                if let Some(node) = self.nodes.iter().find(|n| n.contains_pin(id)).cloned() {
                    if let Some(pin) = self.pins.iter().find(|p| p.id == id).cloned() {
                        self.selection.select(pin, node.id().clone());
                    }
                    self.modes.begin_edit();
                    self.reconcile_only(surface);
                }
                None
            }
            (MenuAction::DeletePin, Some(MenuTarget::Pin(id))) => {
                if self.selection.is_pin_selected(id) {
                    self.selection.clear_selection();
                    self.reconcile_only(surface);
                }
                Some(SideEffect::DeletePin(id))
            }
            (MenuAction::OpenRoadview, _) => {
                // Orthogonal: does not clear the current selection.
                self.modes.toggle_roadview();
                None
            }
            _ => None,
        }
    }

    // ===== Pass Machinery =====

    /// Runs one aggregation + reconciliation pass against the current view.
    fn run_pass(&mut self, surface: &mut dyn MapSurface) {
        if !self.surface_ready {
            return;
        }
        self.pass_seq += 1;
        self.view.capture(surface);

        let zoom = self.view.zoom();
        let bounds = self.view.bounds();
        if !self.agg_cache.matches(zoom, &bounds, self.pins_generation) {
            self.nodes = aggregate(&self.pins, zoom, &bounds);
            self.agg_cache.store(zoom, &bounds, self.pins_generation);
        }

        self.prune_dangling_hover(surface);
        self.reconcile_only(surface);
    }

    /// Drops hover state pointing at a node that no longer exists.
    fn prune_dangling_hover(&mut self, surface: &mut dyn MapSurface) {
        let dangling = match self.selection.hovered_node() {
            Some(id) => !self.nodes.iter().any(|n| n.id() == id),
            None => false,
        };
        if dangling {
            self.selection.clear_hover();
            self.hover_box.hide(surface);
        }
    }

    fn reconcile_only(&mut self, surface: &mut dyn MapSurface) {
        reconcile(
            &self.nodes,
            &self.selection,
            self.themes.current_palette(),
            &mut self.arena,
            surface,
        );
    }

    fn find_node(&self, id: &NodeId) -> Option<Node> {
        self.nodes.iter().find(|n| n.id() == id).cloned()
    }
}

/// Remembers which `(zoom, bounds, pin snapshot)` the current node list was
/// aggregated for, so unchanged passes skip re-aggregation entirely.
#[derive(Default)]
struct AggregationCache {
    key: Option<(u64, [u64; 4], u64)>,
}

impl AggregationCache {
    fn key_of(zoom: f64, bounds: &GeoBounds, pins_generation: u64) -> (u64, [u64; 4], u64) {
        (
            zoom.to_bits(),
            [
                bounds.south.to_bits(),
                bounds.west.to_bits(),
                bounds.north.to_bits(),
                bounds.east.to_bits(),
            ],
            pins_generation,
        )
    }

    fn matches(&self, zoom: f64, bounds: &GeoBounds, pins_generation: u64) -> bool {
        self.key == Some(Self::key_of(zoom, bounds, pins_generation))
    }

    fn store(&mut self, zoom: f64, bounds: &GeoBounds, pins_generation: u64) {
        self.key = Some(Self::key_of(zoom, bounds, pins_generation));
    }

    fn invalidate(&mut self) {
        self.key = None;
    }
}
