//! Incremental synchronization of the node list against live overlays.
//!
//! One reconciliation pass:
//! - destroys overlays whose node vanished from the new list
//! - creates overlays for nodes that gained one
//! - rewrites content only where the visual-state signature changed
//! - reasserts the z-order policy on every surviving overlay
//!
//! Content work is O(changed nodes) per pass, not O(all nodes): an unchanged
//! second pass performs zero content writes. Side effects are confined to
//! the surface's overlay API.

use log::debug;

use crate::domain::Node;
use crate::engine::overlay_arena::{OverlayArena, OverlayHandle};
use crate::presentation::marker_style;
use crate::state::SelectionState;
use crate::theme::MarkerPalette;
use crate::traits::{MapSurface, OverlaySpec};

/// Mutation counts of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Overlays created for newly appearing nodes
    pub created: usize,
    /// Overlays destroyed for vanished nodes
    pub destroyed: usize,
    /// Content rewrites on surviving overlays
    pub content_writes: usize,
}

/// Synchronizes the overlay layer with the given node list.
///
/// # Arguments
/// * `nodes` - The aggregator's most recent output; diffed by node id
/// * `selection` - Selection/hover axes feeding the visual signatures
/// * `palette` - Marker palette feeding content generation
/// * `arena` - Owned handle collection mutated in place
/// * `surface` - Overlay primitives of the map SDK
pub fn reconcile(
    nodes: &[Node],
    selection: &SelectionState,
    palette: &MarkerPalette,
    arena: &mut OverlayArena,
    surface: &mut dyn MapSurface,
) -> ReconcileStats {
    let mut stats = ReconcileStats::default();

    // Destroy overlays whose node is gone from the new list.
    for id in arena.ids() {
        if !nodes.iter().any(|n| n.id() == &id) {
            if let Some(handle) = arena.remove(&id) {
                surface.destroy_overlay(handle.overlay);
                stats.destroyed += 1;
            }
        }
    }

    for node in nodes {
        let selected = node
            .member_ids()
            .iter()
            .any(|&pin| selection.is_pin_selected(pin));
        let hovered = selection.is_node_hovered(node.id())
            || node
                .member_ids()
                .iter()
                .any(|&pin| selection.is_pin_hovered(pin));

        let signature = marker_style::visual_signature(node, selected, hovered);
        let z = marker_style::z_index(selected, hovered);

        match arena.get_mut(node.id()) {
            Some(handle) => {
                if handle.signature != signature {
                    let content = marker_style::node_content(node, selected, hovered, palette);
                    surface.set_content(handle.overlay, content);
                    handle.signature = signature;
                    stats.content_writes += 1;
                }
                // Paint order is not guaranteed by creation time; reassert.
                surface.set_z_index(handle.overlay, z);
            }
            None => {
                let content = marker_style::node_content(node, selected, hovered, palette);
                let overlay = surface.create_overlay(OverlaySpec {
                    position: node.position(),
                    anchor: marker_style::node_anchor(node.kind()),
                    z_index: z,
                    content,
                    interactive: true,
                });
                arena.insert(
                    node.id().clone(),
                    OverlayHandle {
                        overlay,
                        kind: node.kind(),
                        signature,
                    },
                );
                stats.created += 1;
            }
        }
    }

    debug!(
        "reconciled {} nodes: {} created, {} destroyed, {} content writes",
        nodes.len(),
        stats.created,
        stats.destroyed,
        stats.content_writes
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NodeId, NodeKind};
    use crate::geo::{GeoBounds, LatLng};
    use crate::listing::{DealStatus, Pin};
    use crate::theme::ThemeManager;
    use crate::traits::{OverlayContent, OverlayId};
    use egui::Pos2;
    use std::collections::HashMap;

    /// Surface stub counting overlay mutations.
    #[derive(Default)]
    struct CountingSurface {
        next_id: OverlayId,
        alive: HashMap<OverlayId, OverlayContent>,
        content_calls: usize,
        z_calls: usize,
    }

    impl MapSurface for CountingSurface {
        fn zoom(&self) -> f64 {
            12.0
        }
        fn bounds(&self) -> GeoBounds {
            GeoBounds::new(30.0, 120.0, 45.0, 135.0)
        }
        fn project(&self, _pos: LatLng) -> Option<Pos2> {
            Some(Pos2::ZERO)
        }
        fn create_overlay(&mut self, spec: OverlaySpec) -> OverlayId {
            self.next_id += 1;
            self.alive.insert(self.next_id, spec.content);
            self.next_id
        }
        fn set_position(&mut self, _id: OverlayId, _pos: LatLng) {}
        fn set_content(&mut self, id: OverlayId, content: OverlayContent) {
            self.content_calls += 1;
            self.alive.insert(id, content);
        }
        fn set_z_index(&mut self, _id: OverlayId, _z: i32) {
            self.z_calls += 1;
        }
        fn set_visible(&mut self, _id: OverlayId, _visible: bool) {}
        fn destroy_overlay(&mut self, id: OverlayId) {
            self.alive.remove(&id);
        }
        fn pan_to(&mut self, _center: LatLng) {}
        fn fit_bounds(&mut self, _bounds: GeoBounds) {}
    }

    fn pin(id: u64) -> Pin {
        Pin {
            id,
            lat: 37.5,
            lng: 127.0,
            status: DealStatus::PreDeal,
            is_sale: true,
            is_jeonse: false,
            is_rent: false,
            sale_price: Some(200_000_000),
            jeonse_deposit: None,
            rent_deposit: None,
            rent_monthly: None,
            keywords: Vec::new(),
            building_name: "Tower".to_string(),
            title: None,
        }
    }

    fn single(id: u64) -> Node {
        Node::Single {
            id: NodeId::single(id),
            lat: 37.5,
            lng: 127.0,
            pin: pin(id),
        }
    }

    #[test]
    fn test_first_pass_creates_all_overlays() {
        let nodes = vec![single(1), single(2)];
        let selection = SelectionState::new();
        let themes = ThemeManager::new();
        let mut arena = OverlayArena::new();
        let mut surface = CountingSurface::default();

        let stats = reconcile(&nodes, &selection, themes.current_palette(), &mut arena, &mut surface);
        assert_eq!(stats.created, 2);
        assert_eq!(stats.destroyed, 0);
        assert_eq!(arena.len(), 2);
        assert_eq!(surface.alive.len(), 2);
    }

    #[test]
    fn test_unchanged_second_pass_writes_nothing() {
        let nodes = vec![single(1), single(2), single(3)];
        let selection = SelectionState::new();
        let themes = ThemeManager::new();
        let mut arena = OverlayArena::new();
        let mut surface = CountingSurface::default();

        reconcile(&nodes, &selection, themes.current_palette(), &mut arena, &mut surface);
        let second = reconcile(&nodes, &selection, themes.current_palette(), &mut arena, &mut surface);

        assert_eq!(second.created, 0);
        assert_eq!(second.destroyed, 0);
        assert_eq!(second.content_writes, 0, "idempotent pass must skip content");
        assert_eq!(surface.content_calls, 0);
    }

    #[test]
    fn test_hover_change_rewrites_only_affected_node() {
        let nodes = vec![single(1), single(2), single(3)];
        let mut selection = SelectionState::new();
        let themes = ThemeManager::new();
        let mut arena = OverlayArena::new();
        let mut surface = CountingSurface::default();

        reconcile(&nodes, &selection, themes.current_palette(), &mut arena, &mut surface);

        selection.set_hover(NodeId::single(2), vec![2]);
        let stats = reconcile(&nodes, &selection, themes.current_palette(), &mut arena, &mut surface);
        assert_eq!(stats.content_writes, 1, "only the hovered node repaints");
    }

    #[test]
    fn test_vanished_node_destroys_overlay() {
        let selection = SelectionState::new();
        let themes = ThemeManager::new();
        let mut arena = OverlayArena::new();
        let mut surface = CountingSurface::default();

        reconcile(&[single(1), single(2)], &selection, themes.current_palette(), &mut arena, &mut surface);
        let stats = reconcile(&[single(1)], &selection, themes.current_palette(), &mut arena, &mut surface);

        assert_eq!(stats.destroyed, 1);
        assert_eq!(arena.len(), 1);
        assert_eq!(surface.alive.len(), 1);
    }

    #[test]
    fn test_cluster_handle_records_kind() {
        let node = Node::Cluster {
            id: NodeId::cluster(&[1, 2]),
            lat: 37.5,
            lng: 127.0,
            items: vec![pin(1), pin(2)],
        };
        let selection = SelectionState::new();
        let themes = ThemeManager::new();
        let mut arena = OverlayArena::new();
        let mut surface = CountingSurface::default();

        reconcile(
            std::slice::from_ref(&node),
            &selection,
            themes.current_palette(),
            &mut arena,
            &mut surface,
        );
        assert_eq!(arena.get(node.id()).unwrap().kind, NodeKind::Cluster);
    }
}
