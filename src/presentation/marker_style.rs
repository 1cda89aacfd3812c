//! Visual styling for marker overlays.
//!
//! This module provides functions for:
//! - Mapping deal status to theme colors
//! - Building overlay content for each node kind
//! - Computing the visual-state signature the reconciler diffs against
//!
//! Styling is deterministic: equal `(node, selection axes, palette)` inputs
//! produce equal content, which is what makes signature skipping sound.

use egui::Color32;

use crate::domain::{Node, NodeKind};
use crate::listing::{DealStatus, Pin};
use crate::theme::MarkerPalette;
use crate::traits::{OverlayAnchor, OverlayContent};
use crate::utils::formatting::format_price_compact;

// Z-order policy: selected above hovered above everything else. Overlay SDKs
// do not guarantee paint order by creation time, so these are reasserted on
// every reconciliation pass.
pub const Z_DEFAULT: i32 = 1;
pub const Z_HOVERED: i32 = 2;
pub const Z_SELECTED: i32 = 3;
pub const Z_INFO_BOX: i32 = 10;

/// Draw scale applied to a selected node's glyph.
const SELECTED_SCALE: f32 = 1.15;

/// Returns the marker fill color for a deal status.
pub fn status_color(status: DealStatus, palette: &MarkerPalette) -> Color32 {
    match status {
        DealStatus::PreDeal => palette.pre_deal,
        DealStatus::InDeal => palette.in_deal,
        DealStatus::Done => palette.done,
    }
}

/// Returns the anchor point for a node kind: pin glyphs hang above their
/// coordinate, cluster glyphs sit centered on their centroid.
pub fn node_anchor(kind: NodeKind) -> OverlayAnchor {
    match kind {
        NodeKind::Single | NodeKind::Stack => OverlayAnchor::BottomCenter,
        NodeKind::Cluster => OverlayAnchor::Center,
    }
}

/// Returns the z-index for a node given its interaction axes.
pub fn z_index(selected: bool, hovered: bool) -> i32 {
    if selected {
        Z_SELECTED
    } else if hovered {
        Z_HOVERED
    } else {
        Z_DEFAULT
    }
}

/// Computes the visual-state signature for a node.
///
/// The signature summarizes everything that feeds content generation:
/// kind, member count, representative status, and the interaction axes.
/// The reconciler skips content writes when it is unchanged, keeping
/// per-pass content work proportional to what actually changed.
pub fn visual_signature(node: &Node, selected: bool, hovered: bool) -> String {
    format!(
        "{}:{}:{}:{}:{}",
        kind_key(node.kind()),
        node.member_count(),
        status_key(node.primary_pin().status),
        selected as u8,
        hovered as u8
    )
}

/// Builds the overlay content for a node given its interaction axes.
pub fn node_content(
    node: &Node,
    selected: bool,
    hovered: bool,
    palette: &MarkerPalette,
) -> OverlayContent {
    let outline = if selected {
        Some(palette.selected_outline)
    } else if hovered {
        Some(palette.hover_outline)
    } else {
        None
    };
    let scale = if selected { SELECTED_SCALE } else { 1.0 };

    match node {
        Node::Single { pin, .. } => OverlayContent {
            label: price_label(pin),
            sublabel: None,
            fill: status_color(pin.status, palette),
            outline,
            text_color: palette.label_text,
            badge: None,
            scale,
        },
        Node::Stack { items, .. } => OverlayContent {
            label: price_label(&items[0]),
            sublabel: None,
            fill: status_color(items[0].status, palette),
            outline,
            text_color: palette.label_text,
            badge: Some(items.len()),
            scale,
        },
        Node::Cluster { items, .. } => OverlayContent {
            label: items.len().to_string(),
            sublabel: None,
            fill: palette.cluster,
            outline,
            text_color: palette.label_text,
            badge: None,
            scale,
        },
    }
}

/// Returns the short price label drawn on a pin glyph: the first set deal
/// type's compact price, or the display name when nothing is priced.
fn price_label(pin: &Pin) -> String {
    let price = if pin.is_sale {
        pin.sale_price
    } else if pin.is_jeonse {
        pin.jeonse_deposit
    } else if pin.is_rent {
        pin.rent_deposit
    } else {
        None
    };
    match price {
        Some(p) => format_price_compact(p),
        None => pin.display_name().to_string(),
    }
}

fn kind_key(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Single => "single",
        NodeKind::Stack => "stack",
        NodeKind::Cluster => "cluster",
    }
}

fn status_key(status: DealStatus) -> &'static str {
    match status {
        DealStatus::PreDeal => "pre",
        DealStatus::InDeal => "in",
        DealStatus::Done => "done",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeId;
    use crate::theme::ThemeManager;

    fn pin(id: u64, status: DealStatus) -> Pin {
        Pin {
            id,
            lat: 37.5,
            lng: 127.0,
            status,
            is_sale: true,
            is_jeonse: false,
            is_rent: false,
            sale_price: Some(250_000_000),
            jeonse_deposit: None,
            rent_deposit: None,
            rent_monthly: None,
            keywords: Vec::new(),
            building_name: "Tower".to_string(),
            title: None,
        }
    }

    fn single(id: u64, status: DealStatus) -> Node {
        Node::Single {
            id: NodeId::single(id),
            lat: 37.5,
            lng: 127.0,
            pin: pin(id, status),
        }
    }

    #[test]
    fn test_signature_changes_with_axes() {
        let node = single(1, DealStatus::PreDeal);
        let plain = visual_signature(&node, false, false);
        let hovered = visual_signature(&node, false, true);
        let selected = visual_signature(&node, true, false);
        assert_ne!(plain, hovered);
        assert_ne!(plain, selected);
        assert_ne!(hovered, selected);
    }

    #[test]
    fn test_signature_stable_for_equal_inputs() {
        let node = single(1, DealStatus::InDeal);
        assert_eq!(
            visual_signature(&node, true, false),
            visual_signature(&node, true, false)
        );
    }

    #[test]
    fn test_z_order_policy() {
        assert!(z_index(true, true) > z_index(false, true));
        assert!(z_index(false, true) > z_index(false, false));
    }

    #[test]
    fn test_stack_content_carries_badge() {
        let manager = ThemeManager::new();
        let node = Node::Stack {
            id: NodeId::stack(37.5, 127.0),
            lat: 37.5,
            lng: 127.0,
            items: vec![pin(1, DealStatus::PreDeal), pin(2, DealStatus::PreDeal)],
            title: None,
        };
        let content = node_content(&node, false, false, manager.current_palette());
        assert_eq!(content.badge, Some(2));
        assert_eq!(content.label, "2억 5,000");
    }

    #[test]
    fn test_selected_outline_beats_hover_outline() {
        let manager = ThemeManager::new();
        let palette = manager.current_palette();
        let node = single(1, DealStatus::PreDeal);
        let content = node_content(&node, true, true, palette);
        assert_eq!(content.outline, Some(palette.selected_outline));
        assert!(content.scale > 1.0);
    }
}
