//! Selection and hover state management.
//!
//! This module encapsulates all state related to user selection,
//! including the selected pin, the hovered node and its member pins,
//! and the active overlay key.

use crate::domain::NodeId;
use crate::listing::{Pin, PinId};

/// State related to user selection and hover.
///
/// Responsibilities:
/// - Tracking the selected pin and its overlay key
/// - Tracking the hovered node and the full member-pin set (group highlight)
/// - Providing intent-revealing selection queries
///
/// Hover and selection are independent axes: a node can be simultaneously
/// hovered and selected, and each gets its own visual treatment.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    /// Currently selected pin, if any
    selected_pin: Option<Pin>,
    /// Overlay key of the node that was clicked to select
    active_overlay_key: Option<NodeId>,
    /// Currently hovered node, if any
    hovered_node: Option<NodeId>,
    /// Member pins of the hovered node; hovering a stack or cluster records
    /// the full member set so every covered pin can highlight together
    hovered_pins: Vec<PinId>,
}

impl SelectionState {
    /// Creates a new selection state with nothing selected or hovered.
    pub fn new() -> Self {
        Self {
            selected_pin: None,
            active_overlay_key: None,
            hovered_node: None,
            hovered_pins: Vec::new(),
        }
    }

    /// Clears all selection and hover state.
    pub fn clear(&mut self) {
        self.selected_pin = None;
        self.active_overlay_key = None;
        self.clear_hover();
    }

    // ===== Selection Queries =====

    /// Returns the currently selected pin, if any.
    pub fn selected_pin(&self) -> Option<&Pin> {
        self.selected_pin.as_ref()
    }

    /// Returns the selected pin's ID, if any.
    pub fn selected_pin_id(&self) -> Option<PinId> {
        self.selected_pin.as_ref().map(|p| p.id)
    }

    /// Returns the overlay key of the node holding the selection, if any.
    pub fn active_overlay_key(&self) -> Option<&NodeId> {
        self.active_overlay_key.as_ref()
    }

    /// Returns true if the given pin is the selected one.
    pub fn is_pin_selected(&self, pin: PinId) -> bool {
        self.selected_pin_id() == Some(pin)
    }

    // ===== Hover Queries =====

    /// Returns the currently hovered node, if any.
    pub fn hovered_node(&self) -> Option<&NodeId> {
        self.hovered_node.as_ref()
    }

    /// Returns the hovered member-pin set, or `None` when nothing is hovered.
    ///
    /// Hovering a single yields a one-element slice; hovering a stack or
    /// cluster yields every member id.
    pub fn hovered_pins(&self) -> Option<&[PinId]> {
        if self.hovered_node.is_some() {
            Some(&self.hovered_pins)
        } else {
            None
        }
    }

    /// Returns true if the given node is the hovered one.
    pub fn is_node_hovered(&self, node: &NodeId) -> bool {
        self.hovered_node.as_ref() == Some(node)
    }

    /// Returns true if the given pin belongs to the hovered member set.
    pub fn is_pin_hovered(&self, pin: PinId) -> bool {
        self.hovered_node.is_some() && self.hovered_pins.contains(&pin)
    }

    // ===== Selection Mutations =====

    /// Selects a pin and records the overlay key of the node it came from.
    ///
    /// # Arguments
    /// * `pin` - The pin to select
    /// * `overlay_key` - Id of the node whose overlay was clicked
    pub fn select(&mut self, pin: Pin, overlay_key: NodeId) {
        self.selected_pin = Some(pin);
        self.active_overlay_key = Some(overlay_key);
    }

    /// Clears the selection axis only, leaving hover untouched.
    pub fn clear_selection(&mut self) {
        self.selected_pin = None;
        self.active_overlay_key = None;
    }

    // ===== Hover Mutations =====

    /// Sets the hovered node and its member-pin set.
    pub fn set_hover(&mut self, node: NodeId, member_pins: Vec<PinId>) {
        self.hovered_node = Some(node);
        self.hovered_pins = member_pins;
    }

    /// Clears the hover axis only, leaving selection untouched.
    pub fn clear_hover(&mut self) {
        self.hovered_node = None;
        self.hovered_pins.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::DealStatus;

    fn pin(id: u64) -> Pin {
        Pin {
            id,
            lat: 37.5,
            lng: 127.0,
            status: DealStatus::PreDeal,
            is_sale: true,
            is_jeonse: false,
            is_rent: false,
            sale_price: None,
            jeonse_deposit: None,
            rent_deposit: None,
            rent_monthly: None,
            keywords: Vec::new(),
            building_name: String::new(),
            title: None,
        }
    }

    #[test]
    fn test_hover_and_selection_are_independent() {
        let mut state = SelectionState::new();
        state.select(pin(1), NodeId::single(1));
        state.set_hover(NodeId::single(1), vec![1]);

        assert!(state.is_pin_selected(1));
        assert!(state.is_pin_hovered(1));

        state.clear_hover();
        assert!(state.is_pin_selected(1), "clearing hover keeps selection");
        assert!(state.hovered_pins().is_none());
    }

    #[test]
    fn test_group_hover_records_all_members() {
        let mut state = SelectionState::new();
        state.set_hover(NodeId::cluster(&[1, 2, 3]), vec![1, 2, 3]);
        assert_eq!(state.hovered_pins(), Some(&[1, 2, 3][..]));
        assert!(state.is_pin_hovered(2));
        assert!(!state.is_pin_hovered(4));
    }

    #[test]
    fn test_clear_resets_both_axes() {
        let mut state = SelectionState::new();
        state.select(pin(1), NodeId::single(1));
        state.set_hover(NodeId::single(2), vec![2]);
        state.clear();
        assert!(state.selected_pin().is_none());
        assert!(state.active_overlay_key().is_none());
        assert!(state.hovered_pins().is_none());
    }
}
