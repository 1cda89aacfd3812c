//! Context-menu state management.
//!
//! This module encapsulates the state of the right-click context menu:
//! whether it is open, where on screen it sits, and what it targets
//! (an existing pin, or a raw map coordinate for creation).

use egui::Pos2;

use crate::geo::LatLng;
use crate::listing::PinId;

/// What the open context menu refers to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuTarget {
    /// An existing pin (edit / delete / roadview actions apply)
    Pin(PinId),
    /// An empty map position (create action applies)
    Ground(LatLng),
}

/// State related to the right-click context menu.
///
/// Responsibilities:
/// - Tracking open/closed state and screen anchor position
/// - Remembering the menu target for the dispatched action
#[derive(Debug, Clone, Default)]
pub struct ContextMenuState {
    visible: bool,
    screen_pos: Pos2,
    target: Option<MenuTarget>,
}

impl ContextMenuState {
    /// Creates a new context-menu state, closed.
    pub fn new() -> Self {
        Self {
            visible: false,
            screen_pos: Pos2::ZERO,
            target: None,
        }
    }

    // ===== Queries =====

    /// Returns true if the menu is open.
    pub fn is_open(&self) -> bool {
        self.visible
    }

    /// Returns the screen position the menu is anchored at.
    pub fn screen_pos(&self) -> Pos2 {
        self.screen_pos
    }

    /// Returns the menu target, if the menu is open.
    pub fn target(&self) -> Option<MenuTarget> {
        if self.visible {
            self.target
        } else {
            None
        }
    }

    // ===== Mutations =====

    /// Opens the menu over an existing pin.
    pub fn open_for_pin(&mut self, screen_pos: Pos2, pin: PinId) {
        self.visible = true;
        self.screen_pos = screen_pos;
        self.target = Some(MenuTarget::Pin(pin));
    }

    /// Opens the menu over an empty map position.
    pub fn open_for_ground(&mut self, screen_pos: Pos2, position: LatLng) {
        self.visible = true;
        self.screen_pos = screen_pos;
        self.target = Some(MenuTarget::Ground(position));
    }

    /// Closes the menu and forgets its target.
    pub fn close(&mut self) {
        self.visible = false;
        self.target = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_only_visible_while_open() {
        let mut menu = ContextMenuState::new();
        assert!(menu.target().is_none());

        menu.open_for_pin(Pos2::new(10.0, 20.0), 7);
        assert!(menu.is_open());
        assert_eq!(menu.target(), Some(MenuTarget::Pin(7)));

        menu.close();
        assert!(!menu.is_open());
        assert!(menu.target().is_none());
    }

    #[test]
    fn test_ground_target_keeps_position() {
        let mut menu = ContextMenuState::new();
        let pos = LatLng::new(37.5, 127.0);
        menu.open_for_ground(Pos2::new(5.0, 5.0), pos);
        assert_eq!(menu.target(), Some(MenuTarget::Ground(pos)));
    }
}
