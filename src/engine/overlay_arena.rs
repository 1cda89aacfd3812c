//! Owned collection of live overlay handles.
//!
//! The arena binds node ids to native overlay objects plus the cached
//! visual-state signature of their last written content. It is an explicit
//! owned collection passed through the reconciler's interface, never ambient
//! state, so every overlay the engine has created is reachable from exactly
//! one place.

use std::collections::HashMap;

use crate::domain::{NodeId, NodeKind};
use crate::traits::{MapSurface, OverlayId};

/// Reconciler-owned record binding a node id to a live overlay object.
#[derive(Debug, Clone)]
pub struct OverlayHandle {
    /// Surface-assigned overlay object id
    pub overlay: OverlayId,
    /// Kind of the node the overlay renders
    pub kind: NodeKind,
    /// Visual-state signature of the last content write
    pub signature: String,
}

/// Arena of overlay handles keyed by node id, 1:1 with displayed nodes.
#[derive(Debug, Default)]
pub struct OverlayArena {
    handles: HashMap<NodeId, OverlayHandle>,
}

impl OverlayArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            handles: HashMap::new(),
        }
    }

    /// Returns the number of live handles.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns true if no handles are live.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Returns the handle for a node id, if present.
    pub fn get(&self, id: &NodeId) -> Option<&OverlayHandle> {
        self.handles.get(id)
    }

    /// Returns a mutable handle for a node id, if present.
    pub fn get_mut(&mut self, id: &NodeId) -> Option<&mut OverlayHandle> {
        self.handles.get_mut(id)
    }

    /// Returns true if a handle exists for the node id.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.handles.contains_key(id)
    }

    /// Inserts a handle for a node id.
    pub fn insert(&mut self, id: NodeId, handle: OverlayHandle) {
        self.handles.insert(id, handle);
    }

    /// Removes and returns the handle for a node id.
    pub fn remove(&mut self, id: &NodeId) -> Option<OverlayHandle> {
        self.handles.remove(id)
    }

    /// Returns the ids of all live handles.
    pub fn ids(&self) -> Vec<NodeId> {
        self.handles.keys().cloned().collect()
    }

    /// Reverse lookup: the node id rendered by the given overlay object.
    ///
    /// Hosts use this to translate surface hit-test results back into node
    /// events.
    pub fn node_for_overlay(&self, overlay: OverlayId) -> Option<&NodeId> {
        self.handles
            .iter()
            .find(|(_, handle)| handle.overlay == overlay)
            .map(|(id, _)| id)
    }

    /// Clears every cached signature, forcing the next reconciliation pass
    /// to rewrite all content (used when the palette itself changes).
    pub fn reset_signatures(&mut self) {
        for handle in self.handles.values_mut() {
            handle.signature.clear();
        }
    }

    /// Destroys every live overlay on the surface and empties the arena.
    pub fn clear_all(&mut self, surface: &mut dyn MapSurface) {
        for (_, handle) in self.handles.drain() {
            surface.destroy_overlay(handle.overlay);
        }
    }
}
