//! Renderable aggregation nodes and their deterministic identities.
//!
//! A [`Node`] is the unit the aggregator emits for one visual marker. Nodes
//! are transient: recomputed on every aggregation pass, never mutated in
//! place. What persists across passes is the [`NodeId`], a pure function of
//! membership, which is what lets the reconciler diff by identity instead of
//! rebuilding the overlay layer wholesale.

use crate::geo::{GeoBounds, LatLng};
use crate::listing::{Pin, PinId};

/// Deterministic identity of a node, derived from its membership.
///
/// - `Single` ids derive from the pin id,
/// - `Stack` ids derive from the exact coordinate bits (membership at one
///   coordinate is fixed, so the coordinate is the membership key),
/// - `Cluster` ids derive from the sorted member pin ids.
///
/// Two aggregation runs with unchanged membership therefore emit identical
/// ids, regardless of iteration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(String);

impl NodeId {
    /// Id for a single-pin node.
    pub fn single(pin: PinId) -> Self {
        Self(format!("pin:{}", pin))
    }

    /// Id for a same-coordinate stack, keyed by exact coordinate bits.
    pub fn stack(lat: f64, lng: f64) -> Self {
        Self(format!("stack:{:x}:{:x}", lat.to_bits(), lng.to_bits()))
    }

    /// Id for a proximity cluster, keyed by sorted member pin ids.
    pub fn cluster(members: &[PinId]) -> Self {
        let mut sorted: Vec<PinId> = members.to_vec();
        sorted.sort_unstable();
        let joined = sorted
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join("-");
        Self(format!("cluster:{}", joined))
    }

    /// Returns the id as a string key (usable as an overlay key on the SDK side).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Discriminant of a node, used for anchors and visual signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Single,
    Stack,
    Cluster,
}

/// One renderable unit emitted by the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Exactly one pin, no other pin shares its coordinate
    Single {
        id: NodeId,
        lat: f64,
        lng: f64,
        pin: Pin,
    },
    /// Two or more pins sharing bitwise-identical coordinates
    Stack {
        id: NodeId,
        lat: f64,
        lng: f64,
        items: Vec<Pin>,
        title: Option<String>,
    },
    /// Two or more stacks/singles merged by screen-space proximity;
    /// `lat`/`lng` is the arithmetic-mean centroid of the member pins
    Cluster {
        id: NodeId,
        lat: f64,
        lng: f64,
        items: Vec<Pin>,
    },
}

impl Node {
    /// Returns the node's identity.
    pub fn id(&self) -> &NodeId {
        match self {
            Node::Single { id, .. } | Node::Stack { id, .. } | Node::Cluster { id, .. } => id,
        }
    }

    /// Returns the node's kind discriminant.
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Single { .. } => NodeKind::Single,
            Node::Stack { .. } => NodeKind::Stack,
            Node::Cluster { .. } => NodeKind::Cluster,
        }
    }

    /// Returns the node's render position (centroid for clusters).
    pub fn position(&self) -> LatLng {
        match self {
            Node::Single { lat, lng, .. }
            | Node::Stack { lat, lng, .. }
            | Node::Cluster { lat, lng, .. } => LatLng::new(*lat, *lng),
        }
    }

    /// Returns the number of member pins.
    pub fn member_count(&self) -> usize {
        match self {
            Node::Single { .. } => 1,
            Node::Stack { items, .. } | Node::Cluster { items, .. } => items.len(),
        }
    }

    /// Returns the member pin ids.
    pub fn member_ids(&self) -> Vec<PinId> {
        match self {
            Node::Single { pin, .. } => vec![pin.id],
            Node::Stack { items, .. } | Node::Cluster { items, .. } => {
                items.iter().map(|p| p.id).collect()
            }
        }
    }

    /// Returns true if the given pin is a member of this node.
    pub fn contains_pin(&self, pin: PinId) -> bool {
        match self {
            Node::Single { pin: p, .. } => p.id == pin,
            Node::Stack { items, .. } | Node::Cluster { items, .. } => {
                items.iter().any(|p| p.id == pin)
            }
        }
    }

    /// Returns the representative pin: the single pin, or the first member.
    pub fn primary_pin(&self) -> &Pin {
        match self {
            Node::Single { pin, .. } => pin,
            Node::Stack { items, .. } | Node::Cluster { items, .. } => &items[0],
        }
    }

    /// Returns the tightest geographic bounds enclosing all member pins.
    pub fn member_bounds(&self) -> GeoBounds {
        match self {
            Node::Single { lat, lng, .. } | Node::Stack { lat, lng, .. } => {
                GeoBounds::new(*lat, *lng, *lat, *lng)
            }
            Node::Cluster { items, .. } => {
                GeoBounds::from_positions(items.iter().map(|p| p.position()))
                    .expect("cluster nodes always have members")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_id_ignores_member_order() {
        let a = NodeId::cluster(&[3, 1, 2]);
        let b = NodeId::cluster(&[2, 3, 1]);
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "cluster:1-2-3");
    }

    #[test]
    fn test_stack_id_is_coordinate_exact() {
        let a = NodeId::stack(37.50, 127.00);
        let b = NodeId::stack(37.50, 127.00);
        let c = NodeId::stack(37.50 + f64::EPSILON, 127.00);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
