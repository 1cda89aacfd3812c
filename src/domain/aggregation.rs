//! Spatial aggregation: pins → renderable nodes for one zoom/viewport.
//!
//! This module provides the pure aggregation function at the heart of the
//! engine:
//! - viewport culling, padded by one cluster radius to avoid edge pop-in
//! - stacking of pins with bitwise-identical coordinates
//! - grid-bucket proximity clustering in Web Mercator pixel space, with
//!   transitive merging via union-find
//!
//! `aggregate` is deterministic for fixed inputs and has no side effects
//! beyond warning about pins with non-finite coordinates.

use std::collections::HashMap;

use log::warn;

use crate::domain::node::{Node, NodeId};
use crate::geo::{self, GeoBounds};
use crate::listing::Pin;

/// Screen-space merge radius in pixels. Two candidates closer than this at
/// the current zoom join one cluster. Matches a typical marker glyph
/// footprint, and doubles as the viewport culling pad.
pub const CLUSTER_RADIUS_PX: f64 = 40.0;

/// A stack candidate: all pins sharing one exact coordinate.
struct Candidate {
    lat: f64,
    lng: f64,
    pins: Vec<Pin>,
}

/// Converts a flat pin set into renderable nodes for the given view.
///
/// # Arguments
/// * `pins` - All pins of the current owner; culled against `bounds`
/// * `zoom` - Zoom level driving pixel-space distances
/// * `bounds` - Current viewport bounds; culling pads them by one cluster
///   radius so nodes near the edge don't pop in and out while panning
///
/// # Returns
/// Nodes partitioning the retained pins: every retained pin appears in
/// exactly one node. Output order is deterministic but not meaningful;
/// consumers must diff by node id, not by position in the list.
///
/// Empty input yields an empty list. Degenerate (zero-size) bounds behave as
/// a point window plus padding. Pins with non-finite coordinates are dropped
/// with a warning.
pub fn aggregate(pins: &[Pin], zoom: f64, bounds: &GeoBounds) -> Vec<Node> {
    let visible = cull_pins(pins, zoom, bounds);
    if visible.is_empty() {
        return Vec::new();
    }

    let candidates = stack_candidates(visible);
    let groups = merge_by_proximity(&candidates, zoom);
    build_nodes(candidates, groups)
}

/// Retains pins inside the padded viewport, dropping invalid coordinates.
fn cull_pins(pins: &[Pin], zoom: f64, bounds: &GeoBounds) -> Vec<Pin> {
    let window = geo::padded_bounds(bounds, CLUSTER_RADIUS_PX, zoom);
    pins.iter()
        .filter(|pin| {
            if !pin.has_valid_position() {
                warn!("pin {} has non-finite coordinates, excluded from aggregation", pin.id);
                return false;
            }
            window.contains(pin.position())
        })
        .cloned()
        .collect()
}

/// Groups pins by bitwise-identical coordinates into stack candidates.
///
/// Stacking is coordinate-exact and zoom-independent: pins differing by any
/// epsilon land in different candidates. Candidates are sorted by coordinate
/// bits so later stages iterate in a deterministic order.
fn stack_candidates(pins: Vec<Pin>) -> Vec<Candidate> {
    let mut by_coord: HashMap<(u64, u64), Vec<Pin>> = HashMap::new();
    for pin in pins {
        by_coord
            .entry((pin.lat.to_bits(), pin.lng.to_bits()))
            .or_default()
            .push(pin);
    }

    let mut entries: Vec<((u64, u64), Vec<Pin>)> = by_coord.into_iter().collect();
    entries.sort_unstable_by_key(|(key, _)| *key);

    entries
        .into_iter()
        .map(|(_, mut pins)| {
            pins.sort_unstable_by_key(|p| p.id);
            Candidate {
                lat: pins[0].lat,
                lng: pins[0].lng,
                pins,
            }
        })
        .collect()
}

/// Merges candidates whose pixel distance at `zoom` falls below the cluster
/// radius. Returns one group (list of candidate indices) per merged set.
///
/// Buckets candidates into a pixel-space grid with cell size equal to the
/// merge radius, then distance-checks only the 3×3 cell neighborhood; merges
/// are transitive through union-find. Grid cells shrink in geographic extent
/// as zoom rises, which is what makes cluster membership monotone in zoom.
fn merge_by_proximity(candidates: &[Candidate], zoom: f64) -> Vec<Vec<usize>> {
    let positions: Vec<(f64, f64)> = candidates
        .iter()
        .map(|c| geo::project_world(geo::LatLng::new(c.lat, c.lng), zoom))
        .collect();

    let mut cells: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (idx, (x, y)) in positions.iter().enumerate() {
        let cell = (
            (x / CLUSTER_RADIUS_PX).floor() as i64,
            (y / CLUSTER_RADIUS_PX).floor() as i64,
        );
        cells.entry(cell).or_default().push(idx);
    }

    let mut uf = UnionFind::new(candidates.len());
    for (idx, (x, y)) in positions.iter().enumerate() {
        let cx = (x / CLUSTER_RADIUS_PX).floor() as i64;
        let cy = (y / CLUSTER_RADIUS_PX).floor() as i64;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(neighbors) = cells.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &other in neighbors {
                    if other <= idx {
                        continue;
                    }
                    let (ox, oy) = positions[other];
                    let dist = ((x - ox).powi(2) + (y - oy).powi(2)).sqrt();
                    if dist < CLUSTER_RADIUS_PX {
                        uf.union(idx, other);
                    }
                }
            }
        }
    }

    // Group candidate indices by union-find root, keyed by first appearance
    // so group order follows candidate order.
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut root_to_group: HashMap<usize, usize> = HashMap::new();
    for idx in 0..candidates.len() {
        let root = uf.find(idx);
        match root_to_group.get(&root) {
            Some(&g) => groups[g].push(idx),
            None => {
                root_to_group.insert(root, groups.len());
                groups.push(vec![idx]);
            }
        }
    }
    groups
}

/// Materializes nodes from candidates and their merge groups.
fn build_nodes(candidates: Vec<Candidate>, groups: Vec<Vec<usize>>) -> Vec<Node> {
    let mut candidates: Vec<Option<Candidate>> = candidates.into_iter().map(Some).collect();
    let mut nodes = Vec::with_capacity(groups.len());

    for group in groups {
        if group.len() == 1 {
            let candidate = candidates[group[0]].take().expect("each candidate consumed once");
            nodes.push(lone_candidate_node(candidate));
        } else {
            let members: Vec<Pin> = group
                .into_iter()
                .flat_map(|idx| {
                    candidates[idx]
                        .take()
                        .expect("each candidate consumed once")
                        .pins
                })
                .collect();
            nodes.push(cluster_node(members));
        }
    }
    nodes
}

/// Builds the node for a candidate that merged with nothing: a Single for
/// one pin, a Stack for several pins at the same coordinate.
fn lone_candidate_node(candidate: Candidate) -> Node {
    let Candidate { lat, lng, mut pins } = candidate;
    if pins.len() == 1 {
        let pin = pins.remove(0);
        Node::Single {
            id: NodeId::single(pin.id),
            lat,
            lng,
            pin,
        }
    } else {
        let title = pins
            .iter()
            .map(|p| p.building_name.clone())
            .find(|name| !name.is_empty());
        Node::Stack {
            id: NodeId::stack(lat, lng),
            lat,
            lng,
            items: pins,
            title,
        }
    }
}

/// Builds a cluster node: centroid is the arithmetic mean of member pin
/// coordinates, id derives from the sorted member ids.
fn cluster_node(members: Vec<Pin>) -> Node {
    let count = members.len() as f64;
    let lat = members.iter().map(|p| p.lat).sum::<f64>() / count;
    let lng = members.iter().map(|p| p.lng).sum::<f64>() / count;
    let ids: Vec<_> = members.iter().map(|p| p.id).collect();
    Node::Cluster {
        id: NodeId::cluster(&ids),
        lat,
        lng,
        items: members,
    }
}

/// Union-find over candidate indices with path compression.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::NodeKind;
    use crate::listing::{DealStatus, Pin};
    use std::collections::HashSet;

    fn pin(id: u64, lat: f64, lng: f64) -> Pin {
        Pin {
            id,
            lat,
            lng,
            status: DealStatus::PreDeal,
            is_sale: true,
            is_jeonse: false,
            is_rent: false,
            sale_price: Some(100_000_000),
            jeonse_deposit: None,
            rent_deposit: None,
            rent_monthly: None,
            keywords: Vec::new(),
            building_name: format!("B{}", id),
            title: None,
        }
    }

    fn wide_bounds() -> GeoBounds {
        GeoBounds::new(30.0, 120.0, 45.0, 135.0)
    }

    fn member_id_set(nodes: &[Node]) -> HashSet<u64> {
        nodes.iter().flat_map(|n| n.member_ids()).collect()
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(aggregate(&[], 12.0, &wide_bounds()).is_empty());
    }

    #[test]
    fn test_identical_coordinates_always_stack() {
        let pins = vec![pin(1, 37.50, 127.00), pin(2, 37.50, 127.00)];
        for zoom in [3.0, 10.0, 18.0] {
            let nodes = aggregate(&pins, zoom, &wide_bounds());
            assert_eq!(nodes.len(), 1, "zoom {}", zoom);
            assert_eq!(nodes[0].kind(), NodeKind::Stack);
            assert_eq!(nodes[0].member_count(), 2);
        }
    }

    #[test]
    fn test_epsilon_apart_never_stacks() {
        let near = 37.50_f64 + 1e-12;
        let pins = vec![pin(1, 37.50, 127.00), pin(2, near, 127.00)];
        // Pixel-close, so they may cluster, but a Stack must never form.
        for zoom in [6.0, 14.0, 22.0] {
            let nodes = aggregate(&pins, zoom, &wide_bounds());
            assert!(
                nodes.iter().all(|n| n.kind() != NodeKind::Stack),
                "epsilon-apart pins stacked at zoom {}",
                zoom
            );
            assert_eq!(member_id_set(&nodes), HashSet::from([1, 2]));
        }
    }

    #[test]
    fn test_low_zoom_merges_high_zoom_splits() {
        // Spec scenario: 1-2 stacked, 3 far; at low zoom all three cluster,
        // at high zoom the stack survives and 3 becomes a single.
        let pins = vec![
            pin(1, 37.50, 127.00),
            pin(2, 37.50, 127.00),
            pin(3, 37.80, 127.30),
        ];

        let low = aggregate(&pins, 3.0, &wide_bounds());
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].kind(), NodeKind::Cluster);
        assert_eq!(low[0].member_count(), 3);

        let high = aggregate(&pins, 14.0, &wide_bounds());
        assert_eq!(high.len(), 2);
        let kinds: Vec<_> = high.iter().map(|n| n.kind()).collect();
        assert!(kinds.contains(&NodeKind::Stack));
        assert!(kinds.contains(&NodeKind::Single));
    }

    #[test]
    fn test_partition_invariant() {
        let pins = vec![
            pin(1, 37.500, 127.000),
            pin(2, 37.500, 127.000),
            pin(3, 37.501, 127.001),
            pin(4, 37.520, 127.040),
            pin(5, 37.800, 127.300),
        ];
        for zoom in [4.0, 9.0, 13.0, 17.0] {
            let nodes = aggregate(&pins, zoom, &wide_bounds());
            let mut seen = Vec::new();
            for node in &nodes {
                seen.extend(node.member_ids());
            }
            let unique: HashSet<_> = seen.iter().copied().collect();
            assert_eq!(seen.len(), unique.len(), "no pin in two nodes at zoom {}", zoom);
            assert_eq!(unique, member_id_set(&nodes));
            assert_eq!(unique, (1..=5).collect::<HashSet<_>>(), "zoom {}", zoom);
        }
    }

    #[test]
    fn test_deterministic_ids_across_runs() {
        let pins: Vec<Pin> = (0..40)
            .map(|i| pin(i, 37.50 + (i % 7) as f64 * 0.001, 127.00 + (i % 5) as f64 * 0.001))
            .collect();
        let first = aggregate(&pins, 11.0, &wide_bounds());
        let second = aggregate(&pins, 11.0, &wide_bounds());

        let ids_a: HashSet<String> = first.iter().map(|n| n.id().as_str().to_string()).collect();
        let ids_b: HashSet<String> = second.iter().map(|n| n.id().as_str().to_string()).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn test_cluster_monotonicity_in_zoom() {
        let pins: Vec<Pin> = (0..10)
            .map(|i| pin(i, 37.50 + i as f64 * 0.002, 127.00 + i as f64 * 0.002))
            .collect();

        let mut prev_max = usize::MAX;
        for zoom in [4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0, 18.0] {
            let nodes = aggregate(&pins, zoom, &wide_bounds());
            let max_members = nodes.iter().map(|n| n.member_count()).max().unwrap();
            assert!(
                max_members <= prev_max,
                "zooming in must not grow clusters (zoom {})",
                zoom
            );
            prev_max = max_members;
        }
        // At sufficient zoom every cluster has split apart.
        let deep = aggregate(&pins, 20.0, &wide_bounds());
        assert_eq!(deep.len(), 10);
        assert!(deep.iter().all(|n| n.kind() == NodeKind::Single));
    }

    #[test]
    fn test_transitive_merge_chains_into_one_cluster() {
        // At zoom 14 one step is ~35 px (within radius) and two steps ~70 px
        // (beyond it): A-B and B-C merge, and A-C must join transitively.
        let step = 0.003;
        let pins = vec![
            pin(1, 37.5000, 127.0000),
            pin(2, 37.5000, 127.0000 + step),
            pin(3, 37.5000, 127.0000 + 2.0 * step),
        ];
        let nodes = aggregate(&pins, 14.0, &wide_bounds());
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].member_count(), 3);
    }

    #[test]
    fn test_cluster_centroid_is_member_mean() {
        let pins = vec![pin(1, 37.500, 127.000), pin(2, 37.502, 127.002)];
        let nodes = aggregate(&pins, 10.0, &wide_bounds());
        assert_eq!(nodes.len(), 1);
        let pos = nodes[0].position();
        assert!((pos.lat - 37.501).abs() < 1e-9);
        assert!((pos.lng - 127.001).abs() < 1e-9);
    }

    #[test]
    fn test_nan_pins_excluded_without_panic() {
        let mut bad = pin(9, f64::NAN, 127.0);
        bad.lng = f64::INFINITY;
        let pins = vec![pin(1, 37.50, 127.00), bad];
        let nodes = aggregate(&pins, 12.0, &wide_bounds());
        assert_eq!(member_id_set(&nodes), HashSet::from([1]));
    }

    #[test]
    fn test_viewport_culling_is_padded() {
        let bounds = GeoBounds::new(37.40, 126.90, 37.60, 127.10);
        let inside = pin(1, 37.50, 127.00);
        let far_outside = pin(2, 38.50, 128.00);
        // Just past the east edge, inside the one-radius pad at this zoom.
        let just_outside = pin(3, 37.50, 127.10 + geo::lng_degrees_per_pixel(12.0) * 10.0);

        let nodes = aggregate(&[inside, far_outside, just_outside], 12.0, &bounds);
        let ids = member_id_set(&nodes);
        assert!(ids.contains(&1));
        assert!(ids.contains(&3), "edge pin within pad must be retained");
        assert!(!ids.contains(&2));
    }

    #[test]
    fn test_degenerate_bounds_do_not_panic() {
        let point = GeoBounds::new(37.50, 127.00, 37.50, 127.00);
        let pins = vec![pin(1, 37.50, 127.00), pin(2, 39.0, 129.0)];
        let nodes = aggregate(&pins, 12.0, &point);
        assert_eq!(member_id_set(&nodes), HashSet::from([1]));
    }
}
