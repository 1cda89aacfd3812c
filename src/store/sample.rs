//! Deterministic synthetic pin source.
//!
//! Generates a reproducible set of listings scattered around a center
//! coordinate, useful for the demo host and for integration tests. The same
//! seed always yields the same pins, including a share of exact-duplicate
//! coordinates so stacks show up in every generated set.

use std::collections::HashSet;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geo::LatLng;
use crate::listing::{DealStatus, OwnerId, Pin, PinId};
use crate::traits::PinSource;

const DEFAULT_COUNT: usize = 120;
const DEFAULT_SEED: u64 = 42;

/// Spread of generated pins around the center, in degrees.
const SCATTER: f64 = 0.06;

/// Every n-th pin reuses the previous pin's exact coordinate, producing
/// same-building stacks.
const STACK_EVERY: usize = 6;

const BUILDING_NAMES: [&str; 5] = [
    "한강타워",
    "서강빌라",
    "목련아파트",
    "청담오피스텔",
    "은행나무주택",
];

const KEYWORDS: [&str; 6] = ["역세권", "신축", "풀옵션", "주차가능", "반려동물", "복층"];

/// A [`PinSource`] producing seeded synthetic listings.
///
/// Deletions are remembered, so a delete-then-refresh round trip behaves
/// like a real backend: the deleted pin is gone from the next fetch.
pub struct SamplePinSource {
    center: LatLng,
    count: usize,
    seed: u64,
    deleted: Mutex<HashSet<PinId>>,
}

impl SamplePinSource {
    /// Creates a source centered on Seoul with the default count and seed.
    pub fn new() -> Self {
        Self::with_config(LatLng::new(37.5665, 126.9780), DEFAULT_COUNT, DEFAULT_SEED)
    }

    /// Creates a source with explicit center, pin count, and seed.
    pub fn with_config(center: LatLng, count: usize, seed: u64) -> Self {
        Self {
            center,
            count,
            seed,
            deleted: Mutex::new(HashSet::new()),
        }
    }

    fn generate(&self) -> Vec<Pin> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut pins = Vec::with_capacity(self.count);
        let mut prev_coord = (self.center.lat, self.center.lng);

        for i in 0..self.count {
            let id = i as PinId + 1;
            let (lat, lng) = if i > 0 && i % STACK_EVERY == 0 {
                prev_coord
            } else {
                (
                    self.center.lat + rng.gen_range(-SCATTER..SCATTER),
                    self.center.lng + rng.gen_range(-SCATTER..SCATTER),
                )
            };
            prev_coord = (lat, lng);

            let status = match rng.gen_range(0..10) {
                0..=5 => DealStatus::PreDeal,
                6..=8 => DealStatus::InDeal,
                _ => DealStatus::Done,
            };
            let is_sale = rng.gen_bool(0.6);
            let is_jeonse = rng.gen_bool(0.4);
            // Every listing offers at least one deal type.
            let is_rent = (!is_sale && !is_jeonse) || rng.gen_bool(0.3);

            pins.push(Pin {
                id,
                lat,
                lng,
                status,
                is_sale,
                is_jeonse,
                is_rent,
                sale_price: is_sale.then(|| rng.gen_range(15..120) * 10_000_000),
                jeonse_deposit: is_jeonse.then(|| rng.gen_range(8..60) * 10_000_000),
                rent_deposit: is_rent.then(|| rng.gen_range(1..20) * 10_000_000),
                rent_monthly: is_rent.then(|| rng.gen_range(30..250) * 10_000),
                keywords: (0..rng.gen_range(0..3))
                    .map(|_| KEYWORDS[rng.gen_range(0..KEYWORDS.len())].to_string())
                    .collect(),
                building_name: format!(
                    "{} {}동",
                    BUILDING_NAMES[rng.gen_range(0..BUILDING_NAMES.len())],
                    rng.gen_range(101..120)
                ),
                title: None,
            });
        }
        pins
    }
}

impl Default for SamplePinSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PinSource for SamplePinSource {
    fn fetch_all(&self, _owner: OwnerId) -> anyhow::Result<Vec<Pin>> {
        let deleted = self.deleted.lock().unwrap();
        Ok(self
            .generate()
            .into_iter()
            .filter(|p| !deleted.contains(&p.id))
            .collect())
    }

    fn delete_by_id(&self, id: PinId) -> anyhow::Result<()> {
        self.deleted.lock().unwrap().insert(id);
        Ok(())
    }
}
