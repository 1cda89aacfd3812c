//! Property listing records ("pins") and their deal metadata.
//!
//! A [`Pin`] is one geolocated property record owned by the pin store. The
//! engine only ever reads identity fields (`id`, `lat`, `lng`); records are
//! created and destroyed exclusively through the external persistence
//! collaborator.

use serde::{Deserialize, Serialize};

use crate::geo::LatLng;

/// Type alias for pin IDs (stable keys assigned by the persistence service)
pub type PinId = u64;

/// Type alias for the owning user's ID
pub type OwnerId = u64;

/// Progress of the deal attached to a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    /// Listed, no deal in motion yet
    PreDeal,
    /// A deal is being negotiated
    InDeal,
    /// Deal closed
    Done,
}

/// A single geolocated property record.
///
/// Transaction-type flags are not mutually exclusive: a unit can be offered
/// for sale and for rent at the same time. Each flag has a matching optional
/// price field; a set flag with a missing price is rendered as explicitly
/// unpriced rather than omitted (see `presentation::summary`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub id: PinId,
    pub lat: f64,
    pub lng: f64,
    pub status: DealStatus,

    pub is_sale: bool,
    pub is_jeonse: bool,
    pub is_rent: bool,

    /// Sale price in won
    #[serde(default)]
    pub sale_price: Option<u64>,
    /// Jeonse (lump-sum lease) deposit in won
    #[serde(default)]
    pub jeonse_deposit: Option<u64>,
    /// Monthly-rent deposit in won
    #[serde(default)]
    pub rent_deposit: Option<u64>,
    /// Monthly rent in won
    #[serde(default)]
    pub rent_monthly: Option<u64>,

    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub building_name: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl Pin {
    /// Returns the pin's geographic position.
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    /// Returns true if both coordinates are finite numbers.
    ///
    /// Pins failing this check are excluded from aggregation with a warning
    /// rather than propagated as errors.
    pub fn has_valid_position(&self) -> bool {
        self.position().is_finite()
    }

    /// Returns true if at least one transaction-type flag is set.
    pub fn has_deal_kind(&self) -> bool {
        self.is_sale || self.is_jeonse || self.is_rent
    }

    /// Returns the display name: explicit title first, building name second.
    pub fn display_name(&self) -> &str {
        match &self.title {
            Some(t) if !t.is_empty() => t,
            _ => &self.building_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pin() -> Pin {
        Pin {
            id: 1,
            lat: 37.5665,
            lng: 126.9780,
            status: DealStatus::PreDeal,
            is_sale: true,
            is_jeonse: false,
            is_rent: false,
            sale_price: Some(320_000_000),
            jeonse_deposit: None,
            rent_deposit: None,
            rent_monthly: None,
            keywords: vec!["renovated".to_string()],
            building_name: "Hangang Tower".to_string(),
            title: None,
        }
    }

    #[test]
    fn test_display_name_falls_back_to_building() {
        let mut pin = sample_pin();
        assert_eq!(pin.display_name(), "Hangang Tower");
        pin.title = Some("Corner unit".to_string());
        assert_eq!(pin.display_name(), "Corner unit");
        pin.title = Some(String::new());
        assert_eq!(pin.display_name(), "Hangang Tower");
    }

    #[test]
    fn test_invalid_position_detected() {
        let mut pin = sample_pin();
        assert!(pin.has_valid_position());
        pin.lat = f64::NAN;
        assert!(!pin.has_valid_position());
    }

    #[test]
    fn test_serde_roundtrip_with_missing_optionals() {
        let json = r#"{
            "id": 7,
            "lat": 37.5,
            "lng": 127.0,
            "status": "in_deal",
            "is_sale": false,
            "is_jeonse": true,
            "is_rent": false,
            "jeonse_deposit": 150000000
        }"#;
        let pin: Pin = serde_json::from_str(json).unwrap();
        assert_eq!(pin.status, DealStatus::InDeal);
        assert_eq!(pin.jeonse_deposit, Some(150_000_000));
        assert!(pin.sale_price.is_none());
        assert!(pin.keywords.is_empty());
        assert_eq!(pin.building_name, "");
    }
}
