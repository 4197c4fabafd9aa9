//! Delivery zones and fee calculation.
//!
//! A zone is either flat-priced or priced by road-free great-circle distance
//! between the store and the destination, looked up in a step table plus a
//! per-zone surcharge. One canonical catalog is injected everywhere so the
//! price table cannot drift between call sites.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::value_objects::Money;

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    fn in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PricingMode {
    /// One immutable price, coordinates ignored.
    Fixed { amount: Decimal },
    /// Step-table price by haversine distance, plus a flat surcharge.
    Distance { extra_fee: Decimal },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeliveryZone {
    pub id: String,
    pub label: String,
    pub pricing: PricingMode,
}

/// A computed quote. `distance_km` is present only for distance-priced zones,
/// so "fee not derived from GPS" is distinguishable from a zero distance.
#[derive(Clone, Debug, Serialize)]
pub struct FeeQuote {
    pub fee: Money,
    pub distance_km: Option<f64>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("unknown delivery zone: {0}")]
    UnknownZone(String),

    #[error("distance-priced zone requires both store and destination coordinates")]
    MissingCoordinates,

    #[error("coordinates outside valid latitude/longitude range")]
    CoordinatesOutOfRange,
}

impl DeliveryZone {
    pub fn fixed(id: &str, label: &str, amount: Decimal) -> Self {
        Self { id: id.into(), label: label.into(), pricing: PricingMode::Fixed { amount } }
    }

    pub fn by_distance(id: &str, label: &str, extra_fee: Decimal) -> Self {
        Self { id: id.into(), label: label.into(), pricing: PricingMode::Distance { extra_fee } }
    }

    /// Prices a delivery to this zone. Distance-priced zones require both
    /// points; an absent point is an error, never a free delivery.
    pub fn quote(
        &self,
        store: Option<GeoPoint>,
        destination: Option<GeoPoint>,
    ) -> Result<FeeQuote, DeliveryError> {
        match &self.pricing {
            PricingMode::Fixed { amount } => {
                Ok(FeeQuote { fee: Money::brl(*amount), distance_km: None })
            }
            PricingMode::Distance { extra_fee } => {
                let (store, destination) = match (store, destination) {
                    (Some(s), Some(d)) => (s, d),
                    _ => return Err(DeliveryError::MissingCoordinates),
                };
                if !store.in_range() || !destination.in_range() {
                    return Err(DeliveryError::CoordinatesOutOfRange);
                }
                let km = haversine_km(store, destination);
                let fee = distance_to_cost(km) + extra_fee;
                Ok(FeeQuote { fee: Money::brl(fee), distance_km: Some(km) })
            }
        }
    }
}

/// Great-circle distance in kilometers between two points.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Distance-to-cost step table. Total over `[0, ∞)`; distances at or beyond
/// the last breakpoint cost the 28.00 fallback.
pub fn distance_to_cost(km: f64) -> Decimal {
    if km <= 3.0 {
        dec!(8.00)
    } else if km <= 5.0 {
        dec!(9.00)
    } else if km <= 6.0 {
        dec!(10.00)
    } else if km < 7.0 {
        dec!(11.00)
    } else if km < 8.0 {
        dec!(12.00)
    } else if km < 9.0 {
        dec!(13.00)
    } else if km < 10.0 {
        dec!(14.00)
    } else if km < 11.0 {
        dec!(15.00)
    } else if km < 12.0 {
        dec!(16.00)
    } else if km < 13.0 {
        dec!(18.00)
    } else if km < 14.0 {
        dec!(20.00)
    } else if km < 15.0 {
        dec!(22.00)
    } else if km < 16.0 {
        dec!(24.00)
    } else if km < 17.0 {
        dec!(26.00)
    } else {
        dec!(28.00)
    }
}

/// The closed zone list, known at build time. Replaces the original's two
/// divergent per-screen copies with a single source of truth.
#[derive(Clone, Debug)]
pub struct ZoneCatalog {
    zones: Vec<DeliveryZone>,
}

impl ZoneCatalog {
    pub fn new(zones: Vec<DeliveryZone>) -> Self {
        Self { zones }
    }

    pub fn zones(&self) -> &[DeliveryZone] {
        &self.zones
    }

    pub fn find(&self, id: &str) -> Result<&DeliveryZone, DeliveryError> {
        self.zones
            .iter()
            .find(|z| z.id == id)
            .ok_or_else(|| DeliveryError::UnknownZone(id.to_string()))
    }
}

impl Default for ZoneCatalog {
    fn default() -> Self {
        Self::new(vec![
            DeliveryZone::fixed("centro", "Centro", dec!(8.00)),
            DeliveryZone::fixed("taquaralto", "Taquaralto", dec!(15.00)),
            DeliveryZone::fixed("luzimangues", "Luzimangues", dec!(35.00)),
            DeliveryZone::by_distance("gps", "Demais regiões (GPS)", dec!(0.00)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORE: GeoPoint = GeoPoint { lat: -10.1846, lng: -48.3336 };

    /// A point `km` kilometers due north of `from` (1 degree lat ≈ 111.19 km
    /// on a 6371 km sphere).
    fn north_of(from: GeoPoint, km: f64) -> GeoPoint {
        let deg = km / (EARTH_RADIUS_KM * std::f64::consts::PI / 180.0);
        GeoPoint::new(from.lat + deg, from.lng)
    }

    #[test]
    fn fixed_zone_ignores_coordinates() {
        let zone = DeliveryZone::fixed("z", "Z", dec!(35.00));
        let q = zone.quote(Some(STORE), Some(north_of(STORE, 50.0))).unwrap();
        assert_eq!(q.fee.amount(), dec!(35.00));
        assert_eq!(q.distance_km, None);
        let q = zone.quote(None, None).unwrap();
        assert_eq!(q.fee.amount(), dec!(35.00));
    }

    #[test]
    fn distance_zone_requires_both_points() {
        let zone = DeliveryZone::by_distance("gps", "GPS", dec!(0));
        assert_eq!(zone.quote(Some(STORE), None).unwrap_err(), DeliveryError::MissingCoordinates);
        assert_eq!(zone.quote(None, Some(STORE)).unwrap_err(), DeliveryError::MissingCoordinates);
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let zone = DeliveryZone::by_distance("gps", "GPS", dec!(0));
        let bad = GeoPoint::new(91.0, 0.0);
        assert_eq!(zone.quote(Some(bad), Some(STORE)).unwrap_err(), DeliveryError::CoordinatesOutOfRange);
        let bad = GeoPoint::new(0.0, 181.0);
        assert_eq!(zone.quote(Some(STORE), Some(bad)).unwrap_err(), DeliveryError::CoordinatesOutOfRange);
    }

    #[test]
    fn step_table_breakpoints() {
        assert_eq!(distance_to_cost(0.0), dec!(8.00));
        assert_eq!(distance_to_cost(3.0), dec!(8.00));
        assert_eq!(distance_to_cost(3.01), dec!(9.00));
        assert_eq!(distance_to_cost(5.0), dec!(9.00));
        assert_eq!(distance_to_cost(6.0), dec!(10.00));
        assert_eq!(distance_to_cost(6.01), dec!(11.00));
        assert_eq!(distance_to_cost(7.0), dec!(12.00));
        assert_eq!(distance_to_cost(12.5), dec!(18.00));
        assert_eq!(distance_to_cost(16.5), dec!(26.00));
        assert_eq!(distance_to_cost(17.0), dec!(28.00));
        assert_eq!(distance_to_cost(20.0), dec!(28.00));
        assert_eq!(distance_to_cost(1000.0), dec!(28.00));
    }

    #[test]
    fn haversine_zero_for_identical_points() {
        assert_eq!(haversine_km(STORE, STORE), 0.0);
        let zone = DeliveryZone::by_distance("gps", "GPS", dec!(0));
        let q = zone.quote(Some(STORE), Some(STORE)).unwrap();
        assert_eq!(q.fee.amount(), dec!(8.00));
        assert_eq!(q.distance_km, Some(0.0));
    }

    #[test]
    fn haversine_matches_known_displacement() {
        let km = haversine_km(STORE, north_of(STORE, 10.0));
        assert!((km - 10.0).abs() < 0.01, "got {km}");
    }

    #[test]
    fn extra_fee_is_additive() {
        let zone = DeliveryZone::by_distance("gps", "GPS", dec!(2.00));
        let q = zone.quote(Some(STORE), Some(north_of(STORE, 1.0))).unwrap();
        assert_eq!(q.fee.amount(), dec!(10.00));
    }

    #[test]
    fn catalog_lookup() {
        let catalog = ZoneCatalog::default();
        assert!(catalog.find("centro").is_ok());
        assert_eq!(catalog.find("nope").unwrap_err(), DeliveryError::UnknownZone("nope".into()));
        let mut ids: Vec<_> = catalog.zones().iter().map(|z| z.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog.zones().len());
    }
}
