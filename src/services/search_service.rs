//! Proximity search over available donations.
//!
//! SQLite narrows candidates to available donations inside a latitude band
//! around the origin; exact great-circle distances are then computed here
//! and filtered inclusively against the radius. The band is a superset of
//! the radius padded past the distance formula's rounding error, so results
//! are identical to a full scan.

use sqlx::{QueryBuilder, sqlite::Sqlite};
use tracing::debug;

use crate::models::{
    donation::{DonationWithDonor, NearbyDonation},
    status::DonationStatus,
};

use super::{
    DONATION_COLUMNS,
    database::Database,
    error::{ServiceError, ServiceResult},
    geo::{GeoPoint, haversine_km, latitude_band_deg},
};

pub const DEFAULT_RADIUS_KM: f64 = 10.0;
pub const DEFAULT_MAX_RESULTS: usize = 50;

/// Optional category filters. `None`, empty or `"all"` means unfiltered.
#[derive(Clone, Debug, Default)]
pub struct SearchFilters {
    pub food_type: Option<String>,
    pub freshness: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NearbyQuery {
    pub origin: GeoPoint,
    pub radius_km: Option<f64>,
    pub filters: SearchFilters,
    pub limit: Option<usize>,
}

impl NearbyQuery {
    pub fn new(origin: GeoPoint) -> Self {
        Self {
            origin,
            radius_km: None,
            filters: SearchFilters::default(),
            limit: None,
        }
    }

    pub fn radius_km(mut self, radius_km: f64) -> Self {
        self.radius_km = Some(radius_km);
        self
    }

    pub fn food_type(mut self, food_type: impl Into<String>) -> Self {
        self.filters.food_type = Some(food_type.into());
        self
    }

    pub fn freshness(mut self, freshness: impl Into<String>) -> Self {
        self.filters.freshness = Some(freshness.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Read-only proximity search. Safe to call concurrently.
#[derive(Clone, Debug)]
pub struct ProximitySearch {
    db: Database,
    default_radius_km: f64,
    max_results: usize,
}

impl ProximitySearch {
    pub fn new(db: Database, default_radius_km: f64, max_results: usize) -> Self {
        Self {
            db,
            default_radius_km,
            max_results: max_results.max(1),
        }
    }

    /// Available donations within the radius, nearest first, ties by id.
    pub async fn find_nearby(&self, query: &NearbyQuery) -> ServiceResult<Vec<NearbyDonation>> {
        let radius_km = query.radius_km.unwrap_or(self.default_radius_km);
        if !radius_km.is_finite() || radius_km < 0.0 {
            return Err(ServiceError::invalid(
                "radius_km",
                format!("{radius_km} must be a non-negative number"),
            ));
        }
        let limit = query
            .limit
            .unwrap_or(self.max_results)
            .clamp(1, self.max_results);

        let origin = query.origin;
        let band = latitude_band_deg(radius_km);

        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {DONATION_COLUMNS}, u.username AS donor_name, u.phone AS donor_phone \
             FROM donations d JOIN users u ON u.id = d.donor_id \
             WHERE d.status = "
        ));
        builder.push_bind(DonationStatus::Available);
        builder.push(" AND d.latitude BETWEEN ");
        builder.push_bind(origin.lat - band);
        builder.push(" AND ");
        builder.push_bind(origin.lat + band);

        if let Some(food_type) = normalize_filter(query.filters.food_type.as_deref()) {
            builder.push(" AND d.food_type = ");
            builder.push_bind(food_type);
        }
        if let Some(freshness) = normalize_filter(query.filters.freshness.as_deref()) {
            builder.push(" AND d.freshness = ");
            builder.push_bind(freshness);
        }

        let candidates: Vec<DonationWithDonor> =
            builder.build_query_as().fetch_all(self.db.reader()).await?;
        let scanned = candidates.len();

        let mut hits: Vec<NearbyDonation> = candidates
            .into_iter()
            .filter_map(|listing| {
                let location = GeoPoint {
                    lat: listing.donation.latitude,
                    lng: listing.donation.longitude,
                };
                let distance_km = haversine_km(origin, location);
                (distance_km <= radius_km).then_some(NearbyDonation {
                    listing,
                    distance_km,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance_km
                .total_cmp(&b.distance_km)
                .then(a.listing.donation.id.cmp(&b.listing.donation.id))
        });
        hits.truncate(limit);

        debug!(
            "nearby search at ({}, {}) r={}km scanned {} returned {}",
            origin.lat,
            origin.lng,
            radius_km,
            scanned,
            hits.len()
        );
        Ok(hits)
    }
}

/// Lowercase a category filter, treating blanks and `all` as absent.
pub(crate) fn normalize_filter(value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(value.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_filter() {
        assert_eq!(normalize_filter(None), None);
        assert_eq!(normalize_filter(Some("")), None);
        assert_eq!(normalize_filter(Some("ALL")), None);
        assert_eq!(normalize_filter(Some(" Cooked ")), Some("cooked".into()));
    }
}
