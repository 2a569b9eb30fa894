//! Backend query construction.
//!
//! Builds the two request bodies the service sends to the search backend:
//!
//! ```text
//! Listing:  {"size": 10, "from": 20}
//! Geo:      {"size": 3, "sort": {"_geo_distance": {"location": {"lat": .., "lon": ..},
//!            "order": "asc", "unit": "km", "mode": "min",
//!            "ignore_unmapped": true, "distance_type": "arc"}}}
//! ```

use serde::Serialize;

use crate::error::ValidationError;

// =============================================================================
// Constants
// =============================================================================

/// Number of places returned by a nearest-place query.
pub const RECOMMENDATION_LIMIT: u64 = 3;

/// Valid latitude range in degrees.
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);

/// Valid longitude range in degrees.
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

// =============================================================================
// GeoPoint
// =============================================================================

/// A WGS84 coordinate.
///
/// Serializes as `{"lat": .., "lon": ..}`, the shape the backend expects for
/// geo points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    #[serde(rename = "lat")]
    pub latitude: f64,

    #[serde(rename = "lon")]
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check that both coordinates lie in their valid ranges.
    ///
    /// NaN is rejected since it is contained in no range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range("lat", self.latitude, LATITUDE_RANGE)?;
        check_range("lon", self.longitude, LONGITUDE_RANGE)
    }
}

fn check_range(
    param: &'static str,
    value: f64,
    (min, max): (f64, f64),
) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::CoordinateOutOfRange {
            param,
            value,
            min,
            max,
        })
    }
}

// =============================================================================
// Listing Query
// =============================================================================

/// Offset-based listing query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ListingQuery {
    /// Page size
    pub size: u64,

    /// Number of hits to skip
    pub from: u64,
}

/// Build a listing query. Performs no validation.
pub fn build_listing_query(page_size: u64, offset: u64) -> ListingQuery {
    ListingQuery {
        size: page_size,
        from: offset,
    }
}

// =============================================================================
// Geo Query
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DistanceUnit {
    #[serde(rename = "km")]
    Kilometers,
    #[serde(rename = "m")]
    Meters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceType {
    Arc,
    Plane,
}

/// How to pick a distance when a document holds several points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    Min,
    Max,
    Avg,
}

/// Body of a `_geo_distance` sort clause.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoDistanceSort {
    /// Reference point, keyed by the geo field name of the index
    pub location: GeoPoint,
    pub order: SortOrder,
    pub unit: DistanceUnit,
    pub mode: SortMode,
    /// Treat documents without a location as farthest instead of failing
    pub ignore_unmapped: bool,
    pub distance_type: DistanceType,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoSort {
    #[serde(rename = "_geo_distance")]
    pub geo_distance: GeoDistanceSort,
}

/// Nearest-point query sorted by distance from a reference point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoQuery {
    pub size: u64,
    pub sort: GeoSort,
}

impl GeoQuery {
    /// The point results are sorted around.
    pub fn sort_point(&self) -> GeoPoint {
        self.sort.geo_distance.location
    }
}

/// Build the nearest-place query for `point`.
///
/// Policy values are fixed: 3 results, ascending arc distance in kilometers,
/// minimum distance per document, unmapped locations tolerated.
pub fn build_geo_query(point: GeoPoint) -> GeoQuery {
    GeoQuery {
        size: RECOMMENDATION_LIMIT,
        sort: GeoSort {
            geo_distance: GeoDistanceSort {
                location: point,
                order: SortOrder::Asc,
                unit: DistanceUnit::Kilometers,
                mode: SortMode::Min,
                ignore_unmapped: true,
                distance_type: DistanceType::Arc,
            },
        },
    }
}

// =============================================================================
// SearchQuery
// =============================================================================

/// Any query the service sends to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchQuery {
    Listing(ListingQuery),
    Geo(GeoQuery),
}

impl SearchQuery {
    /// Whether the backend must compute an exact total hit count.
    ///
    /// Only listings need it, for page metadata.
    pub fn track_total_hits(&self) -> bool {
        matches!(self, SearchQuery::Listing(_))
    }
}

impl From<ListingQuery> for SearchQuery {
    fn from(query: ListingQuery) -> Self {
        SearchQuery::Listing(query)
    }
}

impl From<GeoQuery> for SearchQuery {
    fn from(query: GeoQuery) -> Self {
        SearchQuery::Geo(query)
    }
}

// =============================================================================
// Tests
// =============================================================================
