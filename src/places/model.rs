use serde::{Deserialize, Serialize};

/// A catalog entry as returned to clients.
///
/// Catalog documents also carry `id` and `location`; those fields are ignored
/// when decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub address: String,
    pub phone: String,
}

/// One page of a listing plus its pagination metadata.
///
/// Serializes as `{"Places": [..], "Total": n, "Page": n, "Last": n}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagedResult<T> {
    /// Items on this page, in backend order
    #[serde(rename = "Places")]
    pub items: Vec<T>,

    /// Total matches reported by the backend
    #[serde(rename = "Total")]
    pub total_count: u64,

    /// 1-based page number
    #[serde(rename = "Page")]
    pub current_page: u64,

    /// Last valid page number (0 for an empty catalog)
    #[serde(rename = "Last")]
    pub last_page: u64,
}
