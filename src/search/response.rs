//! Decoding of backend search responses.
//!
//! The backend answers with an envelope of the form:
//!
//! ```text
//! {
//!   "took": 3,
//!   "hits": {
//!     "total": {"value": 13649, "relation": "eq"},
//!     "hits": [
//!       {"_index": "places", "_id": "1", "_source": {"name": .., "address": .., ...}},
//!       ...
//!     ]
//!   }
//! }
//! ```
//!
//! Top-level shape problems are fatal ([`DecodeError`]). A hit whose
//! `_source` does not deserialize into the target type is skipped, so the
//! number of decoded items may be lower than the number of raw hits while the
//! reported total stays the backend's own count.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::DecodeError;

/// Whether the caller needs the total hit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalHits {
    /// Total must be present; its absence is a decode error
    Required,
    /// Total is not read even if present
    Ignored,
}

/// Records decoded from one search response.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedHits<T> {
    /// Decoded records in backend order
    pub items: Vec<T>,

    /// Backend-reported total match count (`None` when ignored)
    pub total: Option<u64>,

    /// Number of hits dropped because their source was malformed
    pub skipped: usize,
}

/// Decode a raw response body.
pub fn decode_search_response<T: DeserializeOwned>(
    body: &[u8],
    total: TotalHits,
) -> Result<DecodedHits<T>, DecodeError> {
    let envelope: Value =
        serde_json::from_slice(body).map_err(|e| DecodeError::MalformedJson(e.to_string()))?;
    decode_envelope(&envelope, total)
}

/// Decode an already-parsed response envelope.
pub fn decode_envelope<T: DeserializeOwned>(
    envelope: &Value,
    total: TotalHits,
) -> Result<DecodedHits<T>, DecodeError> {
    let hits_section = envelope
        .get("hits")
        .filter(|v| v.is_object())
        .ok_or(DecodeError::MissingHits)?;

    let raw_hits = hits_section
        .get("hits")
        .and_then(Value::as_array)
        .ok_or(DecodeError::MissingHits)?;

    let total = match total {
        TotalHits::Required => Some(read_total(hits_section.get("total"))?),
        TotalHits::Ignored => None,
    };

    let mut items = Vec::with_capacity(raw_hits.len());
    let mut skipped = 0;

    for (index, hit) in raw_hits.iter().enumerate() {
        let Some(source) = hit.get("_source") else {
            debug!(index, "Skipping search hit without _source");
            skipped += 1;
            continue;
        };

        match T::deserialize(source) {
            Ok(item) => items.push(item),
            Err(e) => {
                debug!(index, error = %e, "Skipping malformed search hit");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!(
            skipped,
            decoded = items.len(),
            "Dropped malformed hits from search response"
        );
    }

    Ok(DecodedHits {
        items,
        total,
        skipped,
    })
}

/// Read `hits.total`.
///
/// Accepts the object form `{"value": n, "relation": ..}` and the bare integer
/// form used by older backend versions.
fn read_total(total: Option<&Value>) -> Result<u64, DecodeError> {
    let total = total.ok_or(DecodeError::MissingTotal)?;

    let value = match total {
        Value::Object(map) => map.get("value").ok_or(DecodeError::MissingTotal)?,
        other => other,
    };

    value
        .as_u64()
        .ok_or_else(|| DecodeError::InvalidTotal(value.to_string()))
}

// =============================================================================
// Tests
// =============================================================================
