//! Query string extraction.

use signet_core::{Location, RawData};

use crate::multi::{collapse, text_pair};
use crate::ExtractionError;

/// Parses a URL-encoded query string into raw data.
///
/// # Errors
///
/// Returns a malformed query error if the string cannot be decoded.
pub fn parse_query(query: Option<&str>) -> Result<RawData, ExtractionError> {
    let Some(query) = query.filter(|q| !q.is_empty()) else {
        return Ok(RawData::new());
    };
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
        .map_err(|e| ExtractionError::malformed(Location::Query, e.to_string()))?;
    Ok(collapse(pairs.into_iter().map(text_pair)))
}
