//! Wire types for the upstream geocoding and place search payloads.
//!
//! Only the fields the application reads are modelled; everything else in
//! the provider payload is ignored on parse (and forwarded untouched by the
//! proxy, which never re-serializes these types).

use crate::domain::{Coordinates, ProviderStatus};
use serde::Deserialize;
use tracing::debug;

/// Just enough of any provider payload to route it
#[derive(Debug, Deserialize)]
pub struct StatusProbe {
    pub status: ProviderStatus,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Geocoding API response
#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub status: ProviderStatus,
    #[serde(default)]
    pub results: Vec<GeocodeEntry>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeEntry {
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub location: Option<Coordinates>,
}

/// Places text search response (first page only).
///
/// Entries stay as raw JSON so that one malformed entry cannot fail the
/// whole page; see [`PlaceEntry::from_value`].
#[derive(Debug, Deserialize)]
pub struct TextSearchResponse {
    pub status: ProviderStatus,
    #[serde(default)]
    pub results: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// A single place as returned by text search. Every field may be absent.
#[derive(Debug, Default, Deserialize)]
pub struct PlaceEntry {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub photos: Vec<PlacePhoto>,
}

impl PlaceEntry {
    /// Parse one raw result entry. Wrong-typed fields make the entry `None`.
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping malformed place entry: {}", e);
                None
            }
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<PlacePhoto>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<PlacePhoto>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
pub struct PlacePhoto {
    #[serde(default)]
    pub photo_reference: Option<String>,
}
