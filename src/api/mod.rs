pub mod places;
pub mod upstream;

pub use places::{
    GeocodeEntry, GeocodeResponse, Geometry, PlaceEntry, PlacePhoto, StatusProbe,
    TextSearchResponse,
};
pub use upstream::{HttpUpstream, TEXT_SEARCH_FIELDS, Upstream, UpstreamError, UpstreamRequest};
