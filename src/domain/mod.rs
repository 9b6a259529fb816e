pub mod geocode;
pub mod location;
pub mod place;
pub mod status;

pub use geocode::GeocodeResult;
pub use location::Coordinates;
pub use place::{PlaceResult, rank_places};
pub use status::ProviderStatus;
