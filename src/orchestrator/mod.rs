//! Geocode-then-search pipeline driving a [`RenderSurface`].

pub mod client;
pub mod search;
pub mod session;
pub mod surface;

pub use client::{ClientError, HttpGateway, PlacesGateway};
pub use search::{
    Bounce, NO_RESULTS_MESSAGE, Orchestrator, SearchError, SearchOutcome, SearchState,
    SearchTicket, Step, search_phrase,
};
pub use session::{CityInput, Generation, SearchSession};
pub use surface::{
    Animation, BOUNCE_DURATION, BUILDING_ZOOM, MapOptions, MarkerHandle, OVERVIEW_ZOOM,
    RenderSurface,
};
