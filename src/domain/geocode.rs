use super::{Coordinates, ProviderStatus};
use crate::api::GeocodeResponse;

/// Outcome of geocoding a city name.
///
/// `coordinates` is present only when the provider answered `OK` with at
/// least one located result; the first result wins.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub status: ProviderStatus,
    pub coordinates: Option<Coordinates>,
    pub message: Option<String>,
}

impl GeocodeResult {
    pub fn from_response(response: GeocodeResponse) -> Self {
        let coordinates = if response.status == ProviderStatus::Ok {
            response
                .results
                .into_iter()
                .next()
                .and_then(|result| result.geometry)
                .and_then(|geometry| geometry.location)
        } else {
            None
        };

        Self {
            status: response.status,
            coordinates,
            message: response.error_message,
        }
    }
}
