use axum::http::StatusCode;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::client::{ClientError, PlacesGateway};
use super::session::{CityInput, Generation, SearchSession};
use super::surface::{Animation, BUILDING_ZOOM, MarkerHandle, OVERVIEW_ZOOM, RenderSurface};
use crate::api::{GeocodeResponse, TextSearchResponse};
use crate::domain::{Coordinates, GeocodeResult, PlaceResult, ProviderStatus, rank_places};
use crate::gateway::{EnvelopeBody, ProxyEnvelope, RequestType};

pub const NO_RESULTS_MESSAGE: &str = "No restaurants found for this city.";
const EMPTY_LIST_MESSAGE: &str = "No restaurants found.";

/// Free-text query sent to place search for a city
pub fn search_phrase(city: &str) -> String {
    format!("best rated restaurants in {}", city)
}

/// Failures that end a search in the errored state
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Geocoding request failed: {status} - {body}")]
    GeocodeRequest { status: StatusCode, body: String },

    #[error("Could not geocode city: {status} - {message}")]
    Geocode {
        status: ProviderStatus,
        message: String,
    },

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("malformed provider response: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Loading,
    Rendered,
    Errored,
}

/// Identifies one search cycle; results are applied only while it is current
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    generation: Generation,
    city: String,
}

impl SearchTicket {
    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Rendered { places: usize, markers: usize },
    NoResults,
    Failed(String),
    /// A newer search started before this result arrived; nothing was rendered
    Stale,
}

/// Result of applying the geocode reply
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Map recentered; issue place search with this query
    Continue(String),
    Done(SearchOutcome),
}

/// A running bounce animation, to be finished after [`super::BOUNCE_DURATION`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bounce {
    place_id: String,
    generation: Generation,
}

impl Bounce {
    pub fn place_id(&self) -> &str {
        &self.place_id
    }
}

enum PlacesReply {
    Found(Vec<PlaceResult>),
    Empty,
    Failed {
        status: String,
        message: Option<String>,
    },
}

/// Owns the session and the surface, and turns gateway replies into renders.
///
/// [`Orchestrator::search`] runs the whole pipeline. Hosts that interleave
/// several searches drive it step by step instead ([`Orchestrator::begin_search`],
/// [`Orchestrator::apply_geocode`], [`Orchestrator::apply_places`]); replies for
/// anything but the latest ticket are dropped.
pub struct Orchestrator<S: RenderSurface> {
    surface: S,
    session: SearchSession<S::Marker>,
    state: SearchState,
}

impl<S: RenderSurface> Orchestrator<S> {
    pub fn new(surface: S, city: impl Into<String>) -> Self {
        Self {
            surface,
            session: SearchSession::new(city),
            state: SearchState::Idle,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn session(&self) -> &SearchSession<S::Marker> {
        &self.session
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn classify_input(&self, raw: &str) -> CityInput {
        self.session.classify_input(raw)
    }

    /// Geocode `city`, recenter, search and render.
    pub async fn search<G: PlacesGateway>(&mut self, gateway: &G, city: &str) -> SearchOutcome {
        let ticket = self.begin_search(city);

        debug!(city = %ticket.city, "Geocoding city");
        let geocode = gateway.call(RequestType::Geocode, &ticket.city).await;
        let query = match self.apply_geocode(&ticket, geocode) {
            Step::Continue(query) => query,
            Step::Done(outcome) => return outcome,
        };

        debug!(%query, "Searching places");
        let places = gateway.call(RequestType::TextSearch, &query).await;
        self.apply_places(&ticket, places)
    }

    /// Enter loading and tear down the previous list and markers.
    pub fn begin_search(&mut self, city: &str) -> SearchTicket {
        self.surface.show_loading();
        self.surface.clear_list();
        let generation = self.session.begin(city);
        self.state = SearchState::Loading;

        SearchTicket {
            generation,
            city: city.to_string(),
        }
    }

    pub fn apply_geocode(
        &mut self,
        ticket: &SearchTicket,
        reply: Result<ProxyEnvelope, ClientError>,
    ) -> Step {
        if !self.session.is_current(ticket.generation) {
            debug!(city = %ticket.city, "Discarding stale geocode reply");
            return Step::Done(SearchOutcome::Stale);
        }

        match geocode_location(reply) {
            Ok(at) => {
                info!(city = %ticket.city, %at, "Geocoded city");
                self.surface.set_center(at);
                self.surface.set_zoom(OVERVIEW_ZOOM);
                Step::Continue(search_phrase(&ticket.city))
            }
            Err(err) => Step::Done(self.fail(err)),
        }
    }

    pub fn apply_places(
        &mut self,
        ticket: &SearchTicket,
        reply: Result<ProxyEnvelope, ClientError>,
    ) -> SearchOutcome {
        if !self.session.is_current(ticket.generation) {
            debug!(city = %ticket.city, "Discarding stale place search reply");
            return SearchOutcome::Stale;
        }

        let envelope = match reply {
            Ok(envelope) => envelope,
            Err(err) => return self.fail(err.into()),
        };
        self.surface.hide_loading();

        match interpret_places(envelope) {
            Ok(PlacesReply::Found(places)) => self.render_places(places),
            Ok(PlacesReply::Empty) => {
                self.surface.render_message(NO_RESULTS_MESSAGE);
                self.state = SearchState::Rendered;
                SearchOutcome::NoResults
            }
            Ok(PlacesReply::Failed { status, message }) => {
                error!(%status, ?message, "Place search failed");
                let message = match message.filter(|m| !m.is_empty()) {
                    Some(detail) => format!(
                        "Error fetching restaurants: {} ({}). Please try again.",
                        status, detail
                    ),
                    None => format!("Error fetching restaurants: {}. Please try again.", status),
                };
                self.surface.render_error(&message);
                self.state = SearchState::Errored;
                SearchOutcome::Failed(message)
            }
            Err(err) => self.fail(err),
        }
    }

    /// Row or marker click: recenter, zoom in and start bouncing its marker.
    ///
    /// Returns `None` when the place is unknown or has no coordinates, or when
    /// its marker is gone; nothing is animated then.
    pub fn select(&mut self, place_id: &str) -> Option<Bounce> {
        let at = self.session.place(place_id)?.coordinates?;
        debug!(%place_id, "Zooming to place");
        self.surface.set_center(at);
        self.surface.set_zoom(BUILDING_ZOOM);

        let marker = self.session.marker_mut(place_id)?;
        marker.animate(Animation::Bounce);
        Some(Bounce {
            place_id: place_id.to_string(),
            generation: self.session.generation(),
        })
    }

    /// Stop a bounce once its time is up. A no-op if the marker was replaced
    /// by a newer search in the meantime.
    pub fn finish_bounce(&mut self, bounce: Bounce) -> bool {
        if !self.session.is_current(bounce.generation) {
            debug!(place_id = %bounce.place_id, "Bounce outlived its search");
            return false;
        }
        match self.session.marker_mut(&bounce.place_id) {
            Some(marker) => {
                marker.stop_animation();
                true
            }
            None => false,
        }
    }

    /// Website link of a row. Following it never selects the row.
    pub fn website(&self, place_id: &str) -> Option<&str> {
        self.session.place(place_id)?.website.as_deref()
    }

    /// Place shown at 1-based list position `row`
    pub fn row(&self, row: usize) -> Option<&PlaceResult> {
        row.checked_sub(1)
            .and_then(|index| self.session.rows().get(index))
    }

    fn render_places(&mut self, places: Vec<PlaceResult>) -> SearchOutcome {
        if places.is_empty() {
            self.surface.render_message(EMPTY_LIST_MESSAGE);
            self.state = SearchState::Rendered;
            return SearchOutcome::NoResults;
        }

        self.surface.render_list(&places);

        let pins: Vec<(String, Coordinates, String)> = places
            .iter()
            .filter_map(|place| {
                let at = place.coordinates?;
                Some((place.place_id.clone(), at, place.name.clone()))
            })
            .collect();
        let count = places.len();
        self.session.install_rows(places);

        for (place_id, at, title) in pins {
            let mut marker = self.surface.add_marker(at, &title);
            marker.animate(Animation::Drop);
            if let Err(mut orphan) = self.session.insert_marker(&place_id, marker) {
                warn!(%place_id, "Dropping marker without a unique row");
                orphan.remove();
            }
        }

        let markers = self.session.marker_count();
        info!(places = count, markers, "Rendered restaurants");
        self.state = SearchState::Rendered;
        SearchOutcome::Rendered {
            places: count,
            markers,
        }
    }

    fn fail(&mut self, err: SearchError) -> SearchOutcome {
        error!(error = %err, "Search failed");
        let message = format!("An error occurred: {}. Please try again.", err);
        // The list was already cleared when the search began
        self.surface.hide_loading();
        self.surface.render_error(&message);
        self.state = SearchState::Errored;
        SearchOutcome::Failed(message)
    }
}

fn geocode_location(
    reply: Result<ProxyEnvelope, ClientError>,
) -> Result<Coordinates, SearchError> {
    let envelope = reply?;
    if !envelope.is_ok() {
        return Err(SearchError::GeocodeRequest {
            status: envelope.status,
            body: envelope.body_text(),
        });
    }

    let response: GeocodeResponse = serde_json::from_str(&envelope.body_text())?;
    let result = GeocodeResult::from_response(response);
    result.coordinates.ok_or_else(|| SearchError::Geocode {
        status: result.status,
        message: result.message.unwrap_or_else(|| "Not found".to_string()),
    })
}

fn interpret_places(envelope: ProxyEnvelope) -> Result<PlacesReply, SearchError> {
    let payload = match envelope.body {
        EnvelopeBody::Upstream(payload) if envelope.status == StatusCode::OK => payload,
        EnvelopeBody::Error(body) => {
            return Ok(PlacesReply::Failed {
                status: body.error,
                message: body.message.or(body.details),
            });
        }
        EnvelopeBody::Upstream(text) => {
            return Ok(PlacesReply::Failed {
                status: envelope.status.to_string(),
                message: Some(text),
            });
        }
    };

    let response: TextSearchResponse = serde_json::from_str(&payload)?;
    let reply = match (response.status, response.results) {
        (ProviderStatus::Ok, Some(results)) => PlacesReply::Found(rank_places(results)),
        (ProviderStatus::ZeroResults, _) => PlacesReply::Empty,
        (status, _) => PlacesReply::Failed {
            status: status.to_string(),
            message: response.error_message,
        },
    };
    Ok(reply)
}
