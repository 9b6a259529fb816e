//! Line-oriented rendering surface for the command line.
//!
//! The result list goes to the writer (stdout by default), the loading
//! indicator is an `indicatif` spinner, and the "map" is reported as text.

use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::{Coordinates, PlaceResult};
use crate::orchestrator::{Animation, MapOptions, MarkerHandle, RenderSurface};

pub struct TerminalSurface<W: Write> {
    out: W,
    center: Coordinates,
    zoom: u8,
    spinner: Option<ProgressBar>,
    next_marker: usize,
}

impl TerminalSurface<io::Stdout> {
    pub fn stdout(options: MapOptions) -> Self {
        Self::new(options, io::stdout())
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(options: MapOptions, out: W) -> Self {
        debug!(
            center = %options.center,
            zoom = options.zoom,
            default_ui = !options.disable_default_ui,
            zoom_control = options.zoom_control,
            "Created map surface"
        );
        Self {
            out,
            center: options.center,
            zoom: options.zoom,
            spinner: None,
            next_marker: 0,
        }
    }

    pub fn center(&self) -> Coordinates {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text) {
            warn!("Failed to write output: {}", e);
        }
    }
}

impl<W: Write> RenderSurface for TerminalSurface<W> {
    type Marker = TerminalMarker;

    fn set_center(&mut self, at: Coordinates) {
        self.center = at;
    }

    fn set_zoom(&mut self, level: u8) {
        self.zoom = level;
        let message = format!("Map: {} at zoom {}", self.center, level);
        self.line(&message);
    }

    fn add_marker(&mut self, at: Coordinates, title: &str) -> TerminalMarker {
        self.next_marker += 1;
        debug!(id = self.next_marker, %title, %at, "Added marker");
        TerminalMarker {
            id: self.next_marker,
            title: title.to_string(),
            position: at,
            animation: None,
        }
    }

    fn show_loading(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
        self.spinner = Some(create_spinner("Searching restaurants..."));
    }

    fn hide_loading(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn clear_list(&mut self) {
        self.line("");
    }

    fn render_list(&mut self, places: &[PlaceResult]) {
        for (index, place) in places.iter().enumerate() {
            let header = format!(
                "{:>3}. {}  * {} ({})",
                index + 1,
                place.name,
                place.rating_label(),
                place.rating_count.unwrap_or(0)
            );
            self.line(&header);
            let address = format!("     {}", place.address_label());
            self.line(&address);
            if let Some(website) = &place.website {
                let link = format!("     Visit site: {}", website);
                self.line(&link);
            }
        }
    }

    fn render_message(&mut self, message: &str) {
        self.line(message);
    }

    fn render_error(&mut self, message: &str) {
        let message = format!("Error: {}", message);
        self.line(&message);
    }
}

/// A map pin as far as the terminal is concerned
#[derive(Debug)]
pub struct TerminalMarker {
    id: usize,
    title: String,
    position: Coordinates,
    animation: Option<Animation>,
}

impl TerminalMarker {
    pub fn animation(&self) -> Option<Animation> {
        self.animation
    }
}

impl MarkerHandle for TerminalMarker {
    fn remove(&mut self) {
        debug!(id = self.id, title = %self.title, "Removed marker");
    }

    fn animate(&mut self, kind: Animation) {
        debug!(id = self.id, title = %self.title, at = %self.position, ?kind, "Animating marker");
        // Drop is one-shot and never needs stopping
        if kind == Animation::Bounce {
            self.animation = Some(kind);
        }
    }

    fn stop_animation(&mut self) {
        debug!(id = self.id, title = %self.title, "Stopped marker animation");
        self.animation = None;
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(id: &str, rating: Option<f64>, website: Option<&str>) -> PlaceResult {
        PlaceResult {
            place_id: id.to_string(),
            name: format!("Place {}", id),
            rating,
            rating_count: rating.map(|_| 42),
            address: None,
            coordinates: Some(Coordinates::new(54.0, 25.0)),
            website: website.map(str::to_string),
            photo_reference: None,
        }
    }

    fn output(surface: TerminalSurface<Vec<u8>>) -> String {
        String::from_utf8(surface.into_inner()).unwrap()
    }

    #[test]
    fn test_render_list_rows() {
        let mut surface = TerminalSurface::new(MapOptions::default(), Vec::new());
        surface.render_list(&[
            place("a", Some(4.86), Some("https://a.example")),
            place("b", None, None),
        ]);

        let text = output(surface);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "  1. Place a  * 4.9 (42)");
        assert_eq!(lines[1], "     Address not available");
        assert_eq!(lines[2], "     Visit site: https://a.example");
        assert_eq!(lines[3], "  2. Place b  * N/A (0)");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_map_state_tracks_center_and_zoom() {
        let mut surface = TerminalSurface::new(MapOptions::default(), Vec::new());
        assert_eq!(surface.zoom(), 13);

        surface.set_center(Coordinates::new(40.0, -3.7));
        surface.set_zoom(18);

        assert_eq!(surface.center(), Coordinates::new(40.0, -3.7));
        assert_eq!(output(surface), "Map: (40.0000, -3.7000) at zoom 18\n");
    }

    #[test]
    fn test_marker_bounce_lifecycle() {
        let mut surface = TerminalSurface::new(MapOptions::default(), Vec::new());
        let mut marker = surface.add_marker(Coordinates::new(1.0, 2.0), "Pin");

        marker.animate(Animation::Drop);
        assert_eq!(marker.animation(), None);
        marker.animate(Animation::Bounce);
        assert_eq!(marker.animation(), Some(Animation::Bounce));
        marker.stop_animation();
        assert_eq!(marker.animation(), None);
    }

    #[test]
    fn test_error_row() {
        let mut surface = TerminalSurface::new(MapOptions::default(), Vec::new());
        surface.render_error("An error occurred: boom. Please try again.");
        assert_eq!(
            output(surface),
            "Error: An error occurred: boom. Please try again.\n"
        );
    }
}
