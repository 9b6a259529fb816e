use std::time::Duration;

use crate::config::MapConfig;
use crate::domain::{Coordinates, PlaceResult};

/// Zoom used after recentering on a city
pub const OVERVIEW_ZOOM: u8 = 13;
/// Roughly block/building level
pub const BUILDING_ZOOM: u8 = 18;
pub const BOUNCE_DURATION: Duration = Duration::from_millis(750);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Animation {
    /// One-shot animation when a marker is placed
    Drop,
    Bounce,
}

/// Options a surface is created with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapOptions {
    pub center: Coordinates,
    pub zoom: u8,
    pub disable_default_ui: bool,
    pub zoom_control: bool,
}

impl MapOptions {
    pub fn from_config(config: &MapConfig) -> Self {
        Self {
            center: config.center(),
            zoom: config.zoom,
            disable_default_ui: true,
            zoom_control: true,
        }
    }
}

impl Default for MapOptions {
    fn default() -> Self {
        Self::from_config(&MapConfig::default())
    }
}

/// Control capabilities of one placed marker
pub trait MarkerHandle {
    fn remove(&mut self);
    fn animate(&mut self, kind: Animation);
    fn stop_animation(&mut self);
}

/// Everything the orchestrator draws on: the map widget plus the result list.
pub trait RenderSurface {
    type Marker: MarkerHandle;

    fn set_center(&mut self, at: Coordinates);
    fn set_zoom(&mut self, level: u8);
    fn add_marker(&mut self, at: Coordinates, title: &str) -> Self::Marker;

    fn show_loading(&mut self);
    fn hide_loading(&mut self);

    fn clear_list(&mut self);
    /// Replace the list with one row per place, in order
    fn render_list(&mut self, places: &[PlaceResult]);
    /// Single informational row ("no results")
    fn render_message(&mut self, message: &str);
    /// Single error row
    fn render_error(&mut self, message: &str);
}
