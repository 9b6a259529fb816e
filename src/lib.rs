//! restomap - Search best rated restaurants in a city through a credential-hiding maps proxy

pub mod api;
pub mod config;
pub mod domain;
pub mod gateway;
pub mod orchestrator;
pub mod terminal;
