//! worldjson - Build an enriched world.json GeoJSON of country boundaries

pub mod api;
pub mod config;
pub mod domain;
pub mod enrich;
pub mod error;
pub mod geometry;
pub mod output;
pub mod pipeline;
pub mod synth;
