//! Memory-to-location recall.
//!
//! qmemory takes a vague memory fragment ("snow on the mountains, a quiet hot
//! spring") and an optional emotion, and returns one primary real-world place
//! plus a few alternates, each with a probability. The probabilities of a
//! result always sum to 100.
//!
//! # Pipeline
//!
//! 1. **Analysis**: an ordered fallback chain of sources is tried one at a
//!    time until one succeeds: the quantum analysis backend, Gemini called
//!    directly, a secondary backend route, and finally an offline keyword
//!    matcher that always answers.
//! 2. **Normalization**: raw scores are rescaled to percentages.
//! 3. **Enrichment**: candidates without coordinates are geocoded via
//!    Nominatim and every candidate gets an image URL. Enrichment failures
//!    are logged and never fail the request.
//!
//! # Modules
//!
//! - [`analysis`]: sources, keyword matcher, normalizer and the fallback orchestrator
//! - [`enrichment`]: geocoding and image lookup
//! - [`locator`]: wires analysis and enrichment from [`config`]
//! - [`server`]: HTTP API and MCP stdio entry points
//! - [`display`]: decorative numbers for the UI, unrelated to ranking

pub mod analysis;
pub mod config;
pub mod display;
pub mod enrichment;
pub mod error;
pub mod locator;
pub mod server;
pub mod tools;
