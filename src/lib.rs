//! Client-side emotion analytics engine for a personal journaling app.
//!
//! The remote analysis service classifies entries and generates
//! reflections; this crate reconciles its versioned payloads into one
//! canonical metadata shape and derives the render-ready statistics the
//! client shows: streak, distribution, most-common emotion, positive
//! ratio, and per-entry single/mixed/confused badges.

pub mod api;
pub mod config;
pub mod emotion;
pub mod error;
pub mod journal;
pub mod stats;

pub use error::{EngineError, Result};
