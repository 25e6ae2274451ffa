//! ds-wind: wind field models for dynsoar.
//!
//! Provides:
//! - `WindProfileConfig` (reference speed/height, ground offset, shape constants)
//! - `WindModel` trait with the no-wind-below-ground policy built in
//! - Four interchangeable analytic profiles: linear, logarithmic,
//!   exponential and logistic (shear layer)
//!
//! # Architecture
//!
//! The `WindModel` trait isolates the dynamics and the transcription from
//! the choice of profile: every profile maps altitude to a horizontal wind
//! speed and its altitude derivative, and the provided trait methods turn
//! those into the wind vector and Jacobian the rest of the system consumes.
//! Selecting a profile is pure configuration; no other component's logic
//! depends on which one is active.

pub mod config;
pub mod model;
pub mod profiles;

pub use config::WindProfileConfig;
pub use model::WindModel;
pub use profiles::{
    ExponentialWind, LinearWind, LogarithmicWind, LogisticWind, WindProfileKind,
};
