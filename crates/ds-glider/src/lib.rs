//! ds-glider: Zhukovskii glider dynamics for dynsoar.
//!
//! The glider is modeled with circulation as the aerodynamic control: the
//! lift force is `rho * (c x v_rel)` and drag splits into a parasitic term
//! and a lift-induced term. The same `continuous_dynamics` function serves
//! simulation and trajectory transcription; derived performance numbers and
//! per-knot flight quantities live alongside it for reporting.

pub mod flight;
pub mod glider;
pub mod performance;

pub use glider::{Circulation, Glider, GliderState, NORM_EPSILON, reg_norm};
