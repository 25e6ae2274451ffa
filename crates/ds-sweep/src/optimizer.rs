//! The driver's solver boundary.

use crate::error::SweepResult;
use ds_core::TrajectoryConstraints;
use ds_glider::Glider;
use ds_solver::{SolveOutcome, SolveSettings, Trajectory, solve_trajectory};
use ds_wind::WindModel;

/// One solve attempt as the driver sees it.
#[derive(Clone, Debug)]
pub struct SolveRequest {
    pub travel_angle: f64,
    pub period_guess: f64,
    pub avg_speed_guess: f64,
    /// Previous solution used as the starting point, or None for the
    /// canonical straight-line guess.
    pub warm_start: Option<Trajectory>,
}

/// Boundary trait between the continuation driver and the trajectory
/// optimizer. Production uses `DircolOptimizer`; tests inject scripted
/// implementations.
pub trait TrajectoryOptimizer {
    fn optimize(&self, request: &SolveRequest) -> SweepResult<SolveOutcome>;
}

/// Direct-collocation optimizer over a fixed glider, wind field and
/// constraint set.
pub struct DircolOptimizer<'a> {
    glider: &'a Glider,
    wind: &'a dyn WindModel,
    constraints: &'a TrajectoryConstraints,
    settings: SolveSettings,
}

impl<'a> DircolOptimizer<'a> {
    pub fn new(
        glider: &'a Glider,
        wind: &'a dyn WindModel,
        constraints: &'a TrajectoryConstraints,
        settings: SolveSettings,
    ) -> Self {
        Self {
            glider,
            wind,
            constraints,
            settings,
        }
    }
}

impl TrajectoryOptimizer for DircolOptimizer<'_> {
    fn optimize(&self, request: &SolveRequest) -> SweepResult<SolveOutcome> {
        Ok(solve_trajectory(
            self.glider,
            self.wind,
            self.constraints,
            request.travel_angle,
            request.period_guess,
            request.avg_speed_guess,
            request.warm_start.as_ref(),
            &self.settings,
        )?)
    }
}
