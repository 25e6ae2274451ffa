//! Integration test for the full transcription + solve pipeline.
//!
//! The nonconvex solve may legitimately fail to converge from a cold
//! start; both outcomes are valid here. What must hold: a solved
//! trajectory honors periodicity and every path constraint, and a failed
//! solve reports infeasibility instead of erroring.

use ds_core::{PhysicalParameters, TrajectoryConstraints};
use ds_glider::Glider;
use ds_solver::{
    GaussNewtonConfig, NlpSolverConfig, SolveOutcome, SolveSettings, TranscriptionConfig,
    solve_trajectory,
};
use ds_wind::{LogarithmicWind, WindProfileConfig};

#[test]
fn solve_attempt_yields_valid_solution_or_clean_infeasibility() {
    let glider = Glider::new(PhysicalParameters::default()).unwrap();
    let wind = LogarithmicWind::new(WindProfileConfig::default());
    let constraints = TrajectoryConstraints::default();

    let settings = SolveSettings {
        transcription: TranscriptionConfig {
            knot_count: 8,
            ..Default::default()
        },
        nlp: NlpSolverConfig {
            max_outer_iterations: 20,
            gauss_newton: GaussNewtonConfig {
                max_iterations: 40,
                ..Default::default()
            },
            ..Default::default()
        },
    };

    let travel_angle = 0.0;
    let outcome = solve_trajectory(
        &glider,
        &wind,
        &constraints,
        travel_angle,
        8.0,
        glider.level_glide_speed(),
        None,
        &settings,
    )
    .expect("setup is valid, only infeasibility is acceptable");

    match outcome {
        SolveOutcome::Solved(solution) => {
            assert!(solution.avg_speed > 0.0);
            assert!(solution.period > 0.0);
            assert!(solution.trajectory.periodicity_error(travel_angle) <= 1e-4);
            for knot in &solution.trajectory.knots {
                let z = knot.state[2];
                assert!(z >= constraints.min_height - 1e-3);
                assert!(z <= constraints.max_height + 1e-3);

                let v_rel = glider.relative_velocity(&knot.state, &wind);
                let c_l = glider.lift_coefficient(&v_rel, &knot.input);
                assert!(c_l >= constraints.min_lift_coeff - 1e-3);
                assert!(c_l <= constraints.max_lift_coeff + 1e-3);
                assert!(
                    glider.load_factor(&v_rel, &knot.input)
                        <= constraints.max_load_factor + 1e-3
                );
                assert!(
                    glider.bank_angle(&v_rel, &knot.input).abs()
                        <= constraints.max_bank_angle + 1e-3
                );
            }
        }
        SolveOutcome::Infeasible { reason } => {
            assert!(!reason.is_empty());
        }
    }
}
