//! Walk an agent down a corridor toward a rewarded cell.
//!
//! Position is observed through a noisy sensor; a second, uncontrollable
//! factor (lights on or off) only changes how reliable that sensor is. The
//! agent plans two steps ahead with utility, state information gain and the
//! inductive goal term, then takes the selected action in a simulated world.
//!
//! Run with `cargo run --example grid_goal`.

use aif_control::{EfeTerms, GenerativeModel, Planner, PlannerConfig, Result};
use ndarray::{Array1, Array3, ArrayD, IxDyn};

const CELLS: usize = 5;
const GOAL: usize = CELLS - 1;

fn corridor() -> ArrayD<f64> {
    Array3::from_shape_fn((CELLS, CELLS, 3), |(s, v, u)| {
        let target = match u {
            0 => v,
            1 => v.saturating_sub(1),
            _ => (v + 1).min(CELLS - 1),
        };
        if s == target { 1.0 } else { 0.0 }
    })
    .into_dyn()
}

fn lights() -> ArrayD<f64> {
    Array3::from_shape_fn((2, 2, 1), |(s, v, _)| if s == v { 1.0 } else { 0.0 }).into_dyn()
}

/// Sensor reports the true cell with 0.95 in the light and 0.6 in the dark.
fn position_sensor() -> ArrayD<f64> {
    ArrayD::from_shape_fn(IxDyn(&[CELLS, CELLS, 2]), |idx| {
        let (o, s, light) = (idx[0], idx[1], idx[2]);
        let hit = if light == 1 { 0.95 } else { 0.6 };
        if o == s {
            hit
        } else {
            (1.0 - hit) / (CELLS - 1) as f64
        }
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut preferences = Array1::zeros(CELLS);
    preferences[GOAL] = 2.0;
    let model = GenerativeModel::new(
        vec![position_sensor()],
        vec![corridor(), lights()],
        vec![preferences],
    );

    let mut config = PlannerConfig::default()
        .with_terms(EfeTerms::default().with_inductive(true))
        .with_seed(7);
    config.inductive.depth = CELLS;
    config.inductive.threshold = 0.5;

    let mut goal = Array1::zeros(CELLS);
    goal[GOAL] = 1.0;
    let lights_goal = Array1::zeros(2);
    let planner = Planner::new(model, config)?.with_goals(&[goal, lights_goal])?;
    let policies = aif_control::construct_policies(&[CELLS, 2], Some(&[3, 1]), 2, None)?;
    let mut rng = planner.config().rng();

    let mut position = 0;
    for step in 0..CELLS + 2 {
        let mut q_position = Array1::zeros(CELLS);
        q_position[position] = 1.0;
        let qs = vec![q_position, Array1::from(vec![0.5, 0.5])];
        let outcome = planner.plan(&qs, &policies, &mut rng)?;
        let move_name = ["stay", "left", "right"][outcome.action[0]];
        println!(
            "step {step}: at cell {position}, p(move) = {:.3?}, chose {move_name}",
            outcome.marginals[0].to_vec()
        );
        position = match outcome.action[0] {
            1 => position.saturating_sub(1),
            2 => (position + 1).min(CELLS - 1),
            _ => position,
        };
        if position == GOAL {
            println!("reached the goal after {} steps", step + 1);
            break;
        }
    }
    Ok(())
}
