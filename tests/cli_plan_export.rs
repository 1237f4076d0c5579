use std::fs;

use aif_control::cli::{
    commands::{
        plan::{PlanArgs, execute},
        reachability::{self, ReachabilityArgs},
    },
    problem::PlanningProblem,
};
use tempfile::tempdir;

const PROBLEM: &str = r#"{
    "a": [{"v": 1, "dim": [2, 2], "data": [0.9, 0.1, 0.1, 0.9]}],
    "b": [{"v": 1, "dim": [2, 2, 2], "data": [1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0]}],
    "c": [{"v": 1, "dim": [2], "data": [0.0, 3.0]}],
    "qs": [{"v": 1, "dim": [2], "data": [1.0, 0.0]}],
    "horizon": 2,
    "goals": [{"v": 1, "dim": [2], "data": [0.0, 1.0]}]
}"#;

// factor 0 transitions depend on factor 1, so B[0] has four axes
const COUPLED_PROBLEM: &str = r#"{
    "a": [{"v": 1, "dim": [2, 2, 2], "data": [0.9, 0.9, 0.1, 0.1, 0.1, 0.1, 0.9, 0.9]}],
    "b": [
        {"v": 1, "dim": [2, 2, 2, 1], "data": [1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0]},
        {"v": 1, "dim": [2, 2, 1], "data": [1.0, 0.0, 0.0, 1.0]}
    ],
    "c": [{"v": 1, "dim": [2], "data": [0.0, 1.0]}],
    "b_dependencies": [[0, 1], [1]],
    "qs": [
        {"v": 1, "dim": [2], "data": [1.0, 0.0]},
        {"v": 1, "dim": [2], "data": [1.0, 0.0]}
    ],
    "goals": [
        {"v": 1, "dim": [2], "data": [0.0, 1.0]},
        {"v": 1, "dim": [2], "data": [0.0, 1.0]}
    ]
}"#;

fn plan_args(problem: std::path::PathBuf) -> PlanArgs {
    PlanArgs {
        problem,
        config: None,
        gamma: None,
        alpha: None,
        action_selection: None,
        seed: Some(42),
        inductive: false,
        top: 3,
        json: true,
        export: None,
    }
}

#[test]
fn plan_exports_one_row_per_policy() {
    let dir = tempdir().unwrap();
    let problem_path = dir.path().join("problem.json");
    fs::write(&problem_path, PROBLEM).unwrap();
    let csv_path = dir.path().join("scores.csv");

    let mut args = plan_args(problem_path);
    args.export = Some(csv_path.clone());
    execute(args).unwrap();

    let text = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("policy,action_f0,q_pi,neg_efe,"));
    assert_eq!(lines.len(), 1 + 4);
    let q_total: f64 = lines[1..]
        .iter()
        .map(|line| line.split(',').nth(2).unwrap().parse::<f64>().unwrap())
        .sum();
    assert!((q_total - 1.0).abs() < 1e-9);
}

#[test]
fn plan_accepts_config_file_and_inductive_flag() {
    let dir = tempdir().unwrap();
    let problem_path = dir.path().join("problem.json");
    fs::write(&problem_path, PROBLEM).unwrap();
    let config_path = dir.path().join("config.json");
    fs::write(
        &config_path,
        r#"{"gamma": 4.0, "action_selection": "stochastic", "inductive": {"depth": 2, "threshold": 0.5}}"#,
    )
    .unwrap();

    let mut args = plan_args(problem_path);
    args.config = Some(config_path);
    args.inductive = true;
    execute(args).unwrap();
}

#[test]
fn plan_rejects_malformed_config() {
    let dir = tempdir().unwrap();
    let problem_path = dir.path().join("problem.json");
    fs::write(&problem_path, PROBLEM).unwrap();
    let config_path = dir.path().join("config.json");
    fs::write(&config_path, r#"{"action_selection": "softmax"}"#).unwrap();

    let mut args = plan_args(problem_path);
    args.config = Some(config_path);
    assert!(execute(args).is_err());
}

#[test]
fn reachability_requires_goals() {
    let dir = tempdir().unwrap();
    let with_goals = dir.path().join("with_goals.json");
    fs::write(&with_goals, PROBLEM).unwrap();

    let mut problem: PlanningProblem = serde_json::from_str(PROBLEM).unwrap();
    problem.goals = None;
    let without_goals = dir.path().join("without_goals.json");
    fs::write(&without_goals, serde_json::to_string(&problem).unwrap()).unwrap();

    let args = |problem| ReachabilityArgs {
        problem,
        config: None,
        threshold: None,
        depth: Some(2),
        json: true,
    };
    reachability::execute(args(with_goals)).unwrap();
    assert!(reachability::execute(args(without_goals)).is_err());
}

#[test]
fn goals_are_ignored_unless_inductive_term_is_on() {
    let dir = tempdir().unwrap();
    let problem_path = dir.path().join("coupled.json");
    fs::write(&problem_path, COUPLED_PROBLEM).unwrap();

    execute(plan_args(problem_path.clone())).unwrap();

    let mut args = plan_args(problem_path);
    args.inductive = true;
    assert!(execute(args).is_err());
}

#[test]
fn unseeded_stochastic_plan_still_runs() {
    let dir = tempdir().unwrap();
    let problem_path = dir.path().join("problem.json");
    fs::write(&problem_path, PROBLEM).unwrap();

    let mut args = plan_args(problem_path);
    args.seed = None;
    args.action_selection = Some(aif_control::ActionSelection::Stochastic);
    execute(args).unwrap();
}
