//! The four-place fork/join scenarios, driven through the public API.

use pnsim::demo::fork_join;
use pnsim::net::{ConsumptionPolicy, FireOutcome, Net, PlaceId};
use pnsim::{NetRunner, RunError};

fn fork_join_net() -> (Net, Vec<PlaceId>) {
    fork_join(&[1, 0, 0, 0], ConsumptionPolicy::default()).unwrap()
}

#[test]
fn scenario_1_t1_forks_the_token() {
    let (mut net, ps) = fork_join_net();

    assert_eq!(net.fire("t1").unwrap(), FireOutcome::Fired);
    assert_eq!(net.holdings(&ps).unwrap(), vec![0, 1, 1, 0]);
}

#[test]
fn scenario_2_t1_blocks_on_empty_p0() {
    let (mut net, ps) = fork_join_net();
    net.fire("t1").unwrap();
    let before = net.marking();

    assert_eq!(net.fire("t1").unwrap(), FireOutcome::Blocked);
    assert_eq!(net.marking(), before);
    assert_eq!(net.holdings(&ps).unwrap(), vec![0, 1, 1, 0]);
}

#[test]
fn scenario_3_t2_joins_and_returns_token_to_p0() {
    let (mut net, ps) = fork_join_net();
    net.fire("t1").unwrap();

    assert_eq!(net.fire("t2").unwrap(), FireOutcome::Fired);
    assert_eq!(net.holdings(&ps).unwrap(), vec![1, 0, 0, 1]);
}

#[test]
fn scenario_4_unknown_identifier_is_fatal() {
    let (net, ps) = fork_join_net();
    let mut runner = NetRunner::new(net);

    let err = runner.run(&["t1", "t3"], &ps).unwrap_err();

    assert!(matches!(
        err,
        RunError::UnknownTransition { ref name, step: 1 } if name == "t3"
    ));
    assert_eq!(runner.net().holdings(&ps).unwrap(), vec![1, 0, 0, 0]);
}

#[test]
fn runner_reports_every_step() {
    let (net, ps) = fork_join_net();
    let mut runner = NetRunner::new(net);

    let report = runner.run(&["t1", "t1", "t2", "t1"], &ps).unwrap();

    assert_eq!(
        report.outcomes(),
        vec![
            FireOutcome::Fired,
            FireOutcome::Blocked,
            FireOutcome::Fired,
            FireOutcome::Fired,
        ]
    );
    assert_eq!(report.start, vec![1, 0, 0, 0]);
    assert_eq!(report.steps[1].holdings, vec![0, 1, 1, 0]);
    assert_eq!(report.final_holdings, vec![0, 1, 1, 1]);

    let text = report.to_string();
    assert!(text.contains("t1 => t1 => t2 => t1"));
    assert!(text.contains("t1 ...fizzled."));
    assert!(text.contains("final [0, 1, 1, 1]"));
}

#[test]
fn boundary_amount_equal_to_holding_fires() {
    let (mut net, ps) = fork_join(&[1, 1, 1, 0], ConsumptionPolicy::default()).unwrap();

    assert!(net.is_enabled("t2").unwrap());
    assert_eq!(net.fire("t2").unwrap(), FireOutcome::Fired);
    assert_eq!(net.holdings(&ps).unwrap(), vec![2, 0, 0, 1]);
    assert!(!net.is_enabled("t2").unwrap());
}
