//! Turns a [`SimConfig`] into a ready-to-run simulation.
use anyhow::{Context, Result};

use crate::config::SimConfig;
use crate::demo;
use crate::net::{NetError, PlaceId, io};
use crate::report::RunReport;
use crate::runner::{NetRunner, RunError};
use crate::sequence::{random_sequence, seeded_rng};

#[derive(Debug)]
pub struct Simulation {
    pub runner: NetRunner,
    pub observed: Vec<PlaceId>,
    pub sequence: Vec<String>,
}

impl Simulation {
    pub fn from_config(config: &SimConfig) -> Result<Self> {
        let (net, all_places) = match &config.net {
            Some(path) => {
                let net = io::load_net(path, config.consumption, config.arc_dedup)
                    .with_context(|| format!("Failed to load net from {:?}", path))?;
                let places = net.place_ids();
                (net, places)
            }
            None => demo::fork_join(&config.marking, config.consumption)
                .context("Failed to build the fork/join net")?,
        };

        let observed = match &config.observe {
            Some(names) => names
                .iter()
                .map(|name| {
                    net.place_id(name)
                        .ok_or_else(|| NetError::UnknownPlaceName(name.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => all_places,
        };

        let sequence = match &config.sequence {
            Some(sequence) => sequence.clone(),
            None => {
                let ids: Vec<&str> = net.transition_ids().collect();
                random_sequence(&ids, config.firings, &mut seeded_rng(config.seed))
            }
        };
        log::debug!("firing sequence: {:?}", sequence);

        Ok(Self {
            runner: NetRunner::new(net),
            observed,
            sequence,
        })
    }

    pub fn run(&mut self) -> Result<RunReport, RunError> {
        self.runner.run(&self.sequence, &self.observed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::FireOutcome;

    #[test]
    fn explicit_sequence_on_fork_join() {
        let config = SimConfig {
            sequence: Some(vec!["t1".into(), "t1".into(), "t2".into(), "t1".into()]),
            ..SimConfig::default()
        };
        let mut sim = Simulation::from_config(&config).unwrap();
        let report = sim.run().unwrap();

        assert_eq!(
            report.outcomes(),
            vec![
                FireOutcome::Fired,
                FireOutcome::Blocked,
                FireOutcome::Fired,
                FireOutcome::Fired
            ]
        );
        assert_eq!(report.final_holdings, vec![0, 1, 1, 1]);
    }

    #[test]
    fn seeded_runs_repeat() {
        let config = SimConfig {
            firings: 25,
            seed: Some(3),
            ..SimConfig::default()
        };
        let a = Simulation::from_config(&config).unwrap().run().unwrap();
        let b = Simulation::from_config(&config).unwrap().run().unwrap();
        assert_eq!(a.steps.len(), 25);
        assert_eq!(a, b);
    }

    #[test]
    fn observe_selects_places_by_name() {
        let config = SimConfig {
            sequence: Some(vec!["t1".into()]),
            observe: Some(vec!["P3".into(), "P1".into()]),
            ..SimConfig::default()
        };
        let report = Simulation::from_config(&config).unwrap().run().unwrap();
        assert_eq!(report.observed, vec!["P3", "P1"]);
        assert_eq!(report.final_holdings, vec![0, 1]);
    }

    #[test]
    fn unknown_observed_name_is_an_error() {
        let config = SimConfig {
            observe: Some(vec!["P9".into()]),
            ..SimConfig::default()
        };
        assert!(Simulation::from_config(&config).is_err());
    }

    #[test]
    fn loads_net_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mutex.ron");
        std::fs::write(
            &path,
            r#"(
                places: [(name: "lock", tokens: 1), (name: "held")],
                transitions: [
                    (id: "acquire", consume: [(place: "lock")], produce: [(place: "held")]),
                    (id: "release", consume: [(place: "held")], produce: [(place: "lock")]),
                ],
            )"#,
        )
        .unwrap();
        let config = SimConfig {
            net: Some(path),
            sequence: Some(vec!["acquire".into(), "acquire".into(), "release".into()]),
            ..SimConfig::default()
        };

        let report = Simulation::from_config(&config).unwrap().run().unwrap();
        assert_eq!(report.fired(), 2);
        assert_eq!(report.blocked(), 1);
        assert_eq!(report.final_holdings, vec![1, 0]);
    }
}
