//! Drives a firing sequence over a net, one transition at a time.
use thiserror::Error;

use crate::net::{FireOutcome, Net, NetError, PlaceId, Weight};
use crate::report::{RunReport, StepRecord};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("step {step}: unknown transition `{name}`")]
    UnknownTransition { name: String, step: usize },
    #[error("observed place {0:?} does not exist")]
    UnknownPlace(PlaceId),
    /// A firing failed while staging. `report` covers the steps committed
    /// before it and the holdings they left behind.
    #[error("run stopped at step {step}: {source}")]
    Aborted {
        step: usize,
        report: Box<RunReport>,
        #[source]
        source: NetError,
    },
}

#[derive(Debug, Clone)]
pub struct NetRunner {
    net: Net,
}

impl NetRunner {
    pub fn new(net: Net) -> Self {
        Self { net }
    }

    pub fn net(&self) -> &Net {
        &self.net
    }

    pub fn into_net(self) -> Net {
        self.net
    }

    /// Fires `sequence` in order, recording the holdings of `observed` after
    /// every step.
    ///
    /// Identifiers and observed places are checked before the first firing, so
    /// an unknown name fails the run without touching any place. Blocked steps
    /// are recorded and the run moves on; there is no retry or lookahead.
    pub fn run<S: AsRef<str>>(
        &mut self,
        sequence: &[S],
        observed: &[PlaceId],
    ) -> Result<RunReport, RunError> {
        if let Some((step, name)) = sequence
            .iter()
            .map(AsRef::as_ref)
            .enumerate()
            .find(|(_, name)| self.net.transition(name).is_none())
        {
            return Err(RunError::UnknownTransition {
                name: name.to_owned(),
                step,
            });
        }
        if let Some(&place) = observed
            .iter()
            .find(|&&place| self.net.place(place).is_none())
        {
            return Err(RunError::UnknownPlace(place));
        }

        let mut report = RunReport {
            sequence: sequence.iter().map(|name| name.as_ref().to_owned()).collect(),
            observed: observed
                .iter()
                .map(|&place| self.net.places()[place].name.clone())
                .collect(),
            start: self.snapshot(observed),
            steps: Vec::with_capacity(sequence.len()),
            final_holdings: Vec::new(),
        };
        log::info!("start {:?}", report.start);

        for (step, name) in sequence.iter().map(AsRef::as_ref).enumerate() {
            let outcome = match self.net.fire(name) {
                Ok(outcome) => outcome,
                Err(source) => {
                    log::warn!("{name} failed at step {step}: {source}");
                    report.final_holdings = self.snapshot(observed);
                    return Err(RunError::Aborted {
                        step,
                        report: Box::new(report),
                        source,
                    });
                }
            };
            let holdings = self.snapshot(observed);
            match outcome {
                FireOutcome::Fired => log::info!("{name} fired => {holdings:?}"),
                FireOutcome::Blocked => log::info!("{name} fizzled"),
            }
            report.steps.push(StepRecord {
                step,
                transition: name.to_owned(),
                outcome,
                holdings,
            });
        }

        report.final_holdings = self.snapshot(observed);
        log::info!(
            "final {:?} ({} fired, {} blocked)",
            report.final_holdings,
            report.fired(),
            report.blocked()
        );
        Ok(report)
    }

    /// Holdings of places already checked against the table.
    fn snapshot(&self, observed: &[PlaceId]) -> Vec<Weight> {
        observed
            .iter()
            .map(|&place| self.net.places()[place].holding())
            .collect()
    }
}
