//! Run traces: per-step outcomes and the observed holdings.
use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::net::{FireOutcome, Weight};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: usize,
    pub transition: String,
    pub outcome: FireOutcome,
    /// Observed holdings after this step.
    pub holdings: Vec<Weight>,
}

/// Trace of one run: what was asked, what fired, and the observed holdings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub sequence: Vec<String>,
    /// Names of the observed places, in observation order.
    pub observed: Vec<String>,
    pub start: Vec<Weight>,
    pub steps: Vec<StepRecord>,
    pub final_holdings: Vec<Weight>,
}

impl RunReport {
    pub fn outcomes(&self) -> Vec<FireOutcome> {
        self.steps.iter().map(|step| step.outcome).collect()
    }

    pub fn fired(&self) -> usize {
        self.steps.iter().filter(|step| step.outcome.is_fired()).count()
    }

    pub fn blocked(&self) -> usize {
        self.steps.len() - self.fired()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Using firing sequence:")?;
        writeln!(f, "{}", self.sequence.iter().join(" => "))?;
        writeln!(f, "start {:?}", self.start)?;
        writeln!(f)?;

        for step in &self.steps {
            match step.outcome {
                FireOutcome::Fired => {
                    writeln!(f, "{} fired!", step.transition)?;
                    writeln!(f, "  =>  {:?}", step.holdings)?;
                }
                FireOutcome::Blocked => writeln!(f, "{} ...fizzled.", step.transition)?,
            }
        }

        writeln!(f)?;
        writeln!(f, "final {:?}", self.final_holdings)?;
        write!(f, "{} fired, {} fizzled", self.fired(), self.blocked())
    }
}
