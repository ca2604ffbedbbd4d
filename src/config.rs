use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::net::{ArcDedup, ConsumptionPolicy};
use crate::options::Options;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Length of the random firing sequence.
    #[serde(default = "default_firings")]
    pub firings: usize,
    /// Initial holdings of the fork/join net. Ignored when `net` is set.
    #[serde(default = "default_marking")]
    pub marking: Vec<i64>,
    #[serde(default)]
    pub seed: Option<u64>,
    /// Explicit firing sequence; replaces the random one.
    #[serde(default)]
    pub sequence: Option<Vec<String>>,
    /// JSON or RON net description to run instead of the fork/join net.
    #[serde(default)]
    pub net: Option<PathBuf>,
    #[serde(default)]
    pub consumption: ConsumptionPolicy,
    #[serde(default)]
    pub arc_dedup: ArcDedup,
    /// Place names to report. All places when unset.
    #[serde(default)]
    pub observe: Option<Vec<String>>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            firings: default_firings(),
            marking: default_marking(),
            seed: None,
            sequence: None,
            net: None,
            consumption: ConsumptionPolicy::default(),
            arc_dedup: ArcDedup::default(),
            observe: None,
        }
    }
}

impl SimConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: SimConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Command-line values win over the file.
    pub fn apply(&mut self, options: &Options) {
        if let Some(firings) = options.firings {
            self.firings = firings;
        }
        if let Some(marking) = &options.marking {
            self.marking = marking.clone();
        }
        if options.seed.is_some() {
            self.seed = options.seed;
        }
        if let Some(sequence) = &options.sequence {
            self.sequence = Some(sequence.clone());
        }
        if let Some(net) = &options.net {
            self.net = Some(net.clone());
        }
        if let Some(consumption) = options.consumption {
            self.consumption = consumption;
        }
        if let Some(arc_dedup) = options.arc_dedup {
            self.arc_dedup = arc_dedup;
        }
        if let Some(observe) = &options.observe {
            self.observe = Some(observe.clone());
        }
    }
}

fn default_firings() -> usize {
    10
}

fn default_marking() -> Vec<i64> {
    vec![1, 0, 0, 0]
}
