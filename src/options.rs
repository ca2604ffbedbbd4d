//! Parsing Options.
//! Flags come from `PNSIM_FLAGS` first, then the command line; later values win.

use clap::{Arg, Command, value_parser};
use std::error::Error;
use std::path::PathBuf;

use crate::net::{ArcDedup, ConsumptionPolicy};
use crate::sequence::parse_sequence;

pub const DEFAULT_CONFIG: &str = "pnsim.toml";

fn make_options_parser() -> Command {
    Command::new("pnsim")
        .no_binary_name(true)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Runs a firing sequence over a place/transition net")
        .arg(
            Arg::new("firings")
                .short('f')
                .long("firings")
                .value_name("N")
                .help("Length of the random firing sequence")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("marking")
                .short('m')
                .long("marking")
                .value_name("TOKENS")
                .help("Initial holdings of P0 P1 P2 P3 [...]")
                .num_args(1..)
                .allow_negative_numbers(true)
                .value_parser(value_parser!(i64)),
        )
        .arg(
            Arg::new("seed")
                .short('s')
                .long("seed")
                .help("Seed for the random firing sequence")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("sequence")
                .long("sequence")
                .value_name("T1 => T2 ...")
                .help("Explicit firing sequence instead of a random one"),
        )
        .arg(
            Arg::new("net")
                .short('n')
                .long("net")
                .value_name("FILE")
                .help("JSON or RON net description")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .default_value(DEFAULT_CONFIG)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("consumption")
                .long("consumption")
                .help("How competing consuming arcs on one place are checked")
                .value_parser(["aggregated", "independent"]),
        )
        .arg(
            Arg::new("arc-dedup")
                .long("arc-dedup")
                .value_parser(["preserve", "collapse"]),
        )
        .arg(
            Arg::new("observe")
                .long("observe")
                .value_name("PLACES")
                .help("Comma separated place names to report")
                .value_delimiter(','),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Write the run report as JSON")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("dot")
                .long("dot")
                .value_name("FILE")
                .help("Write the final net as Graphviz DOT")
                .value_parser(value_parser!(PathBuf)),
        )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub firings: Option<usize>,
    pub marking: Option<Vec<i64>>,
    pub seed: Option<u64>,
    pub sequence: Option<Vec<String>>,
    pub net: Option<PathBuf>,
    pub config: PathBuf,
    pub consumption: Option<ConsumptionPolicy>,
    pub arc_dedup: Option<ArcDedup>,
    pub observe: Option<Vec<String>>,
    pub output: Option<PathBuf>,
    pub dot: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            firings: None,
            marking: None,
            seed: None,
            sequence: None,
            net: None,
            config: PathBuf::from(DEFAULT_CONFIG),
            consumption: None,
            arc_dedup: None,
            observe: None,
            output: None,
            dot: None,
        }
    }
}

impl Options {
    pub fn parse_from_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let flags = shellwords::split(s)?;
        Ok(Self::parse_from_args(&flags)?)
    }

    /// Parses `env_flags` (shell quoted) followed by `args`.
    pub fn parse_from_env_and_args(
        env_flags: &str,
        args: &[String],
    ) -> Result<Self, Box<dyn Error>> {
        let mut flags = shellwords::split(env_flags)?;
        flags.extend_from_slice(args);
        Ok(Self::parse_from_args(&flags)?)
    }

    pub fn parse_from_args(flags: &[String]) -> Result<Self, clap::Error> {
        let matches = make_options_parser().try_get_matches_from(flags.iter())?;

        Ok(Options {
            firings: matches.get_one::<usize>("firings").copied(),
            marking: matches
                .get_many::<i64>("marking")
                .map(|values| values.copied().collect()),
            seed: matches.get_one::<u64>("seed").copied(),
            sequence: matches
                .get_one::<String>("sequence")
                .map(|text| parse_sequence(text)),
            net: matches.get_one::<PathBuf>("net").cloned(),
            config: matches
                .get_one::<PathBuf>("config")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG)),
            consumption: matches
                .get_one::<String>("consumption")
                .and_then(|value| value.parse().ok()),
            arc_dedup: matches
                .get_one::<String>("arc-dedup")
                .and_then(|value| value.parse().ok()),
            observe: matches
                .get_many::<String>("observe")
                .map(|values| values.cloned().collect()),
            output: matches.get_one::<PathBuf>("output").cloned(),
            dot: matches.get_one::<PathBuf>("dot").cloned(),
        })
    }
}
