#![warn(non_snake_case)]

pub mod config;
pub mod demo;
pub mod driver;
pub mod net;
pub mod options;
pub mod report;
pub mod runner;
pub mod sequence;

pub use net::{Arc, FireOutcome, Net, NetError, Place, PlaceId, Transition};
pub use report::RunReport;
pub use runner::{NetRunner, RunError};
