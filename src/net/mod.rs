//! # Place/transition nets
//!
//! A net is a table of places, each holding a token count `M[p]`, and a set of
//! named transitions. Every transition owns consuming arcs `(p, w)` and
//! producing arcs `(p, w)` with `w > 0`.
//!
//! * A transition is **enabled** under `M` when each place it consumes from
//!   holds at least the tokens asked of it. With
//!   [`ConsumptionPolicy::Aggregated`] the amounts of several arcs on one
//!   place are summed first; with [`ConsumptionPolicy::Independent`] each arc
//!   is compared with `M[p]` on its own.
//! * **Firing** an enabled transition subtracts every consuming amount and adds
//!   every producing amount as one step. A transition that is not enabled is
//!   *blocked*: nothing changes and no error is raised.
//!
//! ## Example
//!
//! ```rust
//! use pnsim::net::*;
//!
//! let mut net = Net::empty();
//! let p0 = net.add_place(Place::new("p0", 1));
//! let p1 = net.add_place(Place::new("p1", 0));
//! let t0 = Transition::new([Arc::consuming(p0)], [Arc::producing(p1)]).unwrap();
//! net.add_transition("t0", t0).unwrap();
//!
//! assert_eq!(net.enabled_transitions(), vec!["t0"]);
//! assert_eq!(net.fire("t0").unwrap(), FireOutcome::Fired);
//! assert_eq!(net.fire("t0").unwrap(), FireOutcome::Blocked);
//! assert_eq!(net.holdings(&[p0, p1]).unwrap(), vec![0, 1]);
//! ```

pub mod core;
pub mod ids;
pub mod index_vec;
pub mod io;
pub mod structure;
pub mod transition;

pub use self::core::{FireError, Net, NetError};
pub use ids::PlaceId;
pub use index_vec::{Idx, IndexVec};
pub use structure::{Arc, ArcDirection, Marking, Place, Weight};
pub use transition::{ArcDedup, ConsumptionPolicy, FireOutcome, Transition};
