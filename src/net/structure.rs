//! Static net elements: places, arcs and markings.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::net::core::{FireError, NetError};
use crate::net::ids::PlaceId;
use crate::net::index_vec::IndexVec;

pub type Weight = u64;

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Debug)]
pub struct Place {
    pub name: String,
    holding: Weight,
}

impl Place {
    pub fn new(name: impl Into<String>, holding: Weight) -> Self {
        Self {
            name: name.into(),
            holding,
        }
    }

    /// Builds a place from an externally supplied, possibly negative, marking.
    pub fn from_signed(name: impl Into<String>, holding: i64) -> Result<Self, NetError> {
        let name = name.into();
        match Weight::try_from(holding) {
            Ok(holding) => Ok(Self::new(name, holding)),
            Err(_) => Err(NetError::NegativeHolding { place: name, holding }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn holding(&self) -> Weight {
        self.holding
    }

    pub(crate) fn set_holding(&mut self, holding: Weight) {
        self.holding = holding;
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ArcDirection {
    PlaceToTransition,
    TransitionToPlace,
}

/// A weighted edge between one place and the transition owning the arc.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Arc {
    /// Removes `amount` tokens from `place`; blocks when they are missing.
    Consuming { place: PlaceId, amount: Weight },
    /// Adds `amount` tokens to `place`; never blocks.
    Producing { place: PlaceId, amount: Weight },
}

impl Arc {
    pub fn consuming(place: PlaceId) -> Self {
        Arc::Consuming { place, amount: 1 }
    }

    pub fn producing(place: PlaceId) -> Self {
        Arc::Producing { place, amount: 1 }
    }

    pub fn with_amount(self, amount: Weight) -> Result<Self, NetError> {
        if amount == 0 {
            return Err(NetError::NonPositiveAmount {
                place: self.place(),
            });
        }
        Ok(match self {
            Arc::Consuming { place, .. } => Arc::Consuming { place, amount },
            Arc::Producing { place, .. } => Arc::Producing { place, amount },
        })
    }

    pub fn place(&self) -> PlaceId {
        match *self {
            Arc::Consuming { place, .. } | Arc::Producing { place, .. } => place,
        }
    }

    pub fn amount(&self) -> Weight {
        match *self {
            Arc::Consuming { amount, .. } | Arc::Producing { amount, .. } => amount,
        }
    }

    pub fn direction(&self) -> ArcDirection {
        match self {
            Arc::Consuming { .. } => ArcDirection::PlaceToTransition,
            Arc::Producing { .. } => ArcDirection::TransitionToPlace,
        }
    }

    pub fn is_consuming(&self) -> bool {
        matches!(self, Arc::Consuming { .. })
    }

    /// Whether this arc alone could act on the current holdings.
    ///
    /// Pure: reads the place and nothing else. The comparison is inclusive, so
    /// a consuming arc asking for exactly the held amount is enabled.
    pub fn is_enabled(&self, places: &IndexVec<PlaceId, Place>) -> bool {
        match *self {
            Arc::Consuming { place, amount } => places
                .get(place)
                .is_some_and(|place| place.holding >= amount),
            Arc::Producing { .. } => true,
        }
    }

    /// Applies the arc to a staged holding of its place.
    ///
    /// Checks nothing beyond arithmetic; callers decide feasibility first.
    pub fn trigger(&self, holding: &mut Weight) -> Result<(), FireError> {
        match *self {
            Arc::Consuming { place, amount } => {
                *holding = holding.checked_sub(amount).ok_or(FireError::Overdrawn {
                    place,
                    holding: *holding,
                    amount,
                })?;
            }
            Arc::Producing { place, amount } => {
                *holding = holding
                    .checked_add(amount)
                    .ok_or(FireError::Overflow { place, amount })?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Arc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arc")
            .field("place", &self.place())
            .field("amount", &self.amount())
            .field("direction", &self.direction())
            .finish()
    }
}

/// Snapshot of every place's holding.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Marking(pub IndexVec<PlaceId, Weight>);

impl Marking {
    pub fn new(holdings: IndexVec<PlaceId, Weight>) -> Self {
        Self(holdings)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlaceId, &Weight)> {
        self.0.iter_enumerated()
    }

    pub fn tokens(&self, place: PlaceId) -> Weight {
        self.0[place]
    }

    /// Sum of all holdings, widened so it cannot overflow.
    pub fn total(&self) -> u128 {
        self.0.iter().map(|&tokens| u128::from(tokens)).sum()
    }

    pub fn into_vec(self) -> Vec<Weight> {
        self.0.into_vec()
    }
}

impl fmt::Debug for Marking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (place, tokens) in self.iter() {
            map.entry(&place, tokens);
        }
        map.finish()
    }
}
