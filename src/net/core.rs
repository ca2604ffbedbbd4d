//! Runtime view of a net: the place table, the transition map and firing.
use std::fmt::{self, Write as FmtWrite};
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use thiserror::Error;

use crate::net::ids::PlaceId;
use crate::net::index_vec::{Idx, IndexVec};
use crate::net::structure::{ArcDirection, Marking, Place, Weight};
use crate::net::transition::{ConsumptionPolicy, FireOutcome, Transition};

/// Rejected construction input. A net that produced one of these never runs.
#[derive(Debug, Error)]
pub enum NetError {
    #[error("arc on place {place:?} has a non-positive amount")]
    NonPositiveAmount { place: PlaceId },
    #[error("place `{place}` has negative initial holding {holding}")]
    NegativeHolding { place: String, holding: i64 },
    #[error("arc references unknown place {0:?}")]
    UnknownPlace(PlaceId),
    #[error("no place named `{0}`")]
    UnknownPlaceName(String),
    #[error("place name `{0}` is used twice")]
    DuplicatePlace(String),
    #[error("arc on place {place:?} is listed where a {expected:?} arc belongs")]
    MisplacedArc {
        place: PlaceId,
        expected: ArcDirection,
    },
    #[error("transition `{0}` is defined twice")]
    DuplicateTransition(String),
    #[error("unknown transition `{0}`")]
    UnknownTransition(String),
    #[error("marking has {found} entries but the net needs {expected}")]
    MarkingLength { expected: usize, found: usize },
    #[error("transition `{transition}` could not be applied: {source}")]
    Fire {
        transition: String,
        #[source]
        source: FireError,
    },
}

/// Arithmetic failure while staging a firing. Nothing was committed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FireError {
    #[error("arc references unknown place {0:?}")]
    UnknownPlace(PlaceId),
    #[error("place {place:?} holds {holding} tokens but an arc takes {amount}")]
    Overdrawn {
        place: PlaceId,
        holding: Weight,
        amount: Weight,
    },
    #[error("place {place:?} overflows when {amount} tokens are added")]
    Overflow { place: PlaceId, amount: Weight },
}

#[derive(Clone, Default)]
pub struct Net {
    places: IndexVec<PlaceId, Place>,
    transitions: IndexMap<String, Transition>,
    policy: ConsumptionPolicy,
}

impl fmt::Debug for Net {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Net")
            .field("places", &self.places)
            .field("transitions", &self.transitions)
            .field("policy", &self.policy)
            .finish()
    }
}

impl Net {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ConsumptionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> ConsumptionPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: ConsumptionPolicy) {
        self.policy = policy;
    }

    pub fn add_place(&mut self, place: Place) -> PlaceId {
        self.places.push(place)
    }

    /// Registers `transition` under `id` once every arc's place exists.
    pub fn add_transition(
        &mut self,
        id: impl Into<String>,
        transition: Transition,
    ) -> Result<(), NetError> {
        let id = id.into();
        if self.transitions.contains_key(&id) {
            return Err(NetError::DuplicateTransition(id));
        }
        if let Some(arc) = transition
            .arcs()
            .iter()
            .find(|arc| !self.places.contains(arc.place()))
        {
            return Err(NetError::UnknownPlace(arc.place()));
        }
        self.transitions.insert(id, transition);
        Ok(())
    }

    pub fn place(&self, place: PlaceId) -> Option<&Place> {
        self.places.get(place)
    }

    pub fn place_id(&self, name: &str) -> Option<PlaceId> {
        self.places
            .iter_enumerated()
            .find_map(|(id, place)| (place.name == name).then_some(id))
    }

    pub fn places(&self) -> &IndexVec<PlaceId, Place> {
        &self.places
    }

    pub fn place_ids(&self) -> Vec<PlaceId> {
        self.places.indices().collect()
    }

    pub fn transition(&self, id: &str) -> Option<&Transition> {
        self.transitions.get(id)
    }

    pub fn transition_ids(&self) -> impl Iterator<Item = &str> {
        self.transitions.keys().map(String::as_str)
    }

    pub fn places_len(&self) -> usize {
        self.places.len()
    }

    pub fn transitions_len(&self) -> usize {
        self.transitions.len()
    }

    pub fn marking(&self) -> Marking {
        Marking::new(self.places.iter().map(Place::holding).collect())
    }

    /// Holdings of `observed`, in the order given. `None` if any handle is
    /// not in the place table.
    pub fn holdings(&self, observed: &[PlaceId]) -> Option<Vec<Weight>> {
        observed
            .iter()
            .map(|&place| self.places.get(place).map(Place::holding))
            .collect()
    }

    pub fn is_enabled(&self, id: &str) -> Result<bool, NetError> {
        let transition = self
            .transitions
            .get(id)
            .ok_or_else(|| NetError::UnknownTransition(id.to_owned()))?;
        Ok(transition.is_enabled(&self.places, self.policy))
    }

    pub fn enabled_transitions(&self) -> Vec<&str> {
        self.transitions
            .iter()
            .filter(|(_, transition)| transition.is_enabled(&self.places, self.policy))
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Attempts one firing of the transition registered under `id`.
    ///
    /// A blocked firing is `Ok(FireOutcome::Blocked)`; only an unknown
    /// identifier or a staging failure is an error.
    pub fn fire(&mut self, id: &str) -> Result<FireOutcome, NetError> {
        let transition = self
            .transitions
            .get(id)
            .ok_or_else(|| NetError::UnknownTransition(id.to_owned()))?;
        let outcome = transition
            .fire(&mut self.places, self.policy)
            .map_err(|source| NetError::Fire {
                transition: id.to_owned(),
                source,
            })?;
        log::debug!("{id}: {outcome}");
        Ok(outcome)
    }

    pub fn to_dot(&self) -> String {
        let mut dot = String::new();
        let _ = writeln!(&mut dot, "digraph PetriNet {{");
        let _ = writeln!(&mut dot, "    rankdir=LR;");
        let _ = writeln!(&mut dot, "    node [fontname=\"Helvetica\"];");

        for (place_id, place) in self.places.iter_enumerated() {
            let _ = writeln!(
                &mut dot,
                "    place_{} [label=\"{}\\n{}\", shape=circle, style=filled, fillcolor=\"#e3f2fd\"];",
                place_id.index(),
                escape_label(&place.name),
                place.holding()
            );
        }

        for (idx, (id, transition)) in self.transitions.iter().enumerate() {
            let node = format!("trans_{idx}");
            let _ = writeln!(
                &mut dot,
                "    {node} [label=\"{}\", shape=box, style=filled, fillcolor=\"#ffe0b2\"];",
                escape_label(id)
            );
            for arc in transition.arcs() {
                let place = format!("place_{}", arc.place().index());
                let (from, to) = match arc.direction() {
                    ArcDirection::PlaceToTransition => (place.as_str(), node.as_str()),
                    ArcDirection::TransitionToPlace => (node.as_str(), place.as_str()),
                };
                if arc.amount() == 1 {
                    let _ = writeln!(&mut dot, "    {from} -> {to};");
                } else {
                    let _ = writeln!(&mut dot, "    {from} -> {to} [label=\"{}\"];", arc.amount());
                }
            }
        }

        let _ = writeln!(&mut dot, "}}");
        dot
    }

    pub fn write_dot<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_dot())
    }
}

fn escape_label(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
