//! Transitions and the atomic firing rule.
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::net::core::{FireError, NetError};
use crate::net::ids::PlaceId;
use crate::net::index_vec::IndexVec;
use crate::net::structure::{Arc, ArcDirection, Place, Weight};

type ArcList = SmallVec<[Arc; 4]>;

/// How the consuming arcs of one transition are checked against holdings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsumptionPolicy {
    /// Demand on each place is summed across the transition's consuming arcs
    /// before it is compared with the holding.
    #[default]
    Aggregated,
    /// Every consuming arc is compared with the pre-firing holding on its own.
    /// Two arcs drawing on the same place can both pass; the overdraw is then
    /// caught while staging and reported as [`FireError::Overdrawn`].
    Independent,
}

impl FromStr for ConsumptionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aggregated" => Ok(Self::Aggregated),
            "independent" => Ok(Self::Independent),
            other => Err(format!("unknown consumption policy `{other}`")),
        }
    }
}

/// What to do with structurally identical arcs handed to one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArcDedup {
    #[default]
    Preserve,
    /// Keep the first arc per `(place, amount, direction)`.
    Collapse,
}

impl FromStr for ArcDedup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preserve" => Ok(Self::Preserve),
            "collapse" => Ok(Self::Collapse),
            other => Err(format!("unknown arc dedup mode `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FireOutcome {
    Fired,
    Blocked,
}

impl FireOutcome {
    pub fn is_fired(self) -> bool {
        self == FireOutcome::Fired
    }
}

impl fmt::Display for FireOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FireOutcome::Fired => f.write_str("fired"),
            FireOutcome::Blocked => f.write_str("blocked"),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Transition {
    consuming: ArcList,
    /// Consuming arcs followed by producing arcs. Fixed after construction.
    arcs: ArcList,
}

impl Transition {
    pub fn new(
        consuming: impl IntoIterator<Item = Arc>,
        producing: impl IntoIterator<Item = Arc>,
    ) -> Result<Self, NetError> {
        Self::with_dedup(consuming, producing, ArcDedup::Preserve)
    }

    pub fn with_dedup(
        consuming: impl IntoIterator<Item = Arc>,
        producing: impl IntoIterator<Item = Arc>,
        dedup: ArcDedup,
    ) -> Result<Self, NetError> {
        let mut consuming: ArcList = consuming.into_iter().collect();
        let producing: ArcList = producing.into_iter().collect();
        // Variants can be built without `Arc::with_amount`, so amounts are
        // checked again here.
        if let Some(arc) = consuming
            .iter()
            .chain(producing.iter())
            .find(|arc| arc.amount() == 0)
        {
            return Err(NetError::NonPositiveAmount { place: arc.place() });
        }
        if let Some(arc) = consuming.iter().find(|arc| !arc.is_consuming()) {
            return Err(NetError::MisplacedArc {
                place: arc.place(),
                expected: ArcDirection::PlaceToTransition,
            });
        }
        if dedup == ArcDedup::Collapse {
            consuming = consuming.into_iter().unique().collect();
        }

        let mut arcs = consuming.clone();
        for arc in producing {
            if dedup == ArcDedup::Collapse && arcs.contains(&arc) {
                continue;
            }
            if arc.is_consuming() {
                return Err(NetError::MisplacedArc {
                    place: arc.place(),
                    expected: ArcDirection::TransitionToPlace,
                });
            }
            arcs.push(arc);
        }

        Ok(Self { consuming, arcs })
    }

    pub fn consuming_arcs(&self) -> &[Arc] {
        &self.consuming
    }

    pub fn arcs(&self) -> &[Arc] {
        &self.arcs
    }

    pub fn producing_arcs(&self) -> impl Iterator<Item = &Arc> {
        self.arcs.iter().filter(|arc| !arc.is_consuming())
    }

    /// Tokens this transition asks of each place, summed over its consuming
    /// arcs. `None` when the sum does not fit in a [`Weight`].
    pub fn demand(&self) -> IndexMap<PlaceId, Option<Weight>> {
        let mut demand: IndexMap<PlaceId, Option<Weight>> = IndexMap::new();
        for arc in &self.consuming {
            let entry = demand.entry(arc.place()).or_insert(Some(0));
            *entry = entry.and_then(|sum| sum.checked_add(arc.amount()));
        }
        demand
    }

    /// Pure feasibility check; never touches a holding.
    pub fn is_enabled(&self, places: &IndexVec<PlaceId, Place>, policy: ConsumptionPolicy) -> bool {
        match policy {
            ConsumptionPolicy::Independent => {
                self.consuming.iter().all(|arc| arc.is_enabled(places))
            }
            ConsumptionPolicy::Aggregated => {
                self.demand().into_iter().all(|(place, needed)| {
                    match (needed, places.get(place)) {
                        (Some(needed), Some(place)) => place.holding() >= needed,
                        _ => false,
                    }
                })
            }
        }
    }

    /// Fires the transition if every consuming arc is satisfied.
    ///
    /// All arcs are applied to staged holdings first and committed together,
    /// so a blocked or failed firing leaves every place untouched.
    pub fn fire(
        &self,
        places: &mut IndexVec<PlaceId, Place>,
        policy: ConsumptionPolicy,
    ) -> Result<FireOutcome, FireError> {
        if !self.is_enabled(places, policy) {
            return Ok(FireOutcome::Blocked);
        }

        let mut staged: IndexMap<PlaceId, Weight> = IndexMap::with_capacity(self.arcs.len());
        for arc in &self.arcs {
            let place = arc.place();
            if !staged.contains_key(&place) {
                let current = places
                    .get(place)
                    .ok_or(FireError::UnknownPlace(place))?
                    .holding();
                staged.insert(place, current);
            }
            if let Err(err) = arc.trigger(&mut staged[&place]) {
                log::warn!("firing abandoned before commit: {err}");
                return Err(err);
            }
        }

        for (place, holding) in staged {
            places[place].set_holding(holding);
        }
        Ok(FireOutcome::Fired)
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("consuming", &self.consuming)
            .field("arcs", &self.arcs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn places(holdings: &[Weight]) -> IndexVec<PlaceId, Place> {
        holdings
            .iter()
            .enumerate()
            .map(|(idx, &tokens)| Place::new(format!("P{idx}"), tokens))
            .collect()
    }

    fn holdings(places: &IndexVec<PlaceId, Place>) -> Vec<Weight> {
        places.iter().map(Place::holding).collect()
    }

    fn p(idx: u32) -> PlaceId {
        PlaceId::new(idx)
    }

    #[test]
    fn fires_when_every_consuming_arc_is_satisfied() {
        let mut table = places(&[1, 0, 0]);
        let t = Transition::new(
            [Arc::consuming(p(0))],
            [Arc::producing(p(1)), Arc::producing(p(2))],
        )
        .unwrap();

        let outcome = t.fire(&mut table, ConsumptionPolicy::default()).unwrap();

        assert_eq!(outcome, FireOutcome::Fired);
        assert_eq!(holdings(&table), vec![0, 1, 1]);
    }

    #[test]
    fn blocked_firing_has_no_partial_effect() {
        let mut table = places(&[1, 0, 0]);
        let t = Transition::new(
            [Arc::consuming(p(0)), Arc::consuming(p(1))],
            [Arc::producing(p(2))],
        )
        .unwrap();

        let outcome = t.fire(&mut table, ConsumptionPolicy::default()).unwrap();

        assert_eq!(outcome, FireOutcome::Blocked);
        assert_eq!(holdings(&table), vec![1, 0, 0]);
    }

    #[test]
    fn aggregated_policy_sums_competing_consumers() {
        let mut table = places(&[1, 0]);
        let t = Transition::new(
            [Arc::consuming(p(0)), Arc::consuming(p(0))],
            [Arc::producing(p(1))],
        )
        .unwrap();

        assert!(!t.is_enabled(&table, ConsumptionPolicy::Aggregated));
        let outcome = t.fire(&mut table, ConsumptionPolicy::Aggregated).unwrap();
        assert_eq!(outcome, FireOutcome::Blocked);
        assert_eq!(holdings(&table), vec![1, 0]);
    }

    #[test]
    fn independent_policy_reports_overdraw_without_effect() {
        let mut table = places(&[1, 0]);
        let t = Transition::new(
            [Arc::consuming(p(0)), Arc::consuming(p(0))],
            [Arc::producing(p(1))],
        )
        .unwrap();

        assert!(t.is_enabled(&table, ConsumptionPolicy::Independent));
        let err = t.fire(&mut table, ConsumptionPolicy::Independent).unwrap_err();
        assert!(matches!(err, FireError::Overdrawn { place, .. } if place == p(0)));
        assert_eq!(holdings(&table), vec![1, 0]);
    }

    #[test]
    fn overflow_leaves_places_untouched() {
        let mut table = places(&[1, Weight::MAX]);
        let t = Transition::new([Arc::consuming(p(0))], [Arc::producing(p(1))]).unwrap();

        let err = t.fire(&mut table, ConsumptionPolicy::default()).unwrap_err();
        assert!(matches!(err, FireError::Overflow { .. }));
        assert_eq!(holdings(&table), vec![1, Weight::MAX]);
    }

    #[test]
    fn self_loop_consumes_and_returns_tokens() {
        let mut table = places(&[2]);
        let t = Transition::new(
            [Arc::consuming(p(0)).with_amount(2).unwrap()],
            [Arc::producing(p(0))],
        )
        .unwrap();

        assert!(t.fire(&mut table, ConsumptionPolicy::default()).unwrap().is_fired());
        assert_eq!(holdings(&table), vec![1]);
    }

    #[test]
    fn duplicates_are_preserved_by_default() {
        let arc = Arc::producing(p(1));
        let t = Transition::new([Arc::consuming(p(0))], [arc, arc]).unwrap();
        assert_eq!(t.arcs().len(), 3);

        let mut table = places(&[1, 0]);
        t.fire(&mut table, ConsumptionPolicy::default()).unwrap();
        assert_eq!(holdings(&table), vec![0, 2]);
    }

    #[test]
    fn collapse_keeps_one_arc_per_key() {
        let consume = Arc::consuming(p(0));
        let t = Transition::with_dedup(
            [consume, consume],
            [consume, Arc::producing(p(1)), Arc::producing(p(1))],
            ArcDedup::Collapse,
        )
        .unwrap();

        assert_eq!(t.consuming_arcs(), &[consume]);
        assert_eq!(t.arcs(), &[consume, Arc::producing(p(1))]);
    }

    #[test]
    fn collapse_distinguishes_amounts() {
        let one = Arc::producing(p(1));
        let two = one.with_amount(2).unwrap();
        let t = Transition::with_dedup([], [one, two], ArcDedup::Collapse).unwrap();
        assert_eq!(t.arcs().len(), 2);
    }

    #[test]
    fn misplaced_arcs_are_rejected() {
        let err = Transition::new([Arc::producing(p(0))], []).unwrap_err();
        assert!(matches!(
            err,
            NetError::MisplacedArc { expected: ArcDirection::PlaceToTransition, .. }
        ));

        let err = Transition::new([], [Arc::consuming(p(0))]).unwrap_err();
        assert!(matches!(
            err,
            NetError::MisplacedArc { expected: ArcDirection::TransitionToPlace, .. }
        ));
    }

    #[test]
    fn zero_amount_variants_are_rejected() {
        let consume = Arc::Consuming { place: p(0), amount: 0 };
        let produce = Arc::Producing { place: p(1), amount: 0 };

        let err = Transition::new([consume], [Arc::producing(p(1))]).unwrap_err();
        assert!(matches!(err, NetError::NonPositiveAmount { place } if place == p(0)));

        let err = Transition::new([Arc::consuming(p(0))], [produce]).unwrap_err();
        assert!(matches!(err, NetError::NonPositiveAmount { place } if place == p(1)));

        let err = Transition::with_dedup([consume, consume], [Arc::producing(p(1))], ArcDedup::Collapse).unwrap_err();
        assert!(matches!(err, NetError::NonPositiveAmount { .. }));
    }

    #[test]
    fn feasibility_check_is_idempotent() {
        let table = places(&[1, 0]);
        let t = Transition::new([Arc::consuming(p(0))], [Arc::producing(p(1))]).unwrap();
        let before = holdings(&table);

        let first = t.is_enabled(&table, ConsumptionPolicy::default());
        let second = t.is_enabled(&table, ConsumptionPolicy::default());

        assert!(first && second);
        assert_eq!(holdings(&table), before);
    }

    #[test]
    fn source_transition_always_fires() {
        let mut table = places(&[0]);
        let t = Transition::new([], [Arc::producing(p(0))]).unwrap();
        assert!(t.fire(&mut table, ConsumptionPolicy::Aggregated).unwrap().is_fired());
        assert!(t.fire(&mut table, ConsumptionPolicy::Independent).unwrap().is_fired());
        assert_eq!(holdings(&table), vec![2]);
    }

    #[test]
    fn policies_parse_from_lowercase_names() {
        assert_eq!(
            "independent".parse::<ConsumptionPolicy>(),
            Ok(ConsumptionPolicy::Independent)
        );
        assert_eq!("collapse".parse::<ArcDedup>(), Ok(ArcDedup::Collapse));
        assert!("greedy".parse::<ConsumptionPolicy>().is_err());
    }
}
