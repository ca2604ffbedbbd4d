//! The fork/join net used when no net file is given.
use crate::net::{Arc, ConsumptionPolicy, Net, NetError, Place, PlaceId, Transition};

pub const FORK_JOIN_PLACES: usize = 4;

/// Builds the fork/join cycle over places `P0..P3`:
///
/// * `t1` takes one token from `P0` and puts one on `P1` and one on `P2`;
/// * `t2` takes one token from `P1` and one from `P2` and puts one on `P3`
///   and one back on `P0`.
///
/// `marking` gives the initial holdings. Entries past the fourth become extra,
/// unconnected places. Returns the net and the handles of every place.
pub fn fork_join(
    marking: &[i64],
    policy: ConsumptionPolicy,
) -> Result<(Net, Vec<PlaceId>), NetError> {
    if marking.len() < FORK_JOIN_PLACES {
        return Err(NetError::MarkingLength {
            expected: FORK_JOIN_PLACES,
            found: marking.len(),
        });
    }

    let mut net = Net::with_policy(policy);
    let ps = marking
        .iter()
        .enumerate()
        .map(|(idx, &tokens)| {
            Place::from_signed(format!("P{idx}"), tokens).map(|place| net.add_place(place))
        })
        .collect::<Result<Vec<_>, _>>()?;

    net.add_transition(
        "t1",
        Transition::new(
            [Arc::consuming(ps[0])],
            [Arc::producing(ps[1]), Arc::producing(ps[2])],
        )?,
    )?;
    net.add_transition(
        "t2",
        Transition::new(
            [Arc::consuming(ps[1]), Arc::consuming(ps[2])],
            [Arc::producing(ps[3]), Arc::producing(ps[0])],
        )?,
    )?;
    Ok((net, ps))
}
