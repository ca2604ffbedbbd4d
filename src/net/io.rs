//! Net descriptions on disk: JSON or RON, picked by file extension.
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::net::core::{Net, NetError};
use crate::net::ids::PlaceId;
use crate::net::structure::{Arc, Place};
use crate::net::transition::{ArcDedup, ConsumptionPolicy, Transition};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ron error: {0}")]
    Ron(#[from] ron::Error),
    #[error("ron syntax error: {0}")]
    RonSpanned(#[from] ron::error::SpannedError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported net file extension `{0}`, expected .json or .ron")]
    Format(String),
    #[error(transparent)]
    Net(#[from] NetError),
}

/// Serializable form of a net. Places are referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetDescription {
    pub places: Vec<PlaceDescription>,
    pub transitions: Vec<TransitionDescription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceDescription {
    pub name: String,
    #[serde(default)]
    pub tokens: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDescription {
    pub id: String,
    #[serde(default)]
    pub consume: Vec<ArcDescription>,
    #[serde(default)]
    pub produce: Vec<ArcDescription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcDescription {
    pub place: String,
    #[serde(default = "default_amount")]
    pub amount: i64,
}

fn default_amount() -> i64 {
    1
}

impl NetDescription {
    /// Validates the description and builds the net it describes.
    pub fn build(&self, policy: ConsumptionPolicy, dedup: ArcDedup) -> Result<Net, NetError> {
        let mut net = Net::with_policy(policy);
        let mut seen = HashSet::new();
        for place in &self.places {
            if !seen.insert(place.name.as_str()) {
                return Err(NetError::DuplicatePlace(place.name.clone()));
            }
            net.add_place(Place::from_signed(place.name.clone(), place.tokens)?);
        }

        for transition in &self.transitions {
            let consuming = transition
                .consume
                .iter()
                .map(|arc| resolve(&net, arc, Arc::consuming))
                .collect::<Result<Vec<_>, _>>()?;
            let producing = transition
                .produce
                .iter()
                .map(|arc| resolve(&net, arc, Arc::producing))
                .collect::<Result<Vec<_>, _>>()?;
            let built = Transition::with_dedup(consuming, producing, dedup)?;
            net.add_transition(transition.id.clone(), built)?;
        }
        Ok(net)
    }

    /// Describes `net`, using each place's current holding as its tokens.
    pub fn from_net(net: &Net) -> Self {
        let places = net
            .places()
            .iter()
            .map(|place| PlaceDescription {
                name: place.name.clone(),
                tokens: i64::try_from(place.holding()).unwrap_or(i64::MAX),
            })
            .collect();
        let transitions = net
            .transition_ids()
            .filter_map(|id| net.transition(id).map(|t| (id, t)))
            .map(|(id, transition)| {
                let describe = |arc: &Arc| ArcDescription {
                    place: net
                        .place(arc.place())
                        .map(|place| place.name.clone())
                        .unwrap_or_default(),
                    amount: i64::try_from(arc.amount()).unwrap_or(i64::MAX),
                };
                TransitionDescription {
                    id: id.to_owned(),
                    consume: transition.consuming_arcs().iter().map(describe).collect(),
                    produce: transition.producing_arcs().map(describe).collect(),
                }
            })
            .collect();
        Self {
            places,
            transitions,
        }
    }
}

fn resolve(
    net: &Net,
    arc: &ArcDescription,
    make: fn(PlaceId) -> Arc,
) -> Result<Arc, NetError> {
    let place = net
        .place_id(&arc.place)
        .ok_or_else(|| NetError::UnknownPlaceName(arc.place.clone()))?;
    let amount = u64::try_from(arc.amount).unwrap_or(0);
    make(place).with_amount(amount)
}

pub fn to_json_string<T>(value: &T) -> Result<String, IoError>
where
    T: Serialize,
{
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn from_json_str<T>(s: &str) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    Ok(serde_json::from_str(s)?)
}

pub fn to_ron_string<T>(value: &T) -> Result<String, IoError>
where
    T: Serialize,
{
    let mut pretty = PrettyConfig::default();
    pretty.new_line = "\n".into();
    Ok(ron::ser::to_string_pretty(value, pretty)?)
}

pub fn from_ron_str<T>(s: &str) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    Ok(ron::from_str(s)?)
}

pub fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<(), IoError> {
    fs::write(path, to_json_string(value)?)?;
    Ok(())
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

pub fn read_description<P: AsRef<Path>>(path: P) -> Result<NetDescription, IoError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    match extension(path).as_str() {
        "json" => from_json_str(&content),
        "ron" => from_ron_str(&content),
        other => Err(IoError::Format(other.to_owned())),
    }
}

pub fn write_description<P: AsRef<Path>>(
    path: P,
    description: &NetDescription,
) -> Result<(), IoError> {
    let path = path.as_ref();
    let content = match extension(path).as_str() {
        "json" => to_json_string(description)?,
        "ron" => to_ron_string(description)?,
        other => return Err(IoError::Format(other.to_owned())),
    };
    fs::write(path, content)?;
    Ok(())
}

/// Reads a description and builds the net in one step.
pub fn load_net<P: AsRef<Path>>(
    path: P,
    policy: ConsumptionPolicy,
    dedup: ArcDedup,
) -> Result<Net, IoError> {
    let description = read_description(path)?;
    Ok(description.build(policy, dedup)?)
}
