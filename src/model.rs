use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Argument {
    pub arg_id: String,
    pub topic: String,
    pub stance: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeyPoint {
    pub key_point_id: String,
    pub topic: String,
    pub stance: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GoldLabelRow {
    pub arg_id: String,
    pub key_point_id: String,
    /// Empty cells are undecided, same as an absent row.
    pub label: Option<u8>,
}

/// Decided gold labels keyed by (argument id, key point id). Undecided pairs are absent.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    labels: HashMap<(String, String), u8>,
}

impl LabelTable {
    pub fn insert(&mut self, arg_id: &str, key_point_id: &str, label: u8) -> Option<u8> {
        self.labels
            .insert((arg_id.to_string(), key_point_id.to_string()), label)
    }

    pub fn get(&self, arg_id: &str, key_point_id: &str) -> Option<u8> {
        self.labels
            .get(&(arg_id.to_string(), key_point_id.to_string()))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct GoldData {
    pub arguments: Vec<Argument>,
    pub key_points: Vec<KeyPoint>,
    pub labels: LabelTable,
}

/// Predicted match scores: argument id -> key point id -> score.
pub type PredictionSet = BTreeMap<String, BTreeMap<String, f64>>;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GroupKey {
    pub topic: String,
    pub stance: String,
}

impl GroupKey {
    pub fn new(topic: &str, stance: &str) -> Self {
        Self {
            topic: topic.to_string(),
            stance: stance.to_string(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.topic, self.stance)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchTarget {
    KeyPoint(String),
    NoMatch,
}

impl MatchTarget {
    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMatch)
    }
}

impl Serialize for MatchTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::KeyPoint(id) => serializer.serialize_some(id),
            Self::NoMatch => serializer.serialize_none(),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPolicy {
    Strict,
    Relaxed,
}

impl LabelPolicy {
    /// Maps a gold label (None = undecided) to a binary label under this policy.
    pub fn resolve(self, gold: Option<u8>) -> u8 {
        match (self, gold) {
            (_, Some(label)) => label,
            (Self::Strict, None) => 0,
            (Self::Relaxed, None) => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatedPair {
    pub arg_id: String,
    pub topic: String,
    pub stance: String,
    #[serde(rename = "key_point_id")]
    pub key_point: MatchTarget,
    pub score: f64,
    pub label_strict: u8,
    pub label_relaxed: u8,
}

impl EvaluatedPair {
    pub fn label(&self, policy: LabelPolicy) -> u8 {
        match policy {
            LabelPolicy::Strict => self.label_strict,
            LabelPolicy::Relaxed => self.label_relaxed,
        }
    }

    pub fn group_key(&self) -> GroupKey {
        GroupKey::new(&self.topic, &self.stance)
    }
}
