use super::*;

/// Rule for choosing among predictions that share an argument's maximum score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    /// Lexicographically smallest key point id wins.
    LowestId,
    /// Pick among tied ids (ordered by id) with a xorshift draw seeded by
    /// `seed` mixed with a hash of the argument id.
    Seeded { seed: u64 },
}

impl TieBreak {
    pub fn from_mode(mode: TieBreakMode, seed: u64) -> Self {
        match mode {
            TieBreakMode::LowestId => Self::LowestId,
            TieBreakMode::Seeded => Self::Seeded { seed },
        }
    }

    pub fn label(self) -> String {
        match self {
            Self::LowestId => TieBreakMode::LowestId.as_str().to_string(),
            Self::Seeded { seed } => format!("{}(seed={seed})", TieBreakMode::Seeded.as_str()),
        }
    }

    fn pick<'a>(self, arg_id: &str, tied: &[(&'a str, f64)]) -> Option<(&'a str, f64)> {
        if tied.len() <= 1 {
            return tied.first().copied();
        }
        match self {
            Self::LowestId => tied.first().copied(),
            Self::Seeded { seed } => {
                let mut state = seed ^ fnv1a_64(arg_id.as_bytes());
                if state == 0 {
                    state = 0x9E37_79B9_7F4A_7C15;
                }
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                tied.get((state % tied.len() as u64) as usize).copied()
            }
        }
    }
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InvalidKeyPoint {
    Unknown,
    OutOfGroup,
}

impl InvalidKeyPoint {
    fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown key point id",
            Self::OutOfGroup => "key point belongs to another topic/stance",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeStats {
    pub arguments: usize,
    pub matched_arguments: usize,
    pub unmatched_arguments: usize,
    pub discarded_predictions: usize,
    pub invalid_key_point_ids: Vec<String>,
    pub unknown_argument_ids: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub pairs: Vec<EvaluatedPair>,
    pub stats: MergeStats,
}

/// Joins gold data with predictions into one evaluated pair per argument.
///
/// A resolver covers a single evaluation run: `resolve` consumes it, so the
/// set of already-reported invalid ids never leaks into another run.
pub struct MergeResolver<'a> {
    gold: &'a GoldData,
    key_point_groups: HashMap<&'a str, GroupKey>,
    tie_break: TieBreak,
    reported_invalid_key_points: BTreeSet<String>,
    discarded_predictions: usize,
}

impl<'a> MergeResolver<'a> {
    pub fn new(gold: &'a GoldData, tie_break: TieBreak) -> Self {
        let key_point_groups = gold
            .key_points
            .iter()
            .map(|key_point| {
                (
                    key_point.key_point_id.as_str(),
                    GroupKey::new(&key_point.topic, &key_point.stance),
                )
            })
            .collect();

        Self {
            gold,
            key_point_groups,
            tie_break,
            reported_invalid_key_points: BTreeSet::new(),
            discarded_predictions: 0,
        }
    }

    pub fn resolve(mut self, predictions: &PredictionSet) -> Result<MergeOutcome> {
        let gold = self.gold;
        let known_arguments = gold
            .arguments
            .iter()
            .map(|argument| argument.arg_id.as_str())
            .collect::<HashSet<&str>>();

        let mut unknown_argument_ids = Vec::new();
        for (arg_id, scores) in predictions {
            if known_arguments.contains(arg_id.as_str()) {
                continue;
            }
            warn!(
                arg_id = %arg_id,
                predictions = scores.len(),
                "discarding predictions for unknown argument id"
            );
            self.discarded_predictions += scores.len();
            unknown_argument_ids.push(arg_id.clone());
        }

        let empty = BTreeMap::new();
        let mut pairs = Vec::with_capacity(gold.arguments.len());
        let mut unmatched_arguments = 0usize;

        for argument in &gold.arguments {
            let scores = predictions.get(&argument.arg_id).unwrap_or(&empty);
            let best = self.best_candidate(argument, scores)?;

            let (key_point, score, gold_label) = match best {
                Some((key_point_id, score)) => {
                    let gold_label = gold.labels.get(&argument.arg_id, &key_point_id);
                    (MatchTarget::KeyPoint(key_point_id), score, gold_label)
                }
                None => {
                    unmatched_arguments += 1;
                    // Sentinel rows never count as a match, whatever the gold rows say.
                    (MatchTarget::NoMatch, 0.0, Some(0))
                }
            };

            pairs.push(EvaluatedPair {
                arg_id: argument.arg_id.clone(),
                topic: argument.topic.clone(),
                stance: argument.stance.clone(),
                key_point,
                score,
                label_strict: LabelPolicy::Strict.resolve(gold_label),
                label_relaxed: LabelPolicy::Relaxed.resolve(gold_label),
            });
        }

        if unmatched_arguments > 0 {
            warn!(
                unmatched_arguments,
                total_arguments = gold.arguments.len(),
                "not all arguments have a valid predicted match; treating them as no match"
            );
        }

        let stats = MergeStats {
            arguments: pairs.len(),
            matched_arguments: pairs.len() - unmatched_arguments,
            unmatched_arguments,
            discarded_predictions: self.discarded_predictions,
            invalid_key_point_ids: self.reported_invalid_key_points.into_iter().collect(),
            unknown_argument_ids,
        };

        Ok(MergeOutcome { pairs, stats })
    }

    fn best_candidate(
        &mut self,
        argument: &Argument,
        scores: &BTreeMap<String, f64>,
    ) -> Result<Option<(String, f64)>> {
        let mut valid = Vec::with_capacity(scores.len());
        for (key_point_id, score) in scores {
            if !score.is_finite() {
                bail!(
                    "non-finite score {score} for ({}, {key_point_id})",
                    argument.arg_id
                );
            }
            match self.classify(argument, key_point_id) {
                None => valid.push((key_point_id.as_str(), *score)),
                Some(reason) => {
                    self.discarded_predictions += 1;
                    self.report_invalid(key_point_id, reason);
                }
            }
        }

        let Some(max_score) = valid.iter().map(|(_, score)| *score).reduce(f64::max) else {
            return Ok(None);
        };
        // BTreeMap iteration keeps `tied` ordered by key point id.
        let tied = valid
            .into_iter()
            .filter(|(_, score)| *score == max_score)
            .collect::<Vec<_>>();

        Ok(self
            .tie_break
            .pick(&argument.arg_id, &tied)
            .map(|(key_point_id, score)| (key_point_id.to_string(), score)))
    }

    fn classify(&self, argument: &Argument, key_point_id: &str) -> Option<InvalidKeyPoint> {
        match self.key_point_groups.get(key_point_id) {
            None => Some(InvalidKeyPoint::Unknown),
            Some(group) if group.topic != argument.topic || group.stance != argument.stance => {
                Some(InvalidKeyPoint::OutOfGroup)
            }
            Some(_) => None,
        }
    }

    fn report_invalid(&mut self, key_point_id: &str, reason: InvalidKeyPoint) {
        if self.reported_invalid_key_points.contains(key_point_id) {
            return;
        }
        warn!(
            key_point_id = %key_point_id,
            reason = reason.as_str(),
            "discarding predictions for invalid key point"
        );
        self.reported_invalid_key_points
            .insert(key_point_id.to_string());
    }
}
