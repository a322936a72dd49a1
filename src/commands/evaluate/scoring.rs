use super::*;

/// Score assigned to a no-match row that survives top-percentile truncation.
/// It ranks the row above any real prediction while the row stays non-relevant.
pub const NO_MATCH_FORCED_SCORE: f64 = 1.0e300;

#[derive(Debug, Clone, Serialize)]
pub struct GroupPrecision {
    pub topic: String,
    pub stance: String,
    pub group_size: usize,
    pub evaluated: usize,
    pub relevant: usize,
    pub no_match_evaluated: usize,
    pub average_precision: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeanAveragePrecision {
    pub policy: LabelPolicy,
    pub value: f64,
    pub groups: Vec<GroupPrecision>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub top_percentile: f64,
    pub strict: MeanAveragePrecision,
    pub relaxed: MeanAveragePrecision,
}

pub fn evaluate_pairs(pairs: &[EvaluatedPair], top_percentile: f64) -> Result<Evaluation> {
    Ok(Evaluation {
        top_percentile,
        strict: mean_average_precision(pairs, LabelPolicy::Strict, top_percentile)?,
        relaxed: mean_average_precision(pairs, LabelPolicy::Relaxed, top_percentile)?,
    })
}

pub fn group_pairs(pairs: &[EvaluatedPair]) -> BTreeMap<GroupKey, Vec<&EvaluatedPair>> {
    let mut groups = BTreeMap::<GroupKey, Vec<&EvaluatedPair>>::new();
    for pair in pairs {
        groups.entry(pair.group_key()).or_default().push(pair);
    }
    groups
}

pub fn mean_average_precision(
    pairs: &[EvaluatedPair],
    policy: LabelPolicy,
    top_percentile: f64,
) -> Result<MeanAveragePrecision> {
    ensure_top_percentile(top_percentile)?;

    let groups = group_pairs(pairs);
    if groups.is_empty() {
        bail!("no topic/stance groups to score; the arguments table is empty");
    }

    let mut precisions = Vec::with_capacity(groups.len());
    for (key, rows) in &groups {
        precisions.push(group_average_precision(key, rows, policy, top_percentile)?);
    }

    let value = precisions
        .iter()
        .map(|group| group.average_precision)
        .sum::<f64>()
        / precisions.len() as f64;

    Ok(MeanAveragePrecision {
        policy,
        value,
        groups: precisions,
    })
}

pub fn group_average_precision(
    key: &GroupKey,
    rows: &[&EvaluatedPair],
    policy: LabelPolicy,
    top_percentile: f64,
) -> Result<GroupPrecision> {
    if rows.is_empty() {
        bail!("topic/stance group {key} has no evaluated pairs");
    }

    let mut ranked = rows.to_vec();
    ranked.sort_by(|left, right| {
        right
            .score
            .total_cmp(&left.score)
            .then_with(|| left.arg_id.cmp(&right.arg_id))
    });
    ranked.truncate(top_count(rows.len(), top_percentile));

    let items = ranked
        .iter()
        .map(|pair| RankedItem {
            score: if pair.key_point.is_no_match() {
                NO_MATCH_FORCED_SCORE
            } else {
                pair.score
            },
            relevant: !pair.key_point.is_no_match() && pair.label(policy) == 1,
        })
        .collect::<Vec<RankedItem>>();

    let relevant = items.iter().filter(|item| item.relevant).count();
    // An all-negative slice has no defined precision-recall curve.
    let precision = if relevant == 0 {
        0.0
    } else {
        average_precision(items)
    };

    Ok(GroupPrecision {
        topic: key.topic.clone(),
        stance: key.stance.clone(),
        group_size: rows.len(),
        evaluated: ranked.len(),
        relevant,
        no_match_evaluated: ranked
            .iter()
            .filter(|pair| pair.key_point.is_no_match())
            .count(),
        average_precision: precision,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedItem {
    pub score: f64,
    pub relevant: bool,
}

/// Step-wise area under the precision-recall curve.
///
/// Items sharing a score form one threshold, so the result does not depend on
/// their relative order. Returns 0 when nothing is relevant.
pub fn average_precision(mut items: Vec<RankedItem>) -> f64 {
    let total_relevant = items.iter().filter(|item| item.relevant).count();
    if total_relevant == 0 {
        return 0.0;
    }

    items.sort_by(|left, right| right.score.total_cmp(&left.score));

    let mut area = 0.0_f64;
    let mut previous_recall = 0.0_f64;
    let mut true_positives = 0usize;
    let mut index = 0usize;

    while index < items.len() {
        let threshold = items[index].score;
        while index < items.len() && items[index].score == threshold {
            if items[index].relevant {
                true_positives += 1;
            }
            index += 1;
        }

        let precision = true_positives as f64 / index as f64;
        let recall = true_positives as f64 / total_relevant as f64;
        area += (recall - previous_recall) * precision;
        previous_recall = recall;
    }

    area
}

pub fn top_count(group_size: usize, top_percentile: f64) -> usize {
    ((group_size as f64) * top_percentile).floor() as usize
}

fn ensure_top_percentile(top_percentile: f64) -> Result<()> {
    if !(top_percentile > 0.0 && top_percentile <= 1.0) {
        bail!("top percentile must be in (0, 1], got {top_percentile}");
    }
    Ok(())
}
