use super::*;

#[derive(Debug, Clone, Serialize)]
pub struct GroupCoverage {
    pub topic: String,
    pub stance: String,
    pub arguments: usize,
    pub matched: usize,
    pub coverage: f64,
}

/// Share of each group's arguments that received a valid submitted match.
pub fn group_coverage(pairs: &[EvaluatedPair]) -> Vec<GroupCoverage> {
    group_pairs(pairs)
        .into_iter()
        .map(|(key, rows)| {
            let matched = rows
                .iter()
                .filter(|pair| !pair.key_point.is_no_match())
                .count();
            GroupCoverage {
                topic: key.topic,
                stance: key.stance,
                arguments: rows.len(),
                matched,
                coverage: matched as f64 / rows.len() as f64,
            }
        })
        .collect()
}
