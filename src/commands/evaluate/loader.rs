use super::*;

#[derive(Debug, Clone)]
pub struct GoldFilePaths {
    pub arguments: PathBuf,
    pub key_points: PathBuf,
    pub labels: PathBuf,
}

impl GoldFilePaths {
    pub fn new(gold_dir: &Path, subset: &str) -> Self {
        Self {
            arguments: gold_dir.join(format!("arguments_{subset}.csv")),
            key_points: gold_dir.join(format!("key_points_{subset}.csv")),
            labels: gold_dir.join(format!("labels_{subset}.csv")),
        }
    }

    pub fn all(&self) -> [&Path; 3] {
        [
            self.arguments.as_path(),
            self.key_points.as_path(),
            self.labels.as_path(),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PredictionStats {
    pub predictions: usize,
    pub arguments: usize,
}

impl PredictionStats {
    pub fn from_set(predictions: &PredictionSet) -> Self {
        Self {
            predictions: predictions.values().map(BTreeMap::len).sum(),
            arguments: predictions.len(),
        }
    }
}

pub fn load_gold_data(paths: &GoldFilePaths) -> Result<GoldData> {
    let arguments = read_csv_rows::<Argument>(&paths.arguments)?;
    ensure_unique_ids(
        &paths.arguments,
        "arg_id",
        arguments.iter().map(|argument| argument.arg_id.as_str()),
    )?;

    let key_points = read_csv_rows::<KeyPoint>(&paths.key_points)?;
    ensure_unique_ids(
        &paths.key_points,
        "key_point_id",
        key_points.iter().map(|key_point| key_point.key_point_id.as_str()),
    )?;

    let label_rows = read_csv_rows::<GoldLabelRow>(&paths.labels)?;
    let labels = build_label_table(&paths.labels, &label_rows)?;

    info!(
        arguments = arguments.len(),
        key_points = key_points.len(),
        decided_labels = labels.len(),
        label_rows = label_rows.len(),
        "loaded gold data"
    );

    Ok(GoldData {
        arguments,
        key_points,
        labels,
    })
}

fn read_csv_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open csv file: {}", path.display()))?;

    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<T>().enumerate() {
        // header is line 1
        let row = record.with_context(|| {
            format!(
                "failed to parse csv row {} in {}",
                index + 2,
                path.display()
            )
        })?;
        rows.push(row);
    }
    Ok(rows)
}

fn ensure_unique_ids<'a>(
    path: &Path,
    column: &str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            bail!("duplicate {column} `{id}` in {}", path.display());
        }
    }
    Ok(())
}

fn build_label_table(path: &Path, rows: &[GoldLabelRow]) -> Result<LabelTable> {
    let mut labels = LabelTable::default();
    for row in rows {
        let Some(label) = row.label else {
            continue;
        };
        if label > 1 {
            bail!(
                "label for ({}, {}) must be 0 or 1, got {} in {}",
                row.arg_id,
                row.key_point_id,
                label,
                path.display()
            );
        }
        if let Some(previous) = labels.insert(&row.arg_id, &row.key_point_id, label)
            && previous != label
        {
            bail!(
                "conflicting labels {previous} and {label} for ({}, {}) in {}",
                row.arg_id,
                row.key_point_id,
                path.display()
            );
        }
    }
    Ok(labels)
}

pub fn load_predictions(path: &Path) -> Result<PredictionSet> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read predictions file: {}", path.display()))?;
    parse_predictions(&raw)
        .with_context(|| format!("malformed predictions file: {}", path.display()))
}

pub fn parse_predictions(raw: &str) -> Result<PredictionSet> {
    let predictions: PredictionSet = serde_json::from_str(raw).context(
        "predictions must be a JSON object mapping argument ids to objects of key point id -> numeric score",
    )?;

    for (arg_id, scores) in &predictions {
        for (key_point_id, score) in scores {
            if !score.is_finite() {
                bail!("non-finite score {score} for ({arg_id}, {key_point_id})");
            }
        }
    }

    Ok(predictions)
}
