use super::*;

pub fn run(args: EvaluateArgs) -> Result<()> {
    let gold_paths = GoldFilePaths::new(&args.gold_dir, &args.subset);
    ensure_inputs_readable(&args, &gold_paths)?;

    info!(
        gold_dir = %args.gold_dir.display(),
        subset = %args.subset,
        predictions = %args.predictions_path.display(),
        "starting evaluation"
    );

    let gold = load_gold_data(&gold_paths)?;
    let predictions = load_predictions(&args.predictions_path)?;
    let prediction_stats = PredictionStats::from_set(&predictions);
    info!(
        predictions = prediction_stats.predictions,
        arguments = prediction_stats.arguments,
        "loaded predictions"
    );

    let tie_break = TieBreak::from_mode(args.tie_break, args.seed);
    let outcome = MergeResolver::new(&gold, tie_break).resolve(&predictions)?;
    let evaluation = evaluate_pairs(&outcome.pairs, args.top_percentile)?;
    let coverage = group_coverage(&outcome.pairs);

    let report = EvaluationReport {
        generated_at: now_utc_string(),
        gold_dir: args.gold_dir.display().to_string(),
        subset: args.subset.clone(),
        predictions_path: args.predictions_path.display().to_string(),
        predictions_sha256: sha256_file(&args.predictions_path)?,
        tie_break: tie_break.label(),
        predictions: prediction_stats,
        merge: outcome.stats,
        coverage,
        evaluation,
        pairs: outcome.pairs,
    };

    info!(
        groups = report.coverage.len(),
        unmatched_arguments = report.merge.unmatched_arguments,
        map_strict = report.map_strict(),
        map_relaxed = report.map_relaxed(),
        "evaluation completed"
    );

    if args.json {
        write_json_report(&report)
    } else {
        write_text_report(&report)
    }
}

fn ensure_inputs_readable(args: &EvaluateArgs, gold_paths: &GoldFilePaths) -> Result<()> {
    if !args.gold_dir.is_dir() {
        bail!(
            "gold data directory does not exist or is not a directory: {}",
            args.gold_dir.display()
        );
    }
    for path in gold_paths.all() {
        if !path.is_file() {
            bail!("missing gold data file: {}", path.display());
        }
    }
    if !args.predictions_path.is_file() {
        bail!(
            "predictions file does not exist: {}",
            args.predictions_path.display()
        );
    }
    Ok(())
}
