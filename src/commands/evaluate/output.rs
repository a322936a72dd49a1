use super::*;

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub generated_at: String,
    pub gold_dir: String,
    pub subset: String,
    pub predictions_path: String,
    pub predictions_sha256: String,
    pub tie_break: String,
    pub predictions: PredictionStats,
    pub merge: MergeStats,
    pub coverage: Vec<GroupCoverage>,
    pub evaluation: Evaluation,
    pub pairs: Vec<EvaluatedPair>,
}

impl EvaluationReport {
    pub fn map_strict(&self) -> f64 {
        self.evaluation.strict.value
    }

    pub fn map_relaxed(&self) -> f64 {
        self.evaluation.relaxed.value
    }
}

pub fn write_json_report(report: &EvaluationReport) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, report)
        .context("failed to serialize evaluation json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

pub fn write_text_report(report: &EvaluationReport) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    render_text_report(&mut output, report)?;
    output.flush()?;
    Ok(())
}

pub fn render_text_report<W: Write>(output: &mut W, report: &EvaluationReport) -> Result<()> {
    writeln!(
        output,
        "Loaded {} predictions for {} arguments.",
        report.predictions.predictions, report.predictions.arguments
    )?;
    writeln!(
        output,
        "Gold: dir={} subset={} arguments={}",
        report.gold_dir, report.subset, report.merge.arguments
    )?;
    writeln!(
        output,
        "Predictions: path={} sha256={} tie_break={} discarded={}",
        report.predictions_path,
        report.predictions_sha256,
        report.tie_break,
        report.merge.discarded_predictions
    )?;
    if !report.merge.invalid_key_point_ids.is_empty() {
        writeln!(
            output,
            "Invalid key point ids: {}",
            report.merge.invalid_key_point_ids.join(",")
        )?;
    }
    if !report.merge.unknown_argument_ids.is_empty() {
        writeln!(
            output,
            "Unknown argument ids: {}",
            report.merge.unknown_argument_ids.join(",")
        )?;
    }
    writeln!(
        output,
        "Arguments without a submitted match: {} of {}",
        report.merge.unmatched_arguments, report.merge.arguments
    )?;

    writeln!(
        output,
        "Groups: {} (top_percentile={})",
        report.coverage.len(),
        report.evaluation.top_percentile
    )?;
    let strict = &report.evaluation.strict.groups;
    let relaxed = &report.evaluation.relaxed.groups;
    for ((coverage, strict_group), relaxed_group) in
        report.coverage.iter().zip(strict).zip(relaxed)
    {
        writeln!(
            output,
            "\t{}\t{}\tcoverage={} ({}/{})\tevaluated={}\tAP strict={:.6} relaxed={:.6}",
            coverage.topic,
            coverage.stance,
            format_ratio(coverage.matched, coverage.arguments),
            coverage.matched,
            coverage.arguments,
            strict_group.evaluated,
            strict_group.average_precision,
            relaxed_group.average_precision,
        )?;
    }

    writeln!(
        output,
        "mAP strict= {} ; mAP relaxed = {}",
        report.map_strict(),
        report.map_relaxed()
    )?;
    Ok(())
}
