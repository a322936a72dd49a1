use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};

pub const DEFAULT_TOP_PERCENTILE: f64 = 0.5;

#[derive(Parser, Debug)]
#[command(
    name = "kpm-eval",
    version,
    about = "Score argument to key point matches against gold labels (mAP strict/relaxed)"
)]
pub struct Cli {
    #[command(flatten)]
    pub evaluate: EvaluateArgs,
}

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// Directory holding arguments_<subset>.csv, key_points_<subset>.csv and labels_<subset>.csv.
    pub gold_dir: PathBuf,

    /// JSON file mapping argument id to key point id to match score.
    pub predictions_path: PathBuf,

    #[arg(long, default_value = "dev")]
    pub subset: String,

    #[arg(long, default_value_t = DEFAULT_TOP_PERCENTILE, value_parser = parse_top_percentile)]
    pub top_percentile: f64,

    #[arg(long, value_enum, default_value_t = TieBreakMode::LowestId)]
    pub tie_break: TieBreakMode,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum TieBreakMode {
    LowestId,
    Seeded,
}

impl TieBreakMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LowestId => "lowest-id",
            Self::Seeded => "seeded",
        }
    }
}

fn parse_top_percentile(raw: &str) -> Result<f64, String> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid number `{raw}`: {err}"))?;
    if !(value > 0.0 && value <= 1.0) {
        return Err(format!("top percentile must be in (0, 1], got {value}"));
    }
    Ok(value)
}
