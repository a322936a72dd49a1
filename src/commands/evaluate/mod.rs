use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::cli::{EvaluateArgs, TieBreakMode};
use crate::model::{
    Argument, EvaluatedPair, GoldData, GoldLabelRow, GroupKey, KeyPoint, LabelPolicy, LabelTable,
    MatchTarget, PredictionSet,
};
use crate::util::{format_ratio, now_utc_string, sha256_file};

mod coverage;
mod loader;
mod merge;
mod output;
mod run;
mod scoring;

use self::coverage::*;
use self::loader::*;
use self::merge::*;
use self::output::*;
use self::scoring::*;

pub use self::run::run;
