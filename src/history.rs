use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::MatchPrediction;

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

const FILE_PREFIX: &str = "prediction_";
const FILE_SUFFIX: &str = ".json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub id: String,
    pub team1: String,
    pub team2: String,
    pub favorite_team: String,
    pub win_probability: f64,
    /// Unix seconds taken from the file name.
    pub timestamp: i64,
}

/// Writes `prediction_<unix_secs>.json` under `dir`. A second save within
/// the same second takes the next free timestamp.
pub fn save_prediction(dir: &Path, prediction: &MatchPrediction) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("create history dir {}", dir.display()))?;

    let mut ts = Utc::now().timestamp();
    let mut path = dir.join(file_name(ts));
    while path.exists() {
        ts += 1;
        path = dir.join(file_name(ts));
    }

    let json = serde_json::to_string_pretty(prediction).context("serialize prediction")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).context("write prediction")?;
    fs::rename(&tmp, &path).context("swap prediction file")?;
    Ok(path)
}

pub fn recent_predictions(dir: &Path, limit: usize) -> Result<Vec<HistorySummary>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut stamped = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("list {}", dir.display()))? {
        let entry = entry.context("read history entry")?;
        let name = entry.file_name();
        let Some(ts) = name.to_str().and_then(timestamp_from_name) else {
            continue;
        };
        stamped.push((ts, entry.path()));
    }
    stamped.sort_by(|a, b| b.0.cmp(&a.0));

    let mut out = Vec::new();
    for (ts, path) in stamped.into_iter().take(limit) {
        match load_summary(&path, ts) {
            Ok(summary) => out.push(summary),
            Err(err) => warn!(path = %path.display(), error = %err, "skipping history file"),
        }
    }
    Ok(out)
}

fn load_summary(path: &Path, ts: i64) -> Result<HistorySummary> {
    let raw = fs::read_to_string(path).context("read prediction")?;
    let p: MatchPrediction = serde_json::from_str(&raw).context("parse prediction")?;
    Ok(HistorySummary {
        id: ts.to_string(),
        team1: p.team1.name,
        team2: p.team2.name,
        favorite_team: p.favorite_team,
        win_probability: p.win_probability,
        timestamp: ts,
    })
}

fn file_name(ts: i64) -> String {
    format!("{FILE_PREFIX}{ts}{FILE_SUFFIX}")
}

fn timestamp_from_name(name: &str) -> Option<i64> {
    name.strip_prefix(FILE_PREFIX)?
        .strip_suffix(FILE_SUFFIX)?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_only_prediction_file_names() {
        assert_eq!(timestamp_from_name("prediction_1700000000.json"), Some(1_700_000_000));
        assert_eq!(timestamp_from_name("prediction_1700000000.json.tmp"), None);
        assert_eq!(timestamp_from_name("notes.json"), None);
        assert_eq!(timestamp_from_name("prediction_abc.json"), None);
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = Path::new("definitely/not/a/history/dir");
        assert!(recent_predictions(dir, DEFAULT_HISTORY_LIMIT).unwrap().is_empty());
    }
}
