use std::env;
use std::path::PathBuf;

use tracing::warn;

use crate::mlp::{MlpConfig, TrainParams};

const DEFAULT_DATASET_SIZE: usize = 600;
const DEFAULT_HISTORY_DIR: &str = "predictions";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub dataset_size: usize,
    pub network: MlpConfig,
    pub training: TrainParams,
    /// Fixed seed for dataset generation and weight init; `None` draws from
    /// the OS entropy source on every training run.
    pub seed: Option<u64>,
    pub history_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dataset_size: DEFAULT_DATASET_SIZE,
            network: MlpConfig::default(),
            training: TrainParams::default(),
            seed: None,
            history_dir: PathBuf::from(DEFAULT_HISTORY_DIR),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).map(|v| v.trim().to_string());

        let dataset_size = parsed("MATCHCAST_DATASET_SIZE")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.dataset_size)
            .clamp(50, 20_000);

        let hidden_layers = match parsed("MATCHCAST_HIDDEN_LAYERS") {
            Some(raw) => parse_hidden_layers(&raw).unwrap_or_else(|| {
                warn!(value = %raw, "ignoring invalid MATCHCAST_HIDDEN_LAYERS");
                defaults.network.hidden_layers.clone()
            }),
            None => defaults.network.hidden_layers.clone(),
        };

        let max_iterations = parsed("MATCHCAST_MAX_ITERATIONS")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.training.max_iterations)
            .clamp(1, 10_000);
        let learning_rate = parsed("MATCHCAST_LEARNING_RATE")
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
            .unwrap_or(defaults.training.learning_rate);
        let target_error = parsed("MATCHCAST_TARGET_ERROR")
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(defaults.training.target_error);

        let seed = parsed("MATCHCAST_SEED").and_then(|v| v.parse::<u64>().ok());
        let history_dir = parsed("MATCHCAST_HISTORY_DIR")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.history_dir);

        Self {
            dataset_size,
            network: MlpConfig {
                hidden_layers,
                ..defaults.network
            },
            training: TrainParams {
                max_iterations,
                learning_rate,
                target_error,
            },
            seed,
            history_dir,
        }
    }
}

/// Parses "15,10" style lists. Any empty, zero or non-numeric entry rejects
/// the whole value.
pub fn parse_hidden_layers(raw: &str) -> Option<Vec<usize>> {
    let mut out = Vec::new();
    for part in raw.split(',') {
        let n = part.trim().parse::<usize>().ok()?;
        if n == 0 {
            return None;
        }
        out.push(n);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(EngineConfig::from_lookup(|_| None), EngineConfig::default());
    }

    #[test]
    fn reads_and_clamps_values() {
        let cfg = EngineConfig::from_lookup(lookup(&[
            ("MATCHCAST_DATASET_SIZE", "5"),
            ("MATCHCAST_HIDDEN_LAYERS", "20, 8 ,4"),
            ("MATCHCAST_MAX_ITERATIONS", "50"),
            ("MATCHCAST_LEARNING_RATE", "0.3"),
            ("MATCHCAST_SEED", "1234"),
            ("MATCHCAST_HISTORY_DIR", "/tmp/history"),
        ]));
        assert_eq!(cfg.dataset_size, 50);
        assert_eq!(cfg.network.hidden_layers, vec![20, 8, 4]);
        assert_eq!(cfg.training.max_iterations, 50);
        assert_eq!(cfg.training.learning_rate, 0.3);
        assert_eq!(cfg.seed, Some(1234));
        assert_eq!(cfg.history_dir, PathBuf::from("/tmp/history"));
    }

    #[test]
    fn invalid_values_fall_back() {
        let cfg = EngineConfig::from_lookup(lookup(&[
            ("MATCHCAST_HIDDEN_LAYERS", "15,0"),
            ("MATCHCAST_LEARNING_RATE", "-1"),
            ("MATCHCAST_SEED", "abc"),
        ]));
        assert_eq!(cfg.network.hidden_layers, vec![15, 10]);
        assert_eq!(cfg.training.learning_rate, 0.1);
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn parses_hidden_layer_lists() {
        assert_eq!(parse_hidden_layers("15,10"), Some(vec![15, 10]));
        assert_eq!(parse_hidden_layers("7"), Some(vec![7]));
        assert_eq!(parse_hidden_layers(""), None);
        assert_eq!(parse_hidden_layers("4,,2"), None);
    }
}
