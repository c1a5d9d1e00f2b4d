use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::EngineConfig;
use crate::dataset::{Tactic, TacticDataset};
use crate::error::{EngineError, Result};
use crate::explain::explain;
use crate::mlp::{Mlp, TrainingReport};
use crate::normalize::NormalizationParams;
use crate::stats::{STAT_COUNT, StatRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TacticRecommendation {
    pub tactic: Tactic,
    pub explanation: String,
    pub model_name: String,
    /// Accuracy on the synthetic training set, in percent.
    pub training_accuracy: f64,
}

#[derive(Debug)]
struct TrainedTactics {
    network: Mlp<Tactic>,
    normalization: NormalizationParams,
    report: TrainingReport,
}

/// Owns the tactic network. Recommendations read an immutable snapshot;
/// training builds a new snapshot and swaps it in, so a retrain never
/// blocks readers for longer than the swap.
#[derive(Debug, Clone)]
pub struct TacticAdvisor {
    config: EngineConfig,
    current: Arc<RwLock<Option<Arc<TrainedTactics>>>>,
}

impl TacticAdvisor {
    pub fn new(config: EngineConfig) -> Result<Self> {
        Mlp::<Tactic>::new(STAT_COUNT, config.network.clone())?;
        config.training.validate()?;
        if config.dataset_size == 0 {
            return Err(EngineError::config("dataset size must be at least 1"));
        }
        Ok(Self {
            config,
            current: Arc::new(RwLock::new(None)),
        })
    }

    pub fn is_trained(&self) -> bool {
        self.snapshot().is_some()
    }

    pub fn training_report(&self) -> Option<TrainingReport> {
        self.snapshot().map(|s| s.report)
    }

    /// Generates a fresh synthetic dataset and trains a new network on it,
    /// replacing any previous one. Blocks until training finishes.
    pub fn train(&self) -> Result<TrainingReport> {
        let mut rng = match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let dataset = TacticDataset::generate(self.config.dataset_size, &mut rng);
        let inputs = dataset.inputs();
        let normalization = NormalizationParams::fit(&inputs)?;
        let scaled = normalization.transform_all(&inputs)?;

        let mut network = Mlp::new(STAT_COUNT, self.config.network.clone())?;
        let report = network.fit(&scaled, &dataset.labels(), &self.config.training, &mut rng)?;

        info!(
            model = %network.describe(),
            samples = report.samples,
            accuracy = report.accuracy,
            "tactic model ready"
        );

        let trained = Arc::new(TrainedTactics {
            network,
            normalization,
            report,
        });
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(trained);
        Ok(report)
    }

    /// Runs [`TacticAdvisor::train`] on a worker thread. Recommendations keep
    /// failing with `ModelNotTrained` until the first run completes.
    pub fn spawn_training(&self) -> TrainingHandle {
        let advisor = self.clone();
        TrainingHandle {
            inner: thread::spawn(move || advisor.train()),
        }
    }

    pub fn recommend_tactic(&self, stats: &StatRecord) -> Result<TacticRecommendation> {
        let trained = self.snapshot().ok_or(EngineError::ModelNotTrained)?;
        stats.validate()?;

        let x = trained.normalization.transform(&stats.features())?;
        let tactic = trained.network.predict_one(&x)?;

        Ok(TacticRecommendation {
            tactic,
            explanation: explain(tactic, stats),
            model_name: trained.network.describe(),
            training_accuracy: trained.report.accuracy * 100.0,
        })
    }

    fn snapshot(&self) -> Option<Arc<TrainedTactics>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

pub struct TrainingHandle {
    inner: JoinHandle<Result<TrainingReport>>,
}

impl TrainingHandle {
    pub fn wait(self) -> Result<TrainingReport> {
        self.inner.join().map_err(|_| EngineError::TrainingAborted {
            reason: "training thread panicked".to_string(),
        })?
    }
}
