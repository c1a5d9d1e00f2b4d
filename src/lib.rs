pub mod advisor;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod explain;
pub mod history;
pub mod mlp;
pub mod normalize;
pub mod outcome;
pub mod reliability;
pub mod scorers;
pub mod stats;
pub mod win_prob;

pub use advisor::{TacticAdvisor, TacticRecommendation};
pub use config::EngineConfig;
pub use engine::{MatchPrediction, predict_outcome};
pub use error::{EngineError, Result};
pub use stats::{StatRecord, TeamInput};
