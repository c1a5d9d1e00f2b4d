use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::outcome::{Favorite, OutcomeProbabilities};
use crate::reliability::{self, ReliabilityVerdict};
use crate::scorers;
use crate::stats::{StatRecord, TeamInput};
use crate::win_prob::{self, LambdaBreakdown, MAX_GOALS, ScoreMatrix};

pub const DRAW_LABEL: &str = "Draw";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamOutcome {
    pub name: String,
    pub stats: StatRecord,
    pub lambda: f64,
    pub win_probability: f64,
    pub breakdown: LambdaBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPrediction {
    pub team1: TeamOutcome,
    pub team2: TeamOutcome,
    pub draw_probability: f64,
    pub favorite: Favorite,
    /// Name of the favored team, or "Draw".
    pub favorite_team: String,
    /// Probability of the favored outcome, in percent.
    pub win_probability: f64,
    pub result_matrix: ScoreMatrix,
    pub logistic_regression: OutcomeProbabilities,
    pub ensemble: OutcomeProbabilities,
    pub model_reliability: ReliabilityVerdict,
    /// Probabilities of whichever model the reliability verdict trusts.
    pub final_probabilities: OutcomeProbabilities,
}

impl MatchPrediction {
    pub fn poisson(&self) -> OutcomeProbabilities {
        OutcomeProbabilities::new(
            self.team1.win_probability,
            self.draw_probability,
            self.team2.win_probability,
        )
    }

    pub fn most_likely_score(&self) -> (usize, usize) {
        self.result_matrix.most_likely_score()
    }
}

pub fn predict_outcome(team1: &TeamInput, team2: &TeamInput) -> Result<MatchPrediction> {
    team1.stats.validate()?;
    team2.stats.validate()?;

    let (lambda1, breakdown1) = win_prob::compute_lambda(&team1.stats, &team2.stats);
    let (lambda2, breakdown2) = win_prob::compute_lambda(&team2.stats, &team1.stats);
    let (matrix, poisson) = win_prob::compute_outcome(lambda1, lambda2, MAX_GOALS);

    let logistic = scorers::logistic_predict(&team1.stats, &team2.stats);
    let ensemble = scorers::ensemble_predict(&team1.stats, &team2.stats);
    let verdict = reliability::evaluate(&team1.stats, &team2.stats, poisson, logistic, ensemble);
    let final_probabilities = verdict.trusted_probabilities(poisson, logistic, ensemble);

    let favorite = poisson.favorite();
    let favorite_team = match favorite {
        Favorite::Team1 => team1.name.clone(),
        Favorite::Team2 => team2.name.clone(),
        Favorite::Draw => DRAW_LABEL.to_string(),
    };

    info!(
        team1 = %team1.name,
        team2 = %team2.name,
        lambda1,
        lambda2,
        favorite = %favorite_team,
        scenario = %verdict.scenario,
        trusted = %verdict.trusted_model,
        "match prediction"
    );

    Ok(MatchPrediction {
        team1: TeamOutcome {
            name: team1.name.clone(),
            stats: team1.stats,
            lambda: lambda1,
            win_probability: poisson.team1_win,
            breakdown: breakdown1,
        },
        team2: TeamOutcome {
            name: team2.name.clone(),
            stats: team2.stats,
            lambda: lambda2,
            win_probability: poisson.team2_win,
            breakdown: breakdown2,
        },
        draw_probability: poisson.draw,
        favorite,
        favorite_team,
        win_probability: poisson.get(favorite),
        result_matrix: matrix,
        logistic_regression: logistic,
        ensemble,
        model_reliability: verdict,
        final_probabilities,
    })
}
