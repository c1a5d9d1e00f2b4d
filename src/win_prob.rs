use std::fmt;

use serde::{Deserialize, Serialize};

use crate::outcome::OutcomeProbabilities;
use crate::stats::{StatKey, StatRecord};

pub const MAX_GOALS: usize = 5;
pub const MIN_LAMBDA: f64 = 0.1;

/// Per-stat weighting factors of the expected-goals model.
pub fn lambda_factor(key: StatKey) -> f64 {
    match key {
        StatKey::GoalsScored => 0.8,
        StatKey::GoalsConceded => -0.6,
        StatKey::Possession => 0.3,
        StatKey::ShotsOnTarget => 0.5,
        StatKey::PassingAccuracy => 0.4,
        StatKey::Fouls => -0.2,
        StatKey::Corners => 0.2,
        StatKey::YellowCards => -0.15,
        StatKey::RedCards => -0.4,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObservedValue {
    Value(f64),
    Versus { team: f64, opponent: f64 },
}

impl fmt::Display for ObservedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservedValue::Value(v) => write!(f, "{v}"),
            ObservedValue::Versus { team, opponent } => write!(f, "{team} vs {opponent}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub stat: StatKey,
    pub value: ObservedValue,
    pub factor: f64,
    pub adjustment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambdaBreakdown {
    pub base: f64,
    pub entries: Vec<BreakdownEntry>,
    /// Final rate after clamping.
    pub lambda: f64,
}

impl LambdaBreakdown {
    pub fn raw_total(&self) -> f64 {
        self.base + self.entries.iter().map(|e| e.adjustment).sum::<f64>()
    }

    pub fn was_clamped(&self) -> bool {
        self.raw_total() < MIN_LAMBDA
    }
}

/// Expected goals for `team` against `opponent`, starting from the team's own
/// scoring rate and adjusting by every other stat in fixed order.
pub fn compute_lambda(team: &StatRecord, opponent: &StatRecord) -> (f64, LambdaBreakdown) {
    let base = team.goals_scored;
    let mut lambda = base;
    let mut entries = Vec::with_capacity(StatKey::ALL.len() - 1);

    for key in StatKey::ALL {
        if key == StatKey::GoalsScored {
            continue;
        }
        let factor = lambda_factor(key);
        let (value, adjustment) = match key {
            StatKey::Possession | StatKey::PassingAccuracy => {
                let diff = (team.get(key) - opponent.get(key)) / 100.0;
                (ObservedValue::Value(team.get(key)), diff * factor)
            }
            // Conceded goals are weighed against what the opponent usually scores.
            StatKey::GoalsConceded => {
                let diff = (opponent.goals_scored - team.goals_conceded) / 2.0;
                (
                    ObservedValue::Versus {
                        team: team.goals_conceded,
                        opponent: opponent.goals_scored,
                    },
                    diff * factor,
                )
            }
            _ => (
                ObservedValue::Value(team.get(key)),
                (team.get(key) / 10.0) * factor,
            ),
        };
        lambda += adjustment;
        entries.push(BreakdownEntry {
            stat: key,
            value,
            factor,
            adjustment,
        });
    }

    let lambda = lambda.max(MIN_LAMBDA);
    (
        lambda,
        LambdaBreakdown {
            base,
            entries,
            lambda,
        },
    )
}

/// Joint probabilities of every scoreline up to `max_goals` on each side,
/// indexed `[home goals][away goals]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreMatrix {
    cells: Vec<Vec<f64>>,
}

impl ScoreMatrix {
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.cells
    }

    /// Probability mass covered by the matrix (below 1 because of the cutoff).
    pub fn covered_mass(&self) -> f64 {
        self.cells.iter().flatten().sum()
    }

    pub fn most_likely_score(&self) -> (usize, usize) {
        let mut best = (0, 0);
        let mut best_p = f64::NEG_INFINITY;
        for (h, row) in self.cells.iter().enumerate() {
            for (a, p) in row.iter().enumerate() {
                if *p > best_p {
                    best_p = *p;
                    best = (h, a);
                }
            }
        }
        best
    }
}

/// Evaluated in log space so very large rates underflow to 0 instead of
/// producing `inf * 0`.
pub fn poisson_pmf(lambda: f64, k: u32) -> f64 {
    let lambda = lambda.max(0.0);
    if lambda == 0.0 {
        return if k == 0 { 1.0 } else { 0.0 };
    }
    (f64::from(k) * lambda.ln() - lambda - ln_factorial(k)).exp()
}

fn ln_factorial(k: u32) -> f64 {
    (2..=k).map(|i| f64::from(i).ln()).sum()
}

/// P(X <= max_goals) for X ~ Poisson(lambda).
pub fn poisson_mass(lambda: f64, max_goals: u32) -> f64 {
    (0..=max_goals).map(|k| poisson_pmf(lambda, k)).sum()
}

pub fn compute_outcome(
    lambda1: f64,
    lambda2: f64,
    max_goals: usize,
) -> (ScoreMatrix, OutcomeProbabilities) {
    let pmf_1: Vec<f64> = (0..=max_goals)
        .map(|k| poisson_pmf(lambda1, k as u32))
        .collect();
    let pmf_2: Vec<f64> = (0..=max_goals)
        .map(|k| poisson_pmf(lambda2, k as u32))
        .collect();

    let mut cells = vec![vec![0.0; max_goals + 1]; max_goals + 1];
    let mut p_team1 = 0.0;
    let mut p_draw = 0.0;
    let mut p_team2 = 0.0;

    for (i, p_i) in pmf_1.iter().enumerate() {
        for (j, p_j) in pmf_2.iter().enumerate() {
            let p = p_i * p_j;
            cells[i][j] = p;
            if i > j {
                p_team1 += p;
            } else if i < j {
                p_team2 += p;
            } else {
                p_draw += p;
            }
        }
    }

    // Scorelines past the cutoff are handed back in proportion to what was seen.
    let total = p_team1 + p_draw + p_team2;
    if total > 0.0 {
        p_team1 /= total;
        p_draw /= total;
        p_team2 /= total;
    }

    (
        ScoreMatrix { cells },
        OutcomeProbabilities::new(p_team1 * 100.0, p_draw * 100.0, p_team2 * 100.0),
    )
}
