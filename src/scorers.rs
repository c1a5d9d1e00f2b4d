//! Auxiliary outcome scorers. Both are hand-set constant tables rather than
//! fitted models; they exist to give the reliability selector something to
//! compare the Poisson model against.

use serde::Serialize;

use crate::outcome::{OutcomeProbabilities, logistic};
use crate::stats::{StatKey, StatRecord};

/// Share of the probability mass left to the two win outcomes.
pub const WIN_MASS: f64 = 85.0;

const LOGISTIC_SLOPE: f64 = 1.5;
const ENSEMBLE_SLOPE: f64 = 2.0;

fn logistic_weight(key: StatKey) -> f64 {
    match key {
        StatKey::GoalsScored => 1.2,
        StatKey::GoalsConceded => -1.0,
        StatKey::Possession => 0.8,
        StatKey::ShotsOnTarget => 0.35,
        StatKey::PassingAccuracy => 0.9,
        StatKey::Fouls => -0.05,
        StatKey::Corners => 0.08,
        StatKey::YellowCards => -0.12,
        StatKey::RedCards => -0.5,
    }
}

pub fn linear_score(stats: &StatRecord) -> f64 {
    StatKey::ALL
        .into_iter()
        .map(|key| {
            let raw = stats.get(key);
            let v = if key.is_percentage() { raw / 100.0 } else { raw };
            logistic_weight(key) * v
        })
        .sum()
}

pub fn logistic_predict(team: &StatRecord, opponent: &StatRecord) -> OutcomeProbabilities {
    let d = linear_score(team) - linear_score(opponent);
    let team1 = 100.0 * logistic(LOGISTIC_SLOPE * d);
    let team2 = 100.0 * logistic(-LOGISTIC_SLOPE * d);
    OutcomeProbabilities::with_draw_remainder(team1, team2, WIN_MASS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffFeature {
    GoalBalance,
    ScoringShare,
    Possession,
    ShotsOnTarget,
    PassingAccuracy,
    Attack,
    Discipline,
}

/// Differential features, each oriented so that positive favors team 1
/// (discipline excepted: positive means team 1 is the dirtier side).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiffFeatures {
    pub goal_balance: f64,
    pub scoring_share: f64,
    pub possession: f64,
    pub shots_on_target: f64,
    pub passing_accuracy: f64,
    pub attack: f64,
    pub discipline: f64,
}

impl DiffFeatures {
    pub fn between(team: &StatRecord, opponent: &StatRecord) -> Self {
        let scored = team.goals_scored + opponent.goals_scored;
        let scoring_share = if scored > 0.0 {
            team.goals_scored / scored - 0.5
        } else {
            0.0
        };
        Self {
            goal_balance: (team.goals_scored - team.goals_conceded)
                - (opponent.goals_scored - opponent.goals_conceded),
            scoring_share,
            possession: (team.possession - opponent.possession) / 100.0,
            shots_on_target: team.shots_on_target - opponent.shots_on_target,
            passing_accuracy: (team.passing_accuracy - opponent.passing_accuracy) / 100.0,
            attack: (team.shots_on_target + team.corners)
                - (opponent.shots_on_target + opponent.corners),
            discipline: discipline_load(team) - discipline_load(opponent),
        }
    }

    pub fn get(&self, feature: DiffFeature) -> f64 {
        match feature {
            DiffFeature::GoalBalance => self.goal_balance,
            DiffFeature::ScoringShare => self.scoring_share,
            DiffFeature::Possession => self.possession,
            DiffFeature::ShotsOnTarget => self.shots_on_target,
            DiffFeature::PassingAccuracy => self.passing_accuracy,
            DiffFeature::Attack => self.attack,
            DiffFeature::Discipline => self.discipline,
        }
    }
}

// A red card counts as three yellows.
fn discipline_load(stats: &StatRecord) -> f64 {
    stats.yellow_cards + 3.0 * stats.red_cards
}

#[derive(Debug, Clone, Copy)]
pub struct Stump {
    pub feature: DiffFeature,
    pub threshold: f64,
    pub left: f64,
    pub right: f64,
    pub weight: f64,
}

impl Stump {
    pub fn contribution(&self, features: &DiffFeatures) -> f64 {
        let v = if features.get(self.feature) <= self.threshold {
            self.left
        } else {
            self.right
        };
        v * self.weight
    }
}

pub const STUMPS: [Stump; 7] = [
    Stump {
        feature: DiffFeature::GoalBalance,
        threshold: 0.0,
        left: -0.4,
        right: 0.4,
        weight: 1.0,
    },
    Stump {
        feature: DiffFeature::ScoringShare,
        threshold: 0.0,
        left: -0.3,
        right: 0.3,
        weight: 0.8,
    },
    Stump {
        feature: DiffFeature::Possession,
        threshold: 0.05,
        left: -0.1,
        right: 0.25,
        weight: 0.6,
    },
    Stump {
        feature: DiffFeature::ShotsOnTarget,
        threshold: 0.0,
        left: -0.2,
        right: 0.2,
        weight: 0.7,
    },
    Stump {
        feature: DiffFeature::PassingAccuracy,
        threshold: 0.03,
        left: -0.05,
        right: 0.15,
        weight: 0.5,
    },
    Stump {
        feature: DiffFeature::Attack,
        threshold: 1.0,
        left: -0.1,
        right: 0.2,
        weight: 0.5,
    },
    Stump {
        feature: DiffFeature::Discipline,
        threshold: 0.5,
        left: 0.05,
        right: -0.15,
        weight: 0.4,
    },
];

pub fn ensemble_score(team: &StatRecord, opponent: &StatRecord) -> f64 {
    let features = DiffFeatures::between(team, opponent);
    STUMPS.iter().map(|s| s.contribution(&features)).sum()
}

pub fn ensemble_predict(team: &StatRecord, opponent: &StatRecord) -> OutcomeProbabilities {
    let score = ensemble_score(team, opponent);
    let team1 = 100.0 * logistic(ENSEMBLE_SLOPE * score);
    let team2 = 100.0 - team1;
    OutcomeProbabilities::with_draw_remainder(team1, team2, WIN_MASS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{demo_away, demo_home};

    fn assert_valid(p: OutcomeProbabilities) {
        assert!(p.team1_win >= 0.0 && p.draw >= 0.0 && p.team2_win >= 0.0);
        assert!((p.total() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn logistic_is_symmetric_for_equal_teams() {
        let s = demo_home().stats;
        let p = logistic_predict(&s, &s);
        assert_valid(p);
        assert!((p.team1_win - 42.5).abs() < 1e-9);
        assert!((p.draw - 15.0).abs() < 1e-9);
    }

    #[test]
    fn logistic_prefers_stronger_side() {
        let p = logistic_predict(&demo_home().stats, &demo_away().stats);
        assert_valid(p);
        assert!(p.team1_win > p.team2_win);
        let q = logistic_predict(&demo_away().stats, &demo_home().stats);
        assert!((p.team1_win - q.team2_win).abs() < 1e-9);
    }

    #[test]
    fn ensemble_stays_normalized_and_prefers_demo_home() {
        let p = ensemble_predict(&demo_home().stats, &demo_away().stats);
        assert_valid(p);
        assert!(p.team1_win > p.team2_win);
        assert!((p.draw - 15.0).abs() < 1e-9);
    }

    #[test]
    fn stump_uses_left_branch_on_threshold() {
        let stump = STUMPS[0];
        let s = demo_home().stats;
        let features = DiffFeatures::between(&s, &s);
        assert_eq!(features.goal_balance, 0.0);
        assert_eq!(stump.contribution(&features), -0.4);
    }

    #[test]
    fn scoring_share_handles_goalless_teams() {
        let mut s = demo_home().stats;
        s.goals_scored = 0.0;
        let f = DiffFeatures::between(&s, &s);
        assert_eq!(f.scoring_share, 0.0);
    }
}
