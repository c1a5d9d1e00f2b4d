use std::fmt;

use serde::{Deserialize, Serialize};

use crate::outcome::OutcomeProbabilities;
use crate::stats::StatRecord;

const HIGH_SCORING_FLOOR: f64 = 2.5;
const DEFENSIVE_CEILING: f64 = 1.5;
const BALANCED_GAP: f64 = 0.5;
const UNBALANCED_GAP: f64 = 1.5;

const CONSENSUS_POISSON: f64 = 0.4;
const CONSENSUS_LOGISTIC: f64 = 0.3;
const CONSENSUS_ENSEMBLE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scenario {
    Standard,
    #[serde(rename = "High-scoring")]
    HighScoring,
    Defensive,
    Balanced,
    Unbalanced,
}

impl Scenario {
    pub fn label(self) -> &'static str {
        match self {
            Scenario::Standard => "Standard",
            Scenario::HighScoring => "High-scoring",
            Scenario::Defensive => "Defensive",
            Scenario::Balanced => "Balanced",
            Scenario::Unbalanced => "Unbalanced",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrustedModel {
    Poisson,
    Logistic,
    Ensemble,
    Consensus,
}

impl fmt::Display for TrustedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrustedModel::Poisson => "Poisson",
            TrustedModel::Logistic => "Logistic",
            TrustedModel::Ensemble => "Ensemble",
            TrustedModel::Consensus => "Consensus",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReliabilityVerdict {
    pub scenario: Scenario,
    #[serde(rename = "reliableModel")]
    pub trusted_model: TrustedModel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consensus: Option<OutcomeProbabilities>,
}

impl ReliabilityVerdict {
    /// The probabilities the verdict says to believe.
    pub fn trusted_probabilities(
        &self,
        poisson: OutcomeProbabilities,
        logistic: OutcomeProbabilities,
        ensemble: OutcomeProbabilities,
    ) -> OutcomeProbabilities {
        match self.trusted_model {
            TrustedModel::Poisson => poisson,
            TrustedModel::Logistic => logistic,
            TrustedModel::Ensemble => ensemble,
            TrustedModel::Consensus => self
                .consensus
                .unwrap_or_else(|| consensus(poisson, logistic, ensemble)),
        }
    }
}

pub fn consensus(
    poisson: OutcomeProbabilities,
    logistic: OutcomeProbabilities,
    ensemble: OutcomeProbabilities,
) -> OutcomeProbabilities {
    OutcomeProbabilities::blend(&[
        (CONSENSUS_POISSON, poisson),
        (CONSENSUS_LOGISTIC, logistic),
        (CONSENSUS_ENSEMBLE, ensemble),
    ])
}

pub fn classify_scenario(team: &StatRecord, opponent: &StatRecord) -> (Scenario, TrustedModel) {
    let g1 = team.goals_scored;
    let g2 = opponent.goals_scored;
    let gap = (g1 - g2).abs();

    // Order matters: the first matching rule wins.
    if g1 > HIGH_SCORING_FLOOR && g2 > HIGH_SCORING_FLOOR {
        (Scenario::HighScoring, TrustedModel::Ensemble)
    } else if g1 < DEFENSIVE_CEILING && g2 < DEFENSIVE_CEILING {
        (Scenario::Defensive, TrustedModel::Logistic)
    } else if gap < BALANCED_GAP {
        (Scenario::Balanced, TrustedModel::Consensus)
    } else if gap > UNBALANCED_GAP {
        (Scenario::Unbalanced, TrustedModel::Poisson)
    } else {
        (Scenario::Standard, TrustedModel::Poisson)
    }
}

pub fn evaluate(
    team: &StatRecord,
    opponent: &StatRecord,
    poisson: OutcomeProbabilities,
    logistic: OutcomeProbabilities,
    ensemble: OutcomeProbabilities,
) -> ReliabilityVerdict {
    let (scenario, trusted_model) = classify_scenario(team, opponent);
    let consensus = (trusted_model == TrustedModel::Consensus)
        .then(|| consensus(poisson, logistic, ensemble));
    ReliabilityVerdict {
        scenario,
        trusted_model,
        consensus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::demo_home;

    fn scoring(goals: f64) -> StatRecord {
        let mut s = demo_home().stats;
        s.goals_scored = goals;
        s
    }

    fn p(a: f64, d: f64, b: f64) -> OutcomeProbabilities {
        OutcomeProbabilities::new(a, d, b)
    }

    #[test]
    fn rules_fire_in_order() {
        let cases = [
            (2.6, 2.9, Scenario::HighScoring, TrustedModel::Ensemble),
            (1.0, 1.4, Scenario::Defensive, TrustedModel::Logistic),
            (1.8, 2.1, Scenario::Balanced, TrustedModel::Consensus),
            (0.9, 2.6, Scenario::Unbalanced, TrustedModel::Poisson),
            (1.2, 2.2, Scenario::Standard, TrustedModel::Poisson),
        ];
        for (a, b, scenario, model) in cases {
            assert_eq!(
                classify_scenario(&scoring(a), &scoring(b)),
                (scenario, model),
                "{a} vs {b}"
            );
        }
    }

    #[test]
    fn high_scoring_wins_over_balanced() {
        // 2.6 vs 2.7 is also within the balanced gap.
        let (scenario, model) = classify_scenario(&scoring(2.6), &scoring(2.7));
        assert_eq!(scenario, Scenario::HighScoring);
        assert_eq!(model, TrustedModel::Ensemble);
    }

    #[test]
    fn consensus_only_attached_when_trusted() {
        let (pp, lp, ep) = (p(50.0, 30.0, 20.0), p(40.0, 15.0, 45.0), p(60.0, 15.0, 25.0));
        let v = evaluate(&scoring(1.8), &scoring(2.0), pp, lp, ep);
        let c = v.consensus.expect("consensus present");
        assert!((c.team1_win - (0.4 * 50.0 + 0.3 * 40.0 + 0.3 * 60.0)).abs() < 1e-9);
        assert!((c.total() - 100.0).abs() < 1e-9);
        assert_eq!(v.trusted_probabilities(pp, lp, ep), c);

        let v = evaluate(&scoring(3.0), &scoring(3.0), pp, lp, ep);
        assert!(v.consensus.is_none());
        assert_eq!(v.trusted_probabilities(pp, lp, ep), ep);
    }

    #[test]
    fn verdict_serializes_with_front_end_keys() {
        let v = evaluate(
            &scoring(3.0),
            &scoring(3.0),
            p(1.0, 1.0, 98.0),
            p(1.0, 1.0, 98.0),
            p(1.0, 1.0, 98.0),
        );
        let json = serde_json::to_value(v).unwrap();
        assert_eq!(json["scenario"], "High-scoring");
        assert_eq!(json["reliableModel"], "Ensemble");
    }
}
