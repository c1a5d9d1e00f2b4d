use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

pub const STAT_COUNT: usize = 9;

/// The nine recognized statistics, in the fixed order used by lambda
/// breakdowns and by the tactic feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKey {
    GoalsScored,
    GoalsConceded,
    Possession,
    ShotsOnTarget,
    PassingAccuracy,
    Fouls,
    Corners,
    YellowCards,
    RedCards,
}

impl StatKey {
    pub const ALL: [StatKey; STAT_COUNT] = [
        StatKey::GoalsScored,
        StatKey::GoalsConceded,
        StatKey::Possession,
        StatKey::ShotsOnTarget,
        StatKey::PassingAccuracy,
        StatKey::Fouls,
        StatKey::Corners,
        StatKey::YellowCards,
        StatKey::RedCards,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StatKey::GoalsScored => "goals_scored",
            StatKey::GoalsConceded => "goals_conceded",
            StatKey::Possession => "possession",
            StatKey::ShotsOnTarget => "shots_on_target",
            StatKey::PassingAccuracy => "passing_accuracy",
            StatKey::Fouls => "fouls",
            StatKey::Corners => "corners",
            StatKey::YellowCards => "yellow_cards",
            StatKey::RedCards => "red_cards",
        }
    }

    /// camelCase spelling used on the wire by the web front end.
    pub fn wire_name(self) -> &'static str {
        match self {
            StatKey::GoalsScored => "goalsScored",
            StatKey::GoalsConceded => "goalsConceded",
            StatKey::Possession => "possession",
            StatKey::ShotsOnTarget => "shotsOnTarget",
            StatKey::PassingAccuracy => "passingAccuracy",
            StatKey::Fouls => "fouls",
            StatKey::Corners => "corners",
            StatKey::YellowCards => "yellowCards",
            StatKey::RedCards => "redCards",
        }
    }

    pub fn is_percentage(self) -> bool {
        matches!(self, StatKey::Possession | StatKey::PassingAccuracy)
    }

    pub fn from_name(raw: &str) -> Option<Self> {
        let key = raw.trim();
        StatKey::ALL
            .into_iter()
            .find(|k| k.name() == key || k.wire_name() == key)
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatRecord {
    #[serde(alias = "goals_scored")]
    pub goals_scored: f64,
    #[serde(alias = "goals_conceded")]
    pub goals_conceded: f64,
    pub possession: f64,
    #[serde(alias = "shots_on_target")]
    pub shots_on_target: f64,
    #[serde(alias = "passing_accuracy")]
    pub passing_accuracy: f64,
    pub fouls: f64,
    pub corners: f64,
    #[serde(alias = "yellow_cards")]
    pub yellow_cards: f64,
    #[serde(alias = "red_cards")]
    pub red_cards: f64,
}

impl StatRecord {
    pub fn get(&self, key: StatKey) -> f64 {
        match key {
            StatKey::GoalsScored => self.goals_scored,
            StatKey::GoalsConceded => self.goals_conceded,
            StatKey::Possession => self.possession,
            StatKey::ShotsOnTarget => self.shots_on_target,
            StatKey::PassingAccuracy => self.passing_accuracy,
            StatKey::Fouls => self.fouls,
            StatKey::Corners => self.corners,
            StatKey::YellowCards => self.yellow_cards,
            StatKey::RedCards => self.red_cards,
        }
    }

    /// Builds a record from a name -> value map, accepting either key spelling.
    /// Unknown keys are ignored; every recognized key must be present.
    pub fn from_map(values: &HashMap<String, f64>) -> Result<Self> {
        let mut slots = [None; STAT_COUNT];
        for (name, value) in values {
            let Some(key) = StatKey::from_name(name) else {
                continue;
            };
            slots[key as usize] = Some(*value);
        }

        let mut out = [0.0; STAT_COUNT];
        for (idx, key) in StatKey::ALL.into_iter().enumerate() {
            out[idx] = slots[idx]
                .ok_or_else(|| EngineError::invalid(format!("missing statistic `{key}`")))?;
        }
        Self::from_features(out)
    }

    /// Inverse of [`StatRecord::features`]. Validates the result.
    pub fn from_features(values: [f64; STAT_COUNT]) -> Result<Self> {
        let record = StatRecord {
            goals_scored: values[0],
            goals_conceded: values[1],
            possession: values[2],
            shots_on_target: values[3],
            passing_accuracy: values[4],
            fouls: values[5],
            corners: values[6],
            yellow_cards: values[7],
            red_cards: values[8],
        };
        record.validate()?;
        Ok(record)
    }

    pub fn features(&self) -> [f64; STAT_COUNT] {
        StatKey::ALL.map(|k| self.get(k))
    }

    pub fn validate(&self) -> Result<()> {
        for key in StatKey::ALL {
            let v = self.get(key);
            if !v.is_finite() {
                return Err(EngineError::invalid(format!("`{key}` is not a finite number")));
            }
            if v < 0.0 {
                return Err(EngineError::invalid(format!("`{key}` must be >= 0, got {v}")));
            }
            if key.is_percentage() && v > 100.0 {
                return Err(EngineError::invalid(format!(
                    "`{key}` is a percentage and must be <= 100, got {v}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamInput {
    pub name: String,
    pub stats: StatRecord,
}

impl TeamInput {
    pub fn new(name: impl Into<String>, stats: StatRecord) -> Self {
        Self {
            name: name.into(),
            stats,
        }
    }
}

pub fn demo_home() -> TeamInput {
    TeamInput::new(
        "FC Barcelona",
        StatRecord {
            goals_scored: 2.6,
            goals_conceded: 0.9,
            possession: 65.4,
            shots_on_target: 7.2,
            passing_accuracy: 89.3,
            fouls: 10.8,
            corners: 6.5,
            yellow_cards: 1.8,
            red_cards: 0.1,
        },
    )
}

pub fn demo_away() -> TeamInput {
    TeamInput::new(
        "Real Madrid",
        StatRecord {
            goals_scored: 2.4,
            goals_conceded: 1.1,
            possession: 58.7,
            shots_on_target: 6.8,
            passing_accuracy: 86.5,
            fouls: 12.3,
            corners: 5.9,
            yellow_cards: 2.1,
            red_cards: 0.2,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn features_follow_fixed_stat_order() {
        let stats = demo_home().stats;
        let f = stats.features();
        assert_eq!(f[0], 2.6);
        assert_eq!(f[2], 65.4);
        assert_eq!(f[8], 0.1);
        assert_eq!(StatRecord::from_features(f).unwrap(), stats);
    }

    #[test]
    fn validate_rejects_out_of_range_percentage() {
        let mut stats = demo_home().stats;
        stats.possession = 104.0;
        assert!(matches!(
            stats.validate(),
            Err(EngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn validate_rejects_negative_and_nan() {
        let mut stats = demo_home().stats;
        stats.fouls = -1.0;
        assert!(stats.validate().is_err());

        let mut stats = demo_home().stats;
        stats.corners = f64::NAN;
        assert!(stats.validate().is_err());
    }

    #[test]
    fn from_map_accepts_both_spellings_and_reports_missing() {
        let mut values: HashMap<String, f64> = StatKey::ALL
            .into_iter()
            .map(|k| (k.wire_name().to_string(), 1.0))
            .collect();
        values.insert("possession".to_string(), 50.0);
        values.insert("passing_accuracy".to_string(), 80.0);
        values.remove("passingAccuracy");
        let record = StatRecord::from_map(&values).unwrap();
        assert_eq!(record.passing_accuracy, 80.0);

        values.remove("redCards");
        let err = StatRecord::from_map(&values).unwrap_err();
        assert!(err.to_string().contains("red_cards"));
    }

    #[test]
    fn deserializes_snake_and_camel_case() {
        let camel = r#"{"goalsScored":1,"goalsConceded":1,"possession":50,"shotsOnTarget":4,
            "passingAccuracy":80,"fouls":10,"corners":5,"yellowCards":2,"redCards":0}"#;
        let snake = r#"{"goals_scored":1,"goals_conceded":1,"possession":50,"shots_on_target":4,
            "passing_accuracy":80,"fouls":10,"corners":5,"yellow_cards":2,"red_cards":0}"#;
        let a: StatRecord = serde_json::from_str(camel).unwrap();
        let b: StatRecord = serde_json::from_str(snake).unwrap();
        assert_eq!(a, b);
    }
}
