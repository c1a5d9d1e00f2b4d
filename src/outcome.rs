use serde::{Deserialize, Serialize};

/// Percentage-point gap below which two outcomes are considered level.
pub const TIE_EPSILON: f64 = 1e-9;

/// Three-way outcome probabilities in percentage points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeProbabilities {
    pub team1_win: f64,
    pub draw: f64,
    pub team2_win: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Favorite {
    Team1,
    Draw,
    Team2,
}

impl OutcomeProbabilities {
    pub fn new(team1_win: f64, draw: f64, team2_win: f64) -> Self {
        Self {
            team1_win,
            draw,
            team2_win,
        }
    }

    pub fn total(&self) -> f64 {
        self.team1_win + self.draw + self.team2_win
    }

    /// A side is the favorite only when strictly ahead of both alternatives;
    /// every tie resolves to `Draw`. Differences below `TIE_EPSILON` count as
    /// ties, since mirrored fixtures sum their cells in a different order.
    pub fn favorite(&self) -> Favorite {
        let leads = |a: f64, b: f64| a - b > TIE_EPSILON;
        if leads(self.team1_win, self.team2_win) && leads(self.team1_win, self.draw) {
            Favorite::Team1
        } else if leads(self.team2_win, self.team1_win) && leads(self.team2_win, self.draw) {
            Favorite::Team2
        } else {
            Favorite::Draw
        }
    }

    pub fn get(&self, outcome: Favorite) -> f64 {
        match outcome {
            Favorite::Team1 => self.team1_win,
            Favorite::Draw => self.draw,
            Favorite::Team2 => self.team2_win,
        }
    }

    /// Weighted blend of several triples. Weights are used as given.
    pub fn blend(parts: &[(f64, OutcomeProbabilities)]) -> Self {
        let mut out = Self::new(0.0, 0.0, 0.0);
        for (w, p) in parts {
            out.team1_win += w * p.team1_win;
            out.draw += w * p.draw;
            out.team2_win += w * p.team2_win;
        }
        out
    }

    /// Scales the two win probabilities so they occupy `win_mass` percentage
    /// points together and hands the remainder to the draw.
    pub(crate) fn with_draw_remainder(team1_win: f64, team2_win: f64, win_mass: f64) -> Self {
        let sum = team1_win + team2_win;
        let (t1, t2) = if sum > 0.0 {
            (team1_win / sum * win_mass, team2_win / sum * win_mass)
        } else {
            (win_mass / 2.0, win_mass / 2.0)
        };
        Self::new(t1, 100.0 - t1 - t2, t2)
    }
}

pub(crate) fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
