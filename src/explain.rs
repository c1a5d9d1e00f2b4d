use crate::dataset::Tactic;
use crate::stats::StatRecord;

pub fn explain(tactic: Tactic, stats: &StatRecord) -> String {
    match tactic {
        Tactic::OffensiveFormation => format!(
            "An offensive formation suits a side scoring {:.1} goals per match with {:.1}% \
             possession and {:.1}% passing accuracy: commit extra players forward and turn \
             control into chances.",
            stats.goals_scored, stats.possession, stats.passing_accuracy
        ),
        Tactic::PossessionControl => format!(
            "With {:.1}% possession and {:.1}% passing accuracy, keep the ball and dictate the \
             tempo; {:.1} goals per match show the patience pays off.",
            stats.possession, stats.passing_accuracy, stats.goals_scored
        ),
        Tactic::DefensiveFormation => format!(
            "Conceding only {:.1} goals per match while managing {:.1} shots on target, the \
             team is strongest compact and organised: protect the lead and strike on few \
             chances.",
            stats.goals_conceded, stats.shots_on_target
        ),
        Tactic::FiveBackDefense => format!(
            "A back five fits a side that concedes {:.1} goals per match and creates only \
             {:.1} shots on target; wing-backs add width without weakening the defensive line.",
            stats.goals_conceded, stats.shots_on_target
        ),
        Tactic::HighPress => format!(
            "{:.1} fouls and {:.1} yellow cards per match point to an aggressive side: channel \
             it into a coordinated high press that wins the ball back near goal, while keeping \
             red cards ({:.1}) in check.",
            stats.fouls, stats.yellow_cards, stats.red_cards
        ),
        Tactic::CounterAttack => format!(
            "Only {:.1}% possession yet {:.1} goals per match: let the opponent have the ball \
             and hit quickly in transition.",
            stats.possession, stats.goals_scored
        ),
        Tactic::WingPlay => format!(
            "{:.1} corners and {:.1} shots on target per match show danger from wide areas; \
             stretch the pitch and feed crosses into the box.",
            stats.corners, stats.shots_on_target
        ),
    }
}
