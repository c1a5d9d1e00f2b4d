use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use matchcast::advisor::{TacticAdvisor, TacticRecommendation};
use matchcast::config::EngineConfig;
use matchcast::engine::{MatchPrediction, predict_outcome};
use matchcast::history::{self, DEFAULT_HISTORY_LIMIT};
use matchcast::stats::{TeamInput, demo_away, demo_home};
use matchcast::win_prob::LambdaBreakdown;

const USAGE: &str = "usage: matchcast [TEAMS_JSON] [--save] [--history] [--json] [--no-tactics]";

#[derive(Debug, Default)]
struct Args {
    teams_path: Option<PathBuf>,
    save: bool,
    history: bool,
    json: bool,
    no_tactics: bool,
}

#[derive(Debug, Deserialize)]
struct Fixture {
    team1: TeamInput,
    team2: TeamInput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TeamTactic {
    team: String,
    #[serde(flatten)]
    recommendation: TacticRecommendation,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    #[serde(flatten)]
    prediction: &'a MatchPrediction,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tactics: Vec<TeamTactic>,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let config = EngineConfig::from_env();

    if args.history {
        let saved = history::recent_predictions(&config.history_dir, DEFAULT_HISTORY_LIMIT)?;
        if saved.is_empty() {
            println!("No saved predictions in {}", config.history_dir.display());
        }
        for s in saved {
            println!(
                "{}  {} vs {}  favorite: {} ({:.1}%)",
                s.id, s.team1, s.team2, s.favorite_team, s.win_probability
            );
        }
        return Ok(());
    }

    let (team1, team2) = match &args.teams_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("read {}", path.display()))?;
            let fixture: Fixture = serde_json::from_str(&raw).context("parse teams json")?;
            (fixture.team1, fixture.team2)
        }
        None => (demo_home(), demo_away()),
    };

    // Train while the match engine runs; it needs no network.
    let training = if args.no_tactics {
        None
    } else {
        let advisor = TacticAdvisor::new(config.clone())?;
        let handle = advisor.spawn_training();
        Some((advisor, handle))
    };

    let prediction = predict_outcome(&team1, &team2)?;

    let mut tactics = Vec::new();
    if let Some((advisor, handle)) = training {
        match handle.wait() {
            Ok(_) => {
                for team in [&team1, &team2] {
                    tactics.push(TeamTactic {
                        team: team.name.clone(),
                        recommendation: advisor.recommend_tactic(&team.stats)?,
                    });
                }
            }
            Err(err) => warn!(error = %err, "tactic model unavailable"),
        }
    }

    if args.json {
        let report = Report {
            prediction: &prediction,
            tactics,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_prediction(&prediction);
        print_tactics(&tactics);
    }

    if args.save {
        let path = history::save_prediction(&config.history_dir, &prediction)?;
        eprintln!("Saved prediction to {}", path.display());
    }

    Ok(())
}

fn parse_args(raw: impl Iterator<Item = String>) -> Result<Args> {
    let mut args = Args::default();
    for arg in raw {
        match arg.as_str() {
            "--save" => args.save = true,
            "--history" => args.history = true,
            "--json" => args.json = true,
            "--no-tactics" => args.no_tactics = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            flag if flag.starts_with('-') => bail!("unknown flag {flag}\n{USAGE}"),
            path => {
                if args.teams_path.is_some() {
                    bail!("only one teams file may be given\n{USAGE}");
                }
                args.teams_path = Some(PathBuf::from(path));
            }
        }
    }
    Ok(args)
}

fn print_prediction(p: &MatchPrediction) {
    println!("{} vs {}", p.team1.name, p.team2.name);
    println!();
    print_breakdown(&p.team1.name, &p.team1.breakdown);
    print_breakdown(&p.team2.name, &p.team2.breakdown);

    println!("Score matrix (rows {}, columns {})", p.team1.name, p.team2.name);
    for row in p.result_matrix.rows() {
        let cells: Vec<String> = row.iter().map(|v| format!("{:5.1}", v * 100.0)).collect();
        println!("  {}", cells.join(" "));
    }
    let (h, a) = p.most_likely_score();
    println!("Most likely score: {h}-{a}");
    println!();

    println!(
        "Poisson    {:5.1}% / {:5.1}% / {:5.1}%",
        p.team1.win_probability, p.draw_probability, p.team2.win_probability
    );
    for (name, probs) in [
        ("Logistic", &p.logistic_regression),
        ("Ensemble", &p.ensemble),
    ] {
        println!(
            "{name:<10} {:5.1}% / {:5.1}% / {:5.1}%",
            probs.team1_win, probs.draw, probs.team2_win
        );
    }
    println!();
    println!(
        "Scenario: {}  trusted model: {}",
        p.model_reliability.scenario, p.model_reliability.trusted_model
    );
    let f = &p.final_probabilities;
    println!(
        "Final      {:5.1}% / {:5.1}% / {:5.1}%",
        f.team1_win, f.draw, f.team2_win
    );
    println!("Favorite: {} ({:.1}%)", p.favorite_team, p.win_probability);
}

fn print_breakdown(name: &str, b: &LambdaBreakdown) {
    println!("{name}: lambda {:.3}", b.lambda);
    println!("  base {:>28.3}", b.base);
    for e in &b.entries {
        println!(
            "  {:<18} {:>14} x {:>5.2} = {:+.3}",
            e.stat.name(),
            e.value.to_string(),
            e.factor,
            e.adjustment
        );
    }
    if b.was_clamped() {
        println!("  raw total {:.3} clamped", b.raw_total());
    }
    println!();
}

fn print_tactics(tactics: &[TeamTactic]) {
    if tactics.is_empty() {
        return;
    }
    println!();
    for t in tactics {
        let r = &t.recommendation;
        println!("{}: {}", t.team, r.tactic);
        println!("  {}", r.explanation);
        println!(
            "  ({}, training accuracy {:.1}%)",
            r.model_name, r.training_accuracy
        );
    }
}
