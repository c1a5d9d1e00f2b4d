use std::fs;

use matchcast::engine::predict_outcome;
use matchcast::history::{DEFAULT_HISTORY_LIMIT, recent_predictions, save_prediction};
use matchcast::stats::{TeamInput, demo_away, demo_home};

#[test]
fn saved_predictions_are_listed_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let first = predict_outcome(&demo_home(), &demo_away()).unwrap();
    let second = predict_outcome(
        &TeamInput::new("Sevilla", demo_away().stats),
        &TeamInput::new("Valencia", demo_home().stats),
    )
    .unwrap();

    let p1 = save_prediction(dir.path(), &first).unwrap();
    let p2 = save_prediction(dir.path(), &second).unwrap();
    assert_ne!(p1, p2);
    assert!(p1.file_name().unwrap().to_str().unwrap().starts_with("prediction_"));

    let listed = recent_predictions(dir.path(), DEFAULT_HISTORY_LIMIT).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].team1, "Sevilla");
    assert_eq!(listed[0].favorite_team, "Valencia");
    assert_eq!(listed[1].team1, "FC Barcelona");
    assert!(listed[0].timestamp > listed[1].timestamp);
    assert!((listed[1].win_probability - first.win_probability).abs() < 1e-9);
}

#[test]
fn listing_respects_the_limit_and_skips_broken_files() {
    let dir = tempfile::tempdir().unwrap();
    let prediction = predict_outcome(&demo_home(), &demo_away()).unwrap();
    for _ in 0..3 {
        save_prediction(dir.path(), &prediction).unwrap();
    }
    fs::write(dir.path().join("prediction_99999999999.json"), "{ not json").unwrap();
    fs::write(dir.path().join("readme.txt"), "ignored").unwrap();

    let listed = recent_predictions(dir.path(), 10).unwrap();
    assert_eq!(listed.len(), 3);

    let limited = recent_predictions(dir.path(), 2).unwrap();
    // The broken file sorts first and takes a slot before being skipped.
    assert_eq!(limited.len(), 1);
}

#[test]
fn saved_file_round_trips_the_full_prediction() {
    let dir = tempfile::tempdir().unwrap();
    let prediction = predict_outcome(&demo_home(), &demo_away()).unwrap();
    let path = save_prediction(&dir.path().join("nested"), &prediction).unwrap();
    let raw = fs::read_to_string(path).unwrap();
    let back: matchcast::MatchPrediction = serde_json::from_str(&raw).unwrap();
    assert_eq!(back.favorite_team, prediction.favorite_team);
    assert_eq!(back.result_matrix.size(), prediction.result_matrix.size());
}
