use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use matchcast::dataset::{Tactic, TacticDataset};
use matchcast::engine::predict_outcome;
use matchcast::mlp::{Mlp, MlpConfig, TrainParams};
use matchcast::normalize::NormalizationParams;
use matchcast::stats::{STAT_COUNT, demo_away, demo_home};
use matchcast::win_prob::{MAX_GOALS, compute_outcome};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn trained_network() -> (Mlp<Tactic>, Vec<Vec<f64>>) {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let data = TacticDataset::generate(300, &mut rng);
    let inputs = data.inputs();
    let norm = NormalizationParams::fit(&inputs).expect("fit normalizer");
    let scaled = norm.transform_all(&inputs).expect("scale inputs");
    let mut mlp = Mlp::new(STAT_COUNT, MlpConfig::default()).expect("valid config");
    let params = TrainParams {
        max_iterations: 20,
        ..Default::default()
    };
    mlp.fit(&scaled, &data.labels(), &params, &mut rng)
        .expect("training succeeds");
    (mlp, scaled)
}

fn bench_predict_outcome(c: &mut Criterion) {
    let home = demo_home();
    let away = demo_away();
    c.bench_function("predict_outcome", |b| {
        b.iter(|| predict_outcome(black_box(&home), black_box(&away)))
    });
}

fn bench_score_matrix(c: &mut Criterion) {
    c.bench_function("score_matrix", |b| {
        b.iter(|| compute_outcome(black_box(2.42), black_box(2.09), MAX_GOALS))
    });
}

fn bench_mlp_predict(c: &mut Criterion) {
    let (mlp, scaled) = trained_network();
    c.bench_function("mlp_predict_batch", |b| {
        b.iter(|| mlp.predict(black_box(&scaled)))
    });
}

fn bench_dataset_generate(c: &mut Criterion) {
    c.bench_function("dataset_generate_600", |b| {
        b.iter(|| {
            let mut rng = ChaCha8Rng::seed_from_u64(1);
            TacticDataset::generate(black_box(600), &mut rng)
        })
    });
}

criterion_group!(
    perf,
    bench_predict_outcome,
    bench_score_matrix,
    bench_mlp_predict,
    bench_dataset_generate
);
criterion_main!(perf);
